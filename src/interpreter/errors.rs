//! Runtime error types for the simulator
//!
//! This module defines [`SimError`], which represents everything that can stop
//! a simulation. Every error is fatal for the trace being generated: the step
//! function never repairs a state, it reports why it cannot continue.
//!
//! [`SimError::class`] separates faults in the simulated program from misuse
//! of the simulator itself and from exhausted resource limits.

use crate::memory::value::Address;
use crate::program::position::ProgramPosition;
use thiserror::Error;

/// Broad classification of a [`SimError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The simulated program is invalid, or was driven past a valid position
    MalformedProgram,
    /// The simulator's own step/evaluate contract was violated
    ProtocolMisuse,
    /// A configured limit was reached
    ResourceLimit,
}

/// Errors that can occur while building or simulating a program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("Malformed position {position}: {reason}")]
    MalformedPosition {
        position: ProgramPosition,
        reason: String,
    },

    #[error("Unknown type '{name}'")]
    UnknownType { name: String },

    #[error("Type '{name}' is defined more than once")]
    DuplicateType { name: String },

    #[error("Method '{method}' is defined more than once on type '{type_name}'")]
    DuplicateMethod { type_name: String, method: String },

    #[error("Type '{type_name}' inherits from itself")]
    InheritanceCycle { type_name: String },

    #[error("Type '{type_name}' has no method '{method}' taking {arity} argument(s)")]
    MissingMethod {
        type_name: String,
        method: String,
        arity: usize,
    },

    #[error("Method '{type_name}.{method}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        type_name: String,
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Object of type '{type_name}' has no field '{field}'")]
    MissingField { type_name: String, field: String },

    #[error("Null dereference in '{expression}'")]
    NullDereference { expression: String },

    #[error("Address {address} is not allocated")]
    UnknownAddress { address: Address },

    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("No stack frame available")]
    NoStackFrame,

    #[error("Type error in '{context}': expected {expected}, got {got}")]
    TypeError {
        expected: String,
        got: String,
        context: String,
    },

    #[error("Integer overflow in {operation}")]
    IntegerOverflow { operation: String },

    #[error("Division by zero in {operation}")]
    DivisionByZero { operation: String },

    #[error("'{target}' cannot be assigned to")]
    InvalidAssignmentTarget { target: String },

    #[error("Simulator protocol violation: {message}")]
    ProtocolViolation { message: String },

    #[error("Program has already finished")]
    ProgramFinished,

    #[error("Snapshot memory limit exceeded: {current} bytes used, limit is {limit}")]
    SnapshotLimitExceeded { current: usize, limit: usize },

    #[error("Step limit of {limit} transitions exceeded")]
    StepLimitExceeded { limit: usize },
}

impl SimError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SimError::ProtocolViolation { .. } | SimError::ProgramFinished => {
                ErrorClass::ProtocolMisuse
            }
            SimError::SnapshotLimitExceeded { .. } | SimError::StepLimitExceeded { .. } => {
                ErrorClass::ResourceLimit
            }
            _ => ErrorClass::MalformedProgram,
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        SimError::ProtocolViolation {
            message: message.into(),
        }
    }
}
