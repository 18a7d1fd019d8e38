//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every value a
//! simulated variable, field or expression can hold. Values are immutable:
//! updating an object means replacing its field set on the heap, never
//! mutating a value in place.
//!
//! # Value Types
//!
//! - [`Value::Bool`]: boolean
//! - [`Value::Int`]: 64-bit signed integer
//! - [`Value::Str`]: string
//! - [`Value::Null`]: the distinguished "no object" address
//! - [`Value::Ref`]: address of a heap-resident object

use crate::program::ast::ValueType;
use std::fmt;

/// Opaque heap address. Only produced by [`crate::memory::heap::Heap::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub(crate) u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Runtime values in the simulator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Null,
    Ref(Address),
}

impl Value {
    /// Default value of a declared field or variable type
    pub fn default_for(value_type: &ValueType) -> Value {
        match value_type {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Str => Value::Str(String::new()),
            ValueType::Object(_) | ValueType::Null => Value::Null,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type label used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Ref(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Null => write!(f, "null"),
            Value::Ref(addr) => write!(f, "{}", addr),
        }
    }
}
