//! Call stack implementation
//!
//! This module provides the call stack for method execution:
//! - [`MemoryStack`]: The call stack containing frames
//! - [`MemoryFrame`]: A single method's activation record
//!
//! Only the top frame can be read or written. Every operation returns a new
//! stack; frames below the top are shared, never copied or touched.
//!
//! # Pending Results
//!
//! Each frame carries a pending-results table keyed by [`ReturnPosition`]. It
//! holds the value of every sub-expression the frame has already stepped in
//! the current command, including values delivered by returning callees.

use super::value::{Address, Value};
use crate::interpreter::errors::SimError;
use crate::program::position::{ProgramPosition, ReturnPosition};
use im::{OrdMap, Vector};

/// Activation record for a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFrame {
    pub method_name: String,
    /// Where the caller resumes; None for the entry method
    pub return_position: Option<ReturnPosition>,
    pub this_address: Address,
    /// Runtime type of the receiver
    pub this_type: String,
    pub locals: OrdMap<String, Value>,
    pub pending_results: OrdMap<ReturnPosition, Value>,
}

impl MemoryFrame {
    pub fn new(
        method_name: impl Into<String>,
        return_position: Option<ReturnPosition>,
        this_address: Address,
        this_type: impl Into<String>,
    ) -> Self {
        MemoryFrame {
            method_name: method_name.into(),
            return_position,
            this_address,
            this_type: this_type.into(),
            locals: OrdMap::new(),
            pending_results: OrdMap::new(),
        }
    }

    pub fn with_local(mut self, name: impl Into<String>, value: Value) -> Self {
        self.locals.insert(name.into(), value);
        self
    }

    pub fn local(&self, name: &str) -> Result<&Value, SimError> {
        self.locals
            .get(name)
            .ok_or_else(|| SimError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn pending_result(&self, key: &ReturnPosition) -> Option<&Value> {
        self.pending_results.get(key)
    }
}

/// The call stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStack {
    frames: Vector<MemoryFrame>,
}

impl MemoryStack {
    pub fn new() -> Self {
        MemoryStack {
            frames: Vector::new(),
        }
    }

    pub fn push(&self, frame: MemoryFrame) -> Self {
        let mut frames = self.frames.clone();
        frames.push_back(frame);
        MemoryStack { frames }
    }

    /// Remove the top frame, returning it with the remaining stack
    pub fn pop(&self) -> Result<(MemoryFrame, Self), SimError> {
        let mut frames = self.frames.clone();
        let frame = frames.pop_back().ok_or(SimError::NoStackFrame)?;
        Ok((frame, MemoryStack { frames }))
    }

    pub fn peek(&self) -> Result<&MemoryFrame, SimError> {
        self.frames.back().ok_or(SimError::NoStackFrame)
    }

    /// Rewrite a local binding of the top frame
    pub fn update(&self, variable: &str, value: Value) -> Result<Self, SimError> {
        self.map_top(|frame| {
            frame.locals.insert(variable.to_string(), value);
        })
    }

    /// Store a sub-expression value in the top frame's pending-results table
    pub fn record_result(&self, key: ReturnPosition, value: Value) -> Result<Self, SimError> {
        self.map_top(|frame| {
            frame.pending_results.insert(key, value);
        })
    }

    /// Drop the top frame's pending results belonging to the command at `position`
    pub fn clear_results(&self, position: &ProgramPosition) -> Result<Self, SimError> {
        self.map_top(|frame| {
            frame.pending_results = frame
                .pending_results
                .iter()
                .filter(|(key, _)| key.position != *position)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
        })
    }

    fn map_top(&self, f: impl FnOnce(&mut MemoryFrame)) -> Result<Self, SimError> {
        let mut frames = self.frames.clone();
        let top = frames.back_mut().ok_or(SimError::NoStackFrame)?;
        f(top);
        Ok(MemoryStack { frames })
    }

    /// All frames, bottom first (for rendering)
    pub fn frames(&self) -> impl Iterator<Item = &MemoryFrame> {
        self.frames.iter()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
