//! Memory model for the simulator
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Bool, Int, Str, Null, Ref)
//! - [`stack`]: Call stack of frames with locals and pending results
//! - [`heap`]: Objects addressed by [`value::Address`]
//!
//! [`Memory`] pairs the two. Every operation is a pure function returning a
//! new `Memory`, and only the top frame of the stack is ever read or written.

pub mod heap;
pub mod stack;
pub mod value;

use crate::interpreter::errors::SimError;
use heap::{Heap, HeapObject};
use stack::{MemoryFrame, MemoryStack};
use value::{Address, Value};

/// A readable and writable place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local variable of the top frame
    Variable(String),
    /// Field of a heap object
    Field { address: Address, field: String },
}

/// Call stack plus heap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    pub stack: MemoryStack,
    pub heap: Heap,
}

impl Memory {
    pub fn new() -> Self {
        Memory::default()
    }

    pub fn read(&self, location: &Location) -> Result<Value, SimError> {
        match location {
            Location::Variable(name) => self.stack.peek()?.local(name).cloned(),
            Location::Field { address, field } => self.heap.read(*address, field),
        }
    }

    pub fn write(&self, location: &Location, value: Value) -> Result<Memory, SimError> {
        match location {
            Location::Variable(name) => Ok(Memory {
                stack: self.stack.update(name, value)?,
                heap: self.heap.clone(),
            }),
            Location::Field { address, field } => Ok(Memory {
                stack: self.stack.clone(),
                heap: self.heap.write(*address, field, value)?,
            }),
        }
    }

    pub fn allocate(&self, object: HeapObject) -> (Address, Memory) {
        let (address, heap) = self.heap.allocate(object);
        let memory = Memory {
            stack: self.stack.clone(),
            heap,
        };
        (address, memory)
    }

    pub fn push(&self, frame: MemoryFrame) -> Memory {
        Memory {
            stack: self.stack.push(frame),
            heap: self.heap.clone(),
        }
    }

    pub fn pop(&self) -> Result<(MemoryFrame, Memory), SimError> {
        let (frame, stack) = self.stack.pop()?;
        let memory = Memory {
            stack,
            heap: self.heap.clone(),
        };
        Ok((frame, memory))
    }

    pub fn peek(&self) -> Result<&MemoryFrame, SimError> {
        self.stack.peek()
    }

    pub(crate) fn with_stack(&self, stack: MemoryStack) -> Memory {
        Memory {
            stack,
            heap: self.heap.clone(),
        }
    }
}
