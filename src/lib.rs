//! # Introduction
//!
//! stepsim executes programs written in a small class-based language one
//! micro-step at a time, so that every step can be rendered as a frame of a
//! worked exercise (stack, locals and heap at that moment).
//!
//! ## Execution pipeline
//!
//! ```text
//! Program (types + method bodies) → ProgramState → advance → … → finished
//!                                        ↓
//!                                    Snapshots
//! ```
//!
//! 1. [`program`]: the static program table of types, fields, methods, the
//!    command/expression trees of method bodies, and the addressing scheme.
//! 2. [`interpreter`]: the transition function. An expression either yields
//!    a value or asks for one step on its left-most unfinished part; calls
//!    push frames and dispatch on the receiver's runtime type; returns thread
//!    their value back into the paused caller expression.
//! 3. [`memory`]: persistent [`memory::stack::MemoryStack`] and
//!    [`memory::heap::Heap`]; every transition yields new values.
//! 4. [`snapshot`]: history of states with a configurable memory limit.
//!
//! ## Supported language
//!
//! Types with fields, methods and single inheritance. Commands: assignment,
//! `if`/`else`, method call, `return`. Expressions: `bool`/`int`/`string`
//! literals, `null`, variables, `this`, field access, operators, method calls
//! and `new`.

pub mod interpreter;
pub mod memory;
pub mod program;
pub mod snapshot;

pub use interpreter::engine::{Simulator, SimulatorConfig};
pub use interpreter::errors::{ErrorClass, SimError};
pub use interpreter::state::ProgramState;
pub use memory::value::{Address, Value};
pub use program::Program;
