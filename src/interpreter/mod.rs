//! Simulator execution engine
//!
//! This module provides the stepping logic:
//! - [`state`]: [`state::ProgramState`] snapshots and the transition function
//! - [`expressions`]: the evaluate/step protocol for expression nodes
//! - [`commands`]: command execution on top of that protocol
//! - [`engine`]: [`engine::Simulator`], which drives a state to completion and
//!   keeps the history
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! Each transition performs one micro-step: one sub-expression becomes a
//! value, or one command takes effect. A snapshot is recorded after every
//! transition so each one can be rendered as its own exercise frame.

pub mod commands;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod state;
