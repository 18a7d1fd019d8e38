//! Command execution
//!
//! Each command is a state transition built on the expression protocol:
//! while one of its expressions is not ready, executing the command steps
//! that expression; once everything is a value, the command takes effect and
//! moves the program position.
//!
//! Expression paths inside a command:
//!
//! | Command    | Roots                                         |
//! |------------|-----------------------------------------------|
//! | Assignment | target `0`, value `1`                         |
//! | Conditional| condition `0`                                 |
//! | Return     | value `0`                                     |
//! | Call       | the call itself at EMPTY: receiver `0`, args `1..` |

use crate::interpreter::errors::SimError;
use crate::interpreter::expressions::first_unready_child;
use crate::interpreter::state::ProgramState;
use crate::program::ast::Command;
use crate::program::position::ExpressionPosition;

fn root(index: usize) -> ExpressionPosition {
    ExpressionPosition::EMPTY.descend_expression_position(index)
}

impl Command {
    /// Perform one micro-step of this command
    pub fn execute(&self, state: &ProgramState) -> Result<ProgramState, SimError> {
        match self {
            Command::MethodEntry => state.advance_to(state.position().increment_position()),

            Command::Assignment { target, value } => {
                let (target_at, value_at) = (root(0), root(1));
                if !target.target_ready(state, &target_at)? {
                    return target.step_target(state, &target_at);
                }
                let Some(result) = value.evaluate(state, &value_at)? else {
                    return value.step(state, &value_at);
                };
                let memory = target.write(state, &target_at, result)?;
                state.with_memory(memory).move_to_next_command()
            }

            Command::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let at = root(0);
                let Some(value) = condition.evaluate(state, &at)? else {
                    return condition.step(state, &at);
                };
                let taken = value.as_bool().ok_or_else(|| SimError::TypeError {
                    expected: "bool".to_string(),
                    got: value.kind().to_string(),
                    context: condition.to_string(),
                })?;

                match (taken, else_branch) {
                    (true, _) => enter_block(state, 0, then_branch),
                    (false, Some(else_branch)) => enter_block(state, 1, else_branch),
                    (false, None) => state.move_to_next_command(),
                }
            }

            Command::Call(call) => {
                // A result at EMPTY means the callee has already returned here
                if state.pending(&ExpressionPosition::EMPTY)?.is_some() {
                    return state.move_to_next_command();
                }
                call.step(state, &ExpressionPosition::EMPTY)
            }

            Command::Return(None) => state.return_from_method(None),

            Command::Return(Some(expression)) => {
                let at = root(0);
                match expression.evaluate(state, &at)? {
                    Some(value) => state.return_from_method(Some(value)),
                    None => expression.step(state, &at),
                }
            }
        }
    }

    /// Path of the sub-expression the next step of this command makes ready,
    /// EMPTY when the command itself takes effect next
    pub fn pending_expression(&self, state: &ProgramState) -> Result<ExpressionPosition, SimError> {
        let pending = match self {
            Command::MethodEntry | Command::Return(None) => None,
            Command::Assignment { target, value } => {
                match target.first_unready_target(state, &root(0))? {
                    Some(path) => Some(path),
                    None => value.first_unready(state, &root(1))?,
                }
            }
            Command::Conditional { condition, .. } => condition.first_unready(state, &root(0))?,
            Command::Return(Some(expression)) => expression.first_unready(state, &root(0))?,
            Command::Call(call) => {
                if state.pending(&ExpressionPosition::EMPTY)?.is_some() {
                    None
                } else {
                    first_unready_child(&call.children(), state, &ExpressionPosition::EMPTY)?
                }
            }
        };
        Ok(pending.unwrap_or(ExpressionPosition::EMPTY))
    }
}

/// Descend into `block`, or skip past the conditional when the block is empty
fn enter_block(
    state: &ProgramState,
    branch: usize,
    block: &[Command],
) -> Result<ProgramState, SimError> {
    if block.is_empty() {
        return state.move_to_next_command();
    }
    state.advance_to(state.position().descend_block(branch))
}
