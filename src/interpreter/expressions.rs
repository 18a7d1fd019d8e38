//! Expression evaluation protocol
//!
//! Every expression node supports two operations:
//!
//! - [`Expression::evaluate`] returns the node's value if it is ready, and
//!   `None` otherwise. It never performs work.
//! - [`Expression::step`] makes exactly one node ready: it descends into the
//!   left-most direct child that is not ready and steps it, or, once all
//!   children are ready, reduces the node itself.
//!
//! # Readiness
//!
//! Constants are always ready. Every other node becomes ready through one
//! step of its own, and its value is recorded in the top frame's
//! pending-results table under `(position, expression position)`. A method
//! call's own step pushes the callee frame instead; its value is recorded by
//! the callee's `return`.
//!
//! Operators share one reduction path: operand types are checked with the
//! operator's result-type function, then the operator's reduction runs.

use crate::interpreter::errors::SimError;
use crate::interpreter::state::{instantiate, receiver_address, ProgramState};
use crate::memory::value::Value;
use crate::memory::{Location, Memory};
use crate::program::ast::{Expression, MethodCall, ValueType};
use crate::program::operators::Operator;
use crate::program::position::ExpressionPosition;
use tracing::trace;

/// Outcome of looking for the left-most child that is not ready
pub(crate) enum Children {
    /// Every child is ready; their values in order
    Ready(Vec<Value>),
    /// A child was stepped
    Stepped(ProgramState),
}

/// Step the left-most child of `at` that is not ready, or collect all child values
pub(crate) fn step_children(
    children: &[&Expression],
    state: &ProgramState,
    at: &ExpressionPosition,
) -> Result<Children, SimError> {
    let mut values = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let child_at = at.descend_expression_position(index);
        match child.evaluate(state, &child_at)? {
            Some(value) => values.push(value),
            None => {
                trace!(at = %child_at, expression = %child, "descend");
                let next = child.step(state, &child_at)?;
                trace!(at = %child_at.ascend_expression_position(), "ascend");
                return Ok(Children::Stepped(next));
            }
        }
    }
    Ok(Children::Ready(values))
}

/// Path of the left-most node among `children` of `at` that is not ready
pub(crate) fn first_unready_child(
    children: &[&Expression],
    state: &ProgramState,
    at: &ExpressionPosition,
) -> Result<Option<ExpressionPosition>, SimError> {
    for (index, child) in children.iter().enumerate() {
        let child_at = at.descend_expression_position(index);
        if let Some(path) = child.first_unready(state, &child_at)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

impl Expression {
    /// The node's value, if it and every sub-node are ready
    pub fn evaluate(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<Option<Value>, SimError> {
        match self {
            Expression::Constant(value) => Ok(Some(value.clone())),
            _ => state.pending(at),
        }
    }

    /// Make exactly one node of this tree ready
    pub fn step(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<ProgramState, SimError> {
        if self.evaluate(state, at)?.is_some() {
            return Err(SimError::protocol(format!(
                "step requested for '{}', which is already evaluated",
                self
            )));
        }

        match step_children(&self.children(), state, at)? {
            Children::Stepped(next) => Ok(next),
            Children::Ready(values) => self.reduce(state, at, &values),
        }
    }

    /// Path of the left-most node that is not ready, None if this tree is a value
    pub fn first_unready(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<Option<ExpressionPosition>, SimError> {
        if self.evaluate(state, at)?.is_some() {
            return Ok(None);
        }
        match first_unready_child(&self.children(), state, at)? {
            Some(path) => Ok(Some(path)),
            None => Ok(Some(at.clone())),
        }
    }

    /// Own step of a node whose children are all ready
    fn reduce(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
        values: &[Value],
    ) -> Result<ProgramState, SimError> {
        trace!(%at, expression = %self, "reduce");

        let value = match self {
            Expression::Constant(_) => {
                return Err(SimError::protocol("constants are never stepped"));
            }
            Expression::Variable(name) => state
                .memory()
                .read(&Location::Variable(name.clone()))?,
            Expression::This => Value::Ref(state.memory().peek()?.this_address),
            Expression::FieldAccess { field, .. } => {
                let receiver = values
                    .first()
                    .ok_or_else(|| SimError::protocol("field access without receiver value"))?;
                let address = receiver_address(receiver, &self.to_string())?;
                state.memory().read(&Location::Field {
                    address,
                    field: field.clone(),
                })?
            }
            Expression::Operator { op, .. } => self.apply_operator(op, values, state)?,
            Expression::New(type_name) => {
                let object = instantiate(state.program(), type_name)?;
                let (address, memory) = state.memory().allocate(object);
                return state
                    .with_memory(memory)
                    .with_result(at, Value::Ref(address));
            }
            Expression::Call(call) => return state.invoke(call, at, values),
        };

        state.with_result(at, value)
    }

    fn apply_operator(
        &self,
        op: &Operator,
        values: &[Value],
        state: &ProgramState,
    ) -> Result<Value, SimError> {
        if values.len() != op.arity {
            return Err(SimError::TypeError {
                expected: format!("{} operand(s)", op.arity),
                got: values.len().to_string(),
                context: self.to_string(),
            });
        }

        let types = values
            .iter()
            .map(|value| runtime_type(value, state))
            .collect::<Result<Vec<_>, _>>()?;
        if (op.result_type)(&types).is_none() {
            let got: Vec<String> = types.iter().map(|t| t.to_string()).collect();
            return Err(SimError::TypeError {
                expected: format!("operands valid for '{}'", op.symbol),
                got: got.join(", "),
                context: self.to_string(),
            });
        }

        (op.reduce)(values)
    }

    /// Whether this assignment target can be written without further stepping
    pub fn target_ready(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<bool, SimError> {
        match self {
            Expression::Variable(_) => Ok(true),
            Expression::FieldAccess { receiver, .. } => Ok(receiver
                .evaluate(state, &at.descend_expression_position(0))?
                .is_some()),
            _ => Err(SimError::InvalidAssignmentTarget {
                target: self.to_string(),
            }),
        }
    }

    /// Step the part of an assignment target that must be resolved before writing
    pub fn step_target(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<ProgramState, SimError> {
        match self {
            Expression::FieldAccess { receiver, .. } => {
                receiver.step(state, &at.descend_expression_position(0))
            }
            Expression::Variable(_) => Err(SimError::protocol(format!(
                "variable target '{}' needs no stepping",
                self
            ))),
            _ => Err(SimError::InvalidAssignmentTarget {
                target: self.to_string(),
            }),
        }
    }

    /// Left-most unresolved node of an assignment target
    pub fn first_unready_target(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<Option<ExpressionPosition>, SimError> {
        match self {
            Expression::FieldAccess { receiver, .. } => {
                receiver.first_unready(state, &at.descend_expression_position(0))
            }
            _ => Ok(None),
        }
    }

    /// Memory with `value` written to the place this target names
    pub fn write(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
        value: Value,
    ) -> Result<Memory, SimError> {
        let location = match self {
            Expression::Variable(name) => Location::Variable(name.clone()),
            Expression::FieldAccess { receiver, field } => {
                let receiver_at = at.descend_expression_position(0);
                let receiver_value = receiver.evaluate(state, &receiver_at)?.ok_or_else(|| {
                    SimError::protocol(format!("write to '{}' before its receiver is ready", self))
                })?;
                Location::Field {
                    address: receiver_address(&receiver_value, &self.to_string())?,
                    field: field.clone(),
                }
            }
            _ => {
                return Err(SimError::InvalidAssignmentTarget {
                    target: self.to_string(),
                });
            }
        };
        state.memory().write(&location, value)
    }
}

impl MethodCall {
    /// Step the left-most unready receiver/argument, or invoke once all are values
    pub fn step(
        &self,
        state: &ProgramState,
        at: &ExpressionPosition,
    ) -> Result<ProgramState, SimError> {
        match step_children(&self.children(), state, at)? {
            Children::Stepped(next) => Ok(next),
            Children::Ready(values) => state.invoke(self, at, &values),
        }
    }
}

/// Operand type of a runtime value; references report their object's runtime type
fn runtime_type(value: &Value, state: &ProgramState) -> Result<ValueType, SimError> {
    Ok(match value {
        Value::Bool(_) => ValueType::Bool,
        Value::Int(_) => ValueType::Int,
        Value::Str(_) => ValueType::Str,
        Value::Null => ValueType::Null,
        Value::Ref(address) => ValueType::Object(state.memory().heap.type_of(*address)?.to_string()),
    })
}
