//! Machine snapshots and the transition function
//!
//! A [`ProgramState`] is an immutable value: program, memory, the position
//! of the next command, and the expression cursor inside that command.
//! [`ProgramState::advance`] performs exactly one micro-step and returns the
//! successor state; the predecessor is left untouched, so states can be kept,
//! compared and replayed.
//!
//! # Continuations
//!
//! Suspension lives entirely in the data. A paused expression is described by
//! the values already recorded in the top frame's pending-results table; a
//! paused caller is described by the callee frame's `return_position`.

use crate::interpreter::errors::SimError;
use crate::memory::heap::HeapObject;
use crate::memory::stack::MemoryFrame;
use crate::memory::value::{Address, Value};
use crate::memory::Memory;
use crate::program::ast::{Command, MethodCall};
use crate::program::position::{ExpressionPosition, ProgramPosition, ReturnPosition};
use crate::program::Program;
use im::OrdMap;
use std::rc::Rc;
use tracing::debug;

/// Whole-machine snapshot
#[derive(Debug, Clone)]
pub struct ProgramState {
    program: Rc<Program>,
    memory: Memory,
    position: ProgramPosition,
    expression_position: ExpressionPosition,
    finished: bool,
    result: Option<Value>,
}

impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.program, &other.program)
            && self.memory == other.memory
            && self.position == other.position
            && self.expression_position == other.expression_position
            && self.finished == other.finished
            && self.result == other.result
    }
}

impl Eq for ProgramState {}

/// Fresh object of `type_name` with every declared field at its default value
pub(crate) fn instantiate(program: &Program, type_name: &str) -> Result<HeapObject, SimError> {
    let fields: OrdMap<String, Value> = program
        .all_fields(type_name)?
        .into_iter()
        .map(|field| (field.name.clone(), Value::default_for(&field.var_type)))
        .collect();
    Ok(HeapObject::new(type_name, fields))
}

/// Address held by a receiver value
pub(crate) fn receiver_address(value: &Value, expression: &str) -> Result<Address, SimError> {
    match value {
        Value::Ref(address) => Ok(*address),
        Value::Null => Err(SimError::NullDereference {
            expression: expression.to_string(),
        }),
        other => Err(SimError::TypeError {
            expected: "object".to_string(),
            got: other.kind().to_string(),
            context: expression.to_string(),
        }),
    }
}

impl ProgramState {
    /// Allocate an instance of `entry_type` and call its zero-argument
    /// `entry_method`; the resulting state is positioned on the method-entry marker
    pub fn start(
        program: Rc<Program>,
        entry_type: &str,
        entry_method: &str,
    ) -> Result<Self, SimError> {
        let object = instantiate(&program, entry_type)?;
        let (address, memory) = Memory::new().allocate(object);
        let position = program.first_position(entry_type, entry_method, 0)?;
        let frame = MemoryFrame::new(entry_method, None, address, entry_type);

        debug!(%position, %address, "starting simulation");
        Ok(ProgramState {
            program,
            memory: memory.push(frame),
            position,
            expression_position: ExpressionPosition::EMPTY,
            finished: false,
            result: None,
        })
    }

    /// Perform one micro-step
    pub fn advance(&self) -> Result<ProgramState, SimError> {
        if self.finished {
            return Err(SimError::ProgramFinished);
        }

        let next = match self.program.resolve_command(&self.position)? {
            Some(command) => {
                debug!(
                    position = %self.position,
                    cursor = %self.expression_position,
                    command = command.kind(),
                    "advance"
                );
                command.execute(self)?
            }
            None => {
                debug!(position = %self.position, "end of method body");
                self.return_from_method(None)?
            }
        };
        next.refresh_cursor()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn position(&self) -> &ProgramPosition {
        &self.position
    }

    /// Left-most sub-expression the next step makes ready, EMPTY when the command itself runs next
    ///
    /// The cursor is recomputed after every transition, including ones that
    /// move to a new command. A fresh command whose operands still need work
    /// therefore starts at its first unready node (`[1]` for `b = 1 == 1`),
    /// not at EMPTY. EMPTY always means every operand of the command is a value.
    pub fn expression_position(&self) -> &ExpressionPosition {
        &self.expression_position
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Value returned by the entry method, once finished
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn stack_depth(&self) -> usize {
        self.memory.stack.depth()
    }

    /// Command about to run, None past the end of a method body
    pub fn current_command(&self) -> Result<Option<&Command>, SimError> {
        if self.finished {
            return Ok(None);
        }
        self.program.resolve_command(&self.position)
    }

    /// Key of the sub-expression at `at` within the current command
    pub fn result_key(&self, at: &ExpressionPosition) -> ReturnPosition {
        ReturnPosition::new(self.position.clone(), at.clone())
    }

    /// Value already recorded for the sub-expression at `at`
    pub fn pending(&self, at: &ExpressionPosition) -> Result<Option<Value>, SimError> {
        let frame = self.memory.peek()?;
        Ok(frame.pending_result(&self.result_key(at)).cloned())
    }

    pub(crate) fn with_result(&self, at: &ExpressionPosition, value: Value) -> Result<Self, SimError> {
        let stack = self.memory.stack.record_result(self.result_key(at), value)?;
        Ok(self.with_memory(self.memory.with_stack(stack)))
    }

    pub(crate) fn with_memory(&self, memory: Memory) -> Self {
        ProgramState {
            memory,
            ..self.clone()
        }
    }

    /// Leave the current command for `next` within the same frame
    pub(crate) fn advance_to(&self, next: ProgramPosition) -> Result<Self, SimError> {
        let stack = self.memory.stack.clear_results(&self.position)?;
        Ok(ProgramState {
            memory: self.memory.with_stack(stack),
            position: next,
            expression_position: ExpressionPosition::EMPTY,
            ..self.clone()
        })
    }

    pub(crate) fn move_to_next_command(&self) -> Result<Self, SimError> {
        let next = self.program.next_position(&self.position)?;
        self.advance_to(next)
    }

    /// Dispatch `call` on its evaluated receiver and arguments, pushing the callee frame
    pub(crate) fn invoke(
        &self,
        call: &MethodCall,
        at: &ExpressionPosition,
        values: &[Value],
    ) -> Result<Self, SimError> {
        let (receiver, args) = values
            .split_first()
            .ok_or_else(|| SimError::protocol("call invoked without a receiver value"))?;
        let address = receiver_address(receiver, &call.to_string())?;
        let runtime_type = self.memory.heap.type_of(address)?;
        let resolved = self
            .program
            .resolve_method(runtime_type, &call.method, args.len())?;

        debug!(
            runtime_type,
            owner = resolved.owner,
            method = %call.method,
            depth = self.stack_depth() + 1,
            "dispatch"
        );

        let return_position = ReturnPosition::new(self.position.clone(), at.clone());
        let frame = resolved.method.params.iter().zip(args).fold(
            MemoryFrame::new(&call.method, Some(return_position), address, runtime_type),
            |frame, (param, value)| frame.with_local(param.name.clone(), value.clone()),
        );

        Ok(ProgramState {
            memory: self.memory.push(frame),
            position: ProgramPosition::method_entry(resolved.owner, &call.method),
            expression_position: ExpressionPosition::EMPTY,
            ..self.clone()
        })
    }

    /// Pop the current frame and resume its caller, delivering `value` to the
    /// caller's pending-results table at the call's own position
    pub(crate) fn return_from_method(&self, value: Option<Value>) -> Result<Self, SimError> {
        let (frame, memory) = self.memory.pop()?;

        match frame.return_position {
            None => {
                debug!(result = ?value, "entry method returned");
                Ok(ProgramState {
                    memory,
                    expression_position: ExpressionPosition::EMPTY,
                    finished: true,
                    result: value,
                    ..self.clone()
                })
            }
            Some(return_position) => {
                debug!(resume = %return_position, depth = memory.stack.depth(), "return");
                let position = return_position.position.clone();
                let delivered = value.unwrap_or(Value::Null);
                let stack = memory.stack.record_result(return_position, delivered)?;
                Ok(ProgramState {
                    memory: memory.with_stack(stack),
                    position,
                    expression_position: ExpressionPosition::EMPTY,
                    ..self.clone()
                })
            }
        }
    }

    /// Recompute the expression cursor for the command now due
    fn refresh_cursor(self) -> Result<Self, SimError> {
        let cursor = match self.current_command()? {
            Some(command) => command.pending_expression(&self)?,
            None => ExpressionPosition::EMPTY,
        };
        Ok(ProgramState {
            expression_position: cursor,
            ..self
        })
    }
}
