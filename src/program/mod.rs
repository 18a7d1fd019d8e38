//! Static program definition
//!
//! A [`Program`] is the read-only table of types the simulator runs against:
//! - [`ast`]: command and expression trees of method bodies
//! - [`operators`]: built-in operators
//! - [`position`]: addressing of commands and sub-expressions
//!
//! # Dispatch
//!
//! Methods are looked up by `(type, name)` in a flat table, walking the
//! declared supertype chain from the receiver's runtime type. The first type
//! on the chain that defines the method wins, which is what makes overriding
//! work. A body matches only when both name and arity agree; a subtype's
//! `m(x)` does not hide an inherited `m()`.

pub mod ast;
pub mod operators;
pub mod position;

use crate::interpreter::errors::SimError;
use ast::{Command, Variable};
use position::ProgramPosition;
use rustc_hash::{FxHashMap, FxHashSet};

/// A method body; `commands[0]` is always [`Command::MethodEntry`]
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<Variable>,
    pub commands: Vec<Command>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, params: Vec<Variable>, body: Vec<Command>) -> Self {
        let mut commands = Vec::with_capacity(body.len() + 1);
        commands.push(Command::MethodEntry);
        commands.extend(body);
        MethodDef {
            name: name.into(),
            params,
            commands,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A class: declared fields, methods and an optional supertype
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub supertype: Option<String>,
    pub fields: Vec<Variable>,
    pub methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDef {
            name: name.into(),
            supertype: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn with_field(mut self, field: Variable) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }
}

/// Outcome of method resolution
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMethod<'p> {
    /// Type whose body was selected (the runtime type or one of its supertypes)
    pub owner: &'p str,
    pub method: &'p MethodDef,
}

/// Read-only table of types and method bodies
#[derive(Debug, Clone)]
pub struct Program {
    types: FxHashMap<String, TypeDef>,
    /// (type, method name) -> index into that type's `methods`
    method_table: FxHashMap<(String, String), usize>,
}

impl Program {
    /// Index the given types, rejecting duplicates, unknown supertypes and cycles
    pub fn new(type_defs: Vec<TypeDef>) -> Result<Self, SimError> {
        let mut types = FxHashMap::default();
        let mut method_table = FxHashMap::default();

        for def in type_defs {
            if types.contains_key(&def.name) {
                return Err(SimError::DuplicateType { name: def.name });
            }
            for (index, method) in def.methods.iter().enumerate() {
                let key = (def.name.clone(), method.name.clone());
                if method_table.insert(key, index).is_some() {
                    return Err(SimError::DuplicateMethod {
                        type_name: def.name.clone(),
                        method: method.name.clone(),
                    });
                }
            }
            types.insert(def.name.clone(), def);
        }

        let program = Program {
            types,
            method_table,
        };
        for name in program.types.keys() {
            program.supertype_chain(name)?;
        }
        Ok(program)
    }

    pub fn type_def(&self, name: &str) -> Result<&TypeDef, SimError> {
        self.types.get(name).ok_or_else(|| SimError::UnknownType {
            name: name.to_string(),
        })
    }

    /// The type itself followed by its supertypes, nearest first
    pub fn supertype_chain(&self, name: &str) -> Result<Vec<&TypeDef>, SimError> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = Some(name);

        while let Some(type_name) = current {
            if !seen.insert(type_name) {
                return Err(SimError::InheritanceCycle {
                    type_name: name.to_string(),
                });
            }
            let def = self.type_def(type_name)?;
            chain.push(def);
            current = def.supertype.as_deref();
        }
        Ok(chain)
    }

    /// Every field an object of `type_name` carries, inherited fields first
    pub fn all_fields(&self, type_name: &str) -> Result<Vec<&Variable>, SimError> {
        let chain = self.supertype_chain(type_name)?;
        Ok(chain
            .iter()
            .rev()
            .flat_map(|def| def.fields.iter())
            .collect())
    }

    /// Select the body of `method` for a receiver whose runtime type is `runtime_type`
    ///
    /// The nearest type on the chain defining `method` with `arity` parameters
    /// wins. A name defined only with other arities is an argument-count
    /// mismatch, reported against the nearest such definition.
    pub fn resolve_method(
        &self,
        runtime_type: &str,
        method: &str,
        arity: usize,
    ) -> Result<ResolvedMethod<'_>, SimError> {
        let mut nearest_mismatch: Option<(&TypeDef, &MethodDef)> = None;

        for def in self.supertype_chain(runtime_type)? {
            let key = (def.name.clone(), method.to_string());
            let Some(&index) = self.method_table.get(&key) else {
                continue;
            };
            let body = &def.methods[index];
            if body.arity() == arity {
                return Ok(ResolvedMethod {
                    owner: &def.name,
                    method: body,
                });
            }
            nearest_mismatch.get_or_insert((def, body));
        }

        match nearest_mismatch {
            Some((def, body)) => Err(SimError::ArgumentCountMismatch {
                type_name: def.name.clone(),
                method: method.to_string(),
                expected: body.arity(),
                got: arity,
            }),
            None => Err(SimError::MissingMethod {
                type_name: runtime_type.to_string(),
                method: method.to_string(),
                arity,
            }),
        }
    }

    /// First position inside the body `method` resolves to for `runtime_type`
    pub fn first_position(
        &self,
        runtime_type: &str,
        method: &str,
        arity: usize,
    ) -> Result<ProgramPosition, SimError> {
        let resolved = self.resolve_method(runtime_type, method, arity)?;
        Ok(ProgramPosition::method_entry(resolved.owner, method))
    }

    /// Declared parameters of the body `method` resolves to for `runtime_type`
    pub fn parameters(
        &self,
        runtime_type: &str,
        method: &str,
        arity: usize,
    ) -> Result<&[Variable], SimError> {
        Ok(&self.resolve_method(runtime_type, method, arity)?.method.params)
    }

    fn method_body(&self, position: &ProgramPosition) -> Result<&MethodDef, SimError> {
        let key = (position.type_name.clone(), position.method_name.clone());
        let index = self
            .method_table
            .get(&key)
            .ok_or_else(|| SimError::MalformedPosition {
                position: position.clone(),
                reason: "no such method body".to_string(),
            })?;
        Ok(&self.type_def(&position.type_name)?.methods[*index])
    }

    /// Commands of the block the innermost level of `position` indexes into
    fn block_at<'p>(&'p self, position: &ProgramPosition) -> Result<&'p [Command], SimError> {
        let malformed = |reason: &str| SimError::MalformedPosition {
            position: position.clone(),
            reason: reason.to_string(),
        };

        let (first, rest) = position
            .block_path
            .split_first()
            .ok_or_else(|| malformed("empty block path"))?;
        if first.block != 0 {
            return Err(malformed("method body must be block 0"));
        }

        let mut block: &[Command] = &self.method_body(position)?.commands;
        let mut command_index = first.command;
        for level in rest {
            let enclosing = block
                .get(command_index)
                .ok_or_else(|| malformed("command index out of range"))?;
            block = enclosing
                .block(level.block)
                .ok_or_else(|| malformed("command has no such block"))?;
            command_index = level.command;
        }
        Ok(block)
    }

    /// The command `position` names, or None when it is one past the end of
    /// the method body (falling off the end of a method)
    pub fn resolve_command(&self, position: &ProgramPosition) -> Result<Option<&Command>, SimError> {
        let block = self.block_at(position)?;
        let index = position
            .block_path
            .last()
            .map(|level| level.command)
            .unwrap_or_default();

        match block.get(index) {
            Some(command) => Ok(Some(command)),
            None if index == block.len() && position.depth() == 1 => Ok(None),
            None => Err(SimError::MalformedPosition {
                position: position.clone(),
                reason: format!("command index {} out of range for block of {}", index, block.len()),
            }),
        }
    }

    /// Position of the command that runs after the one at `position` completes,
    /// leaving finished nested blocks
    pub fn next_position(&self, position: &ProgramPosition) -> Result<ProgramPosition, SimError> {
        let mut next = position.increment_command_position();
        loop {
            let block = self.block_at(&next)?;
            let index = next.block_path.last().map(|l| l.command).unwrap_or_default();
            if index < block.len() {
                return Ok(next);
            }
            match next.ascend_block() {
                Some(enclosing) => next = enclosing.increment_command_position(),
                // End of the method body
                None => return Ok(next),
            }
        }
    }
}
