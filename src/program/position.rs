//! Program addressing
//!
//! A [`ProgramPosition`] names the command about to run: a method of a type,
//! plus a path of `(block, command)` pairs descending through nested blocks.
//! Level 0 always addresses the method body itself (`block == 0`); each deeper
//! level selects a branch of the conditional found at the level above.
//!
//! An [`ExpressionPosition`] locates a sub-expression inside the command the
//! program position names, as a path of child indices. [`ExpressionPosition::EMPTY`]
//! addresses the command itself.
//!
//! ```text
//! Derived.contains [0:3 / 1:0]   → body command 3 is an `if`; its else-branch, command 0
//! ```

use std::fmt;

/// One nesting level of a [`ProgramPosition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex {
    pub block: usize,
    pub command: usize,
}

/// Which command, in which method, of which type is about to run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramPosition {
    pub type_name: String,
    pub method_name: String,
    pub block_path: Vec<BlockIndex>,
}

impl ProgramPosition {
    /// Position of the method-entry marker of a method body
    pub fn method_entry(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        ProgramPosition {
            type_name: type_name.into(),
            method_name: method_name.into(),
            block_path: vec![BlockIndex {
                block: 0,
                command: 0,
            }],
        }
    }

    /// Enter branch `branch` of the command at the current position
    pub fn descend_block(&self, branch: usize) -> Self {
        let mut next = self.clone();
        next.block_path.push(BlockIndex {
            block: branch,
            command: 0,
        });
        next
    }

    /// Drop the innermost nesting level, addressing the enclosing command
    pub fn ascend_block(&self) -> Option<Self> {
        if self.block_path.len() <= 1 {
            return None;
        }
        let mut next = self.clone();
        next.block_path.pop();
        Some(next)
    }

    /// Advance the command index at the innermost level
    pub fn increment_command_position(&self) -> Self {
        let mut next = self.clone();
        if let Some(level) = next.block_path.last_mut() {
            level.command += 1;
        }
        next
    }

    /// Step over the method-entry marker to the first real command of the body
    pub fn increment_position(&self) -> Self {
        ProgramPosition {
            type_name: self.type_name.clone(),
            method_name: self.method_name.clone(),
            block_path: vec![BlockIndex {
                block: 0,
                command: 1,
            }],
        }
    }

    pub fn depth(&self) -> usize {
        self.block_path.len()
    }
}

impl fmt::Display for ProgramPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} [", self.type_name, self.method_name)?;
        for (i, level) in self.block_path.iter().enumerate() {
            if i > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{}:{}", level.block, level.command)?;
        }
        write!(f, "]")
    }
}

/// Path of child indices to a sub-expression of the current command
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionPosition(Vec<usize>);

impl ExpressionPosition {
    /// The command itself; all of its expressions are values
    pub const EMPTY: ExpressionPosition = ExpressionPosition(Vec::new());

    pub fn new(path: Vec<usize>) -> Self {
        ExpressionPosition(path)
    }

    pub fn descend_expression_position(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        ExpressionPosition(path)
    }

    pub fn ascend_expression_position(&self) -> Self {
        let mut path = self.0.clone();
        path.pop();
        ExpressionPosition(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn path(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ExpressionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "EMPTY");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Where to resume a caller, and the key under which its pending result is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReturnPosition {
    pub position: ProgramPosition,
    pub expression: ExpressionPosition,
}

impl ReturnPosition {
    pub fn new(position: ProgramPosition, expression: ExpressionPosition) -> Self {
        ReturnPosition {
            position,
            expression,
        }
    }
}

impl fmt::Display for ReturnPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.position, self.expression)
    }
}
