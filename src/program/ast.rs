// Command and expression trees for the simulated language

use crate::memory::value::Value;
use crate::program::operators::Operator;
use std::fmt;

/// Declared type of a field, parameter or operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Str,
    Object(String), // Type name
    Null,           // Type of the `null` literal
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Str => write!(f, "string"),
            ValueType::Object(name) => write!(f, "{}", name),
            ValueType::Null => write!(f, "null"),
        }
    }
}

/// A declared name with its type (fields and parameters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub var_type: ValueType,
}

impl Variable {
    pub fn new(name: impl Into<String>, var_type: ValueType) -> Self {
        Variable {
            name: name.into(),
            var_type,
        }
    }
}

/// Method invocation, used both as an expression and as a command
///
/// Child 0 is the receiver, child `1 + i` is argument `i`.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub receiver: Box<Expression>,
    pub method: String,
    pub args: Vec<Expression>,
}

impl MethodCall {
    pub fn children(&self) -> Vec<&Expression> {
        std::iter::once(self.receiver.as_ref())
            .chain(self.args.iter())
            .collect()
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}.{}({})", self.receiver, self.method, args.join(", "))
    }
}

/// Expression nodes
#[derive(Debug, Clone)]
pub enum Expression {
    /// Bool, Int, Str or Null literal
    Constant(Value),
    Variable(String),
    This,
    FieldAccess {
        receiver: Box<Expression>,
        field: String,
    },
    Operator {
        op: &'static Operator,
        args: Vec<Expression>,
    },
    Call(MethodCall),
    /// Allocation of a fresh object of the named type
    New(String),
}

impl Expression {
    pub fn bool(b: bool) -> Self {
        Expression::Constant(Value::Bool(b))
    }

    pub fn int(n: i64) -> Self {
        Expression::Constant(Value::Int(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expression::Constant(Value::Str(s.into()))
    }

    pub fn null() -> Self {
        Expression::Constant(Value::Null)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn field(receiver: Expression, field: impl Into<String>) -> Self {
        Expression::FieldAccess {
            receiver: Box::new(receiver),
            field: field.into(),
        }
    }

    pub fn apply(op: &'static Operator, args: Vec<Expression>) -> Self {
        Expression::Operator { op, args }
    }

    pub fn call(receiver: Expression, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call(MethodCall {
            receiver: Box::new(receiver),
            method: method.into(),
            args,
        })
    }

    pub fn new_object(type_name: impl Into<String>) -> Self {
        Expression::New(type_name.into())
    }

    /// Direct sub-expressions, in evaluation order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::FieldAccess { receiver, .. } => vec![receiver.as_ref()],
            Expression::Operator { args, .. } => args.iter().collect(),
            Expression::Call(call) => call.children(),
            Expression::Constant(_)
            | Expression::Variable(_)
            | Expression::This
            | Expression::New(_) => Vec::new(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// Number of nodes that need a step of their own before the tree is a value
    pub fn pending_nodes(&self) -> usize {
        let own = usize::from(!self.is_constant());
        own + self
            .children()
            .into_iter()
            .map(Expression::pending_nodes)
            .sum::<usize>()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::This => write!(f, "this"),
            Expression::FieldAccess { receiver, field } => write!(f, "{}.{}", receiver, field),
            Expression::Operator { op, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", (op.display)(&args))
            }
            Expression::Call(call) => write!(f, "{}", call),
            Expression::New(type_name) => write!(f, "new {}()", type_name),
        }
    }
}

/// Commands that make up method bodies
#[derive(Debug, Clone)]
pub enum Command {
    /// First command of every method body
    MethodEntry,
    Assignment {
        target: Expression,
        value: Expression,
    },
    Conditional {
        condition: Expression,
        then_branch: Vec<Command>,
        else_branch: Option<Vec<Command>>,
    },
    Call(MethodCall),
    Return(Option<Expression>),
}

impl Command {
    pub fn assign(target: Expression, value: Expression) -> Self {
        Command::Assignment { target, value }
    }

    pub fn if_then(condition: Expression, then_branch: Vec<Command>) -> Self {
        Command::Conditional {
            condition,
            then_branch,
            else_branch: None,
        }
    }

    pub fn if_else(
        condition: Expression,
        then_branch: Vec<Command>,
        else_branch: Vec<Command>,
    ) -> Self {
        Command::Conditional {
            condition,
            then_branch,
            else_branch: Some(else_branch),
        }
    }

    pub fn call(receiver: Expression, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Command::Call(MethodCall {
            receiver: Box::new(receiver),
            method: method.into(),
            args,
        })
    }

    pub fn ret(value: Expression) -> Self {
        Command::Return(Some(value))
    }

    pub fn ret_void() -> Self {
        Command::Return(None)
    }

    /// Nested block selected by `branch`, for conditionals
    pub fn block(&self, branch: usize) -> Option<&[Command]> {
        match (self, branch) {
            (Command::Conditional { then_branch, .. }, 0) => Some(then_branch.as_slice()),
            (
                Command::Conditional {
                    else_branch: Some(else_branch),
                    ..
                },
                1,
            ) => Some(else_branch.as_slice()),
            _ => None,
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Command::MethodEntry => "method-entry",
            Command::Assignment { .. } => "assignment",
            Command::Conditional { .. } => "conditional",
            Command::Call(_) => "call",
            Command::Return(_) => "return",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MethodEntry => write!(f, "<method entry>"),
            Command::Assignment { target, value } => write!(f, "{} = {}", target, value),
            Command::Conditional {
                condition,
                else_branch,
                ..
            } => {
                if else_branch.is_some() {
                    write!(f, "if ({}) {{ … }} else {{ … }}", condition)
                } else {
                    write!(f, "if ({}) {{ … }}", condition)
                }
            }
            Command::Call(call) => write!(f, "{}", call),
            Command::Return(Some(value)) => write!(f, "return {}", value),
            Command::Return(None) => write!(f, "return"),
        }
    }
}
