//! Built-in operators
//!
//! Every operator is one [`Operator`] value: a display form, a reduction over
//! fully evaluated arguments, and a static result-type function. The stepping
//! machinery in [`crate::interpreter::expressions`] is shared by all of them.
//!
//! Arithmetic is checked: overflow and division by zero are runtime errors
//! rather than wrapping or panicking.

use crate::interpreter::errors::SimError;
use crate::memory::value::Value;
use crate::program::ast::ValueType;
use std::fmt;

pub struct Operator {
    pub symbol: &'static str,
    pub arity: usize,
    /// Renders the operator applied to already-rendered arguments
    pub display: fn(&[String]) -> String,
    /// Reduces fully evaluated arguments; only called once `result_type` accepted them
    pub reduce: fn(&[Value]) -> Result<Value, SimError>,
    /// Result type for the given operand types, or None if they are ill-typed
    pub result_type: fn(&[ValueType]) -> Option<ValueType>,
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operator({})", self.symbol)
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.arity == other.arity
    }
}

fn infix(symbol: &str, args: &[String]) -> String {
    format!("({})", args.join(&format!(" {} ", symbol)))
}

fn prefix(symbol: &str, args: &[String]) -> String {
    format!("{}{}", symbol, args.join(""))
}

fn ints(args: &[Value]) -> Result<(i64, i64), SimError> {
    match args {
        [Value::Int(a), Value::Int(b)] => Ok((*a, *b)),
        _ => Err(SimError::protocol(
            "arithmetic operator reduced with non-integer operands",
        )),
    }
}

fn bools(args: &[Value]) -> Result<Vec<bool>, SimError> {
    args.iter()
        .map(|v| {
            v.as_bool()
                .ok_or_else(|| SimError::protocol("logical operator reduced with non-bool operand"))
        })
        .collect()
}

fn int_operands(types: &[ValueType]) -> bool {
    types.iter().all(|t| *t == ValueType::Int)
}

fn arith_type(types: &[ValueType]) -> Option<ValueType> {
    int_operands(types).then_some(ValueType::Int)
}

fn compare_type(types: &[ValueType]) -> Option<ValueType> {
    int_operands(types).then_some(ValueType::Bool)
}

fn logic_type(types: &[ValueType]) -> Option<ValueType> {
    types
        .iter()
        .all(|t| *t == ValueType::Bool)
        .then_some(ValueType::Bool)
}

fn equality_type(_types: &[ValueType]) -> Option<ValueType> {
    Some(ValueType::Bool)
}

fn checked(
    symbol: &str,
    args: &[Value],
    op: fn(i64, i64) -> Option<i64>,
) -> Result<Value, SimError> {
    let (a, b) = ints(args)?;
    op(a, b)
        .map(Value::Int)
        .ok_or_else(|| SimError::IntegerOverflow {
            operation: format!("{} {} {}", a, symbol, b),
        })
}

fn checked_division(
    symbol: &str,
    args: &[Value],
    op: fn(i64, i64) -> Option<i64>,
) -> Result<Value, SimError> {
    let (a, b) = ints(args)?;
    if b == 0 {
        return Err(SimError::DivisionByZero {
            operation: format!("{} {} {}", a, symbol, b),
        });
    }
    checked(symbol, args, op)
}

pub static EQ: Operator = Operator {
    symbol: "==",
    arity: 2,
    display: |args| infix("==", args),
    reduce: |args| Ok(Value::Bool(args[0] == args[1])),
    result_type: equality_type,
};

pub static NE: Operator = Operator {
    symbol: "!=",
    arity: 2,
    display: |args| infix("!=", args),
    reduce: |args| Ok(Value::Bool(args[0] != args[1])),
    result_type: equality_type,
};

pub static LT: Operator = Operator {
    symbol: "<",
    arity: 2,
    display: |args| infix("<", args),
    reduce: |args| ints(args).map(|(a, b)| Value::Bool(a < b)),
    result_type: compare_type,
};

pub static LE: Operator = Operator {
    symbol: "<=",
    arity: 2,
    display: |args| infix("<=", args),
    reduce: |args| ints(args).map(|(a, b)| Value::Bool(a <= b)),
    result_type: compare_type,
};

pub static GT: Operator = Operator {
    symbol: ">",
    arity: 2,
    display: |args| infix(">", args),
    reduce: |args| ints(args).map(|(a, b)| Value::Bool(a > b)),
    result_type: compare_type,
};

pub static GE: Operator = Operator {
    symbol: ">=",
    arity: 2,
    display: |args| infix(">=", args),
    reduce: |args| ints(args).map(|(a, b)| Value::Bool(a >= b)),
    result_type: compare_type,
};

/// Integer addition, or concatenation when either operand is a string
pub static ADD: Operator = Operator {
    symbol: "+",
    arity: 2,
    display: |args| infix("+", args),
    reduce: |args| match args {
        [Value::Str(a), b] => Ok(Value::Str(format!("{}{}", a, concat_text(b)))),
        [a, Value::Str(b)] => Ok(Value::Str(format!("{}{}", concat_text(a), b))),
        _ => checked("+", args, i64::checked_add),
    },
    result_type: |types| {
        if types.contains(&ValueType::Str) {
            Some(ValueType::Str)
        } else {
            arith_type(types)
        }
    },
};

fn concat_text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

pub static SUB: Operator = Operator {
    symbol: "-",
    arity: 2,
    display: |args| infix("-", args),
    reduce: |args| checked("-", args, i64::checked_sub),
    result_type: arith_type,
};

pub static MUL: Operator = Operator {
    symbol: "*",
    arity: 2,
    display: |args| infix("*", args),
    reduce: |args| checked("*", args, i64::checked_mul),
    result_type: arith_type,
};

pub static DIV: Operator = Operator {
    symbol: "/",
    arity: 2,
    display: |args| infix("/", args),
    reduce: |args| checked_division("/", args, i64::checked_div),
    result_type: arith_type,
};

pub static MOD: Operator = Operator {
    symbol: "%",
    arity: 2,
    display: |args| infix("%", args),
    reduce: |args| checked_division("%", args, i64::checked_rem),
    result_type: arith_type,
};

/// Logical and; both operands are always evaluated
pub static AND: Operator = Operator {
    symbol: "&&",
    arity: 2,
    display: |args| infix("&&", args),
    reduce: |args| bools(args).map(|b| Value::Bool(b.iter().all(|x| *x))),
    result_type: logic_type,
};

/// Logical or; both operands are always evaluated
pub static OR: Operator = Operator {
    symbol: "||",
    arity: 2,
    display: |args| infix("||", args),
    reduce: |args| bools(args).map(|b| Value::Bool(b.iter().any(|x| *x))),
    result_type: logic_type,
};

pub static NOT: Operator = Operator {
    symbol: "!",
    arity: 1,
    display: |args| prefix("!", args),
    reduce: |args| bools(args).map(|b| Value::Bool(!b[0])),
    result_type: logic_type,
};

pub static NEG: Operator = Operator {
    symbol: "-",
    arity: 1,
    display: |args| prefix("-", args),
    reduce: |args| match args {
        [Value::Int(n)] => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| SimError::IntegerOverflow {
                operation: format!("-{}", n),
            }),
        _ => Err(SimError::protocol("negation reduced with non-integer operand")),
    },
    result_type: arith_type,
};
