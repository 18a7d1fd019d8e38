//! Property-based tests for the stepping protocol.
//!
//! Random integer expression trees are assigned to a variable and checked for:
//! 1. Evaluation completeness: one step per non-constant node, then the assignment
//! 2. Progress: no transition leaves position, cursor and stack depth unchanged
//! 3. Determinism: advancing the same state twice gives equal successors

use proptest::prelude::*;
use std::rc::Rc;
use stepsim::program::ast::{Command, Expression};
use stepsim::program::operators::{ADD, MUL, NEG, SUB};
use stepsim::program::{MethodDef, TypeDef};
use stepsim::{Program, ProgramState, Value};

const VARIABLE_VALUE: i64 = 3;

#[derive(Debug, Clone)]
enum Arith {
    Const(i64),
    Var,
    Neg(Box<Arith>),
    Add(Box<Arith>, Box<Arith>),
    Sub(Box<Arith>, Box<Arith>),
    Mul(Box<Arith>, Box<Arith>),
}

impl Arith {
    fn expected(&self) -> i64 {
        match self {
            Arith::Const(n) => *n,
            Arith::Var => VARIABLE_VALUE,
            Arith::Neg(a) => -a.expected(),
            Arith::Add(a, b) => a.expected() + b.expected(),
            Arith::Sub(a, b) => a.expected() - b.expected(),
            Arith::Mul(a, b) => a.expected() * b.expected(),
        }
    }

    fn to_expression(&self) -> Expression {
        match self {
            Arith::Const(n) => Expression::int(*n),
            Arith::Var => Expression::var("v"),
            Arith::Neg(a) => Expression::apply(&NEG, vec![a.to_expression()]),
            Arith::Add(a, b) => Expression::apply(&ADD, vec![a.to_expression(), b.to_expression()]),
            Arith::Sub(a, b) => Expression::apply(&SUB, vec![a.to_expression(), b.to_expression()]),
            Arith::Mul(a, b) => Expression::apply(&MUL, vec![a.to_expression(), b.to_expression()]),
        }
    }
}

fn arith_strategy() -> impl Strategy<Value = Arith> {
    let leaf = prop_oneof![(-9i64..10).prop_map(Arith::Const), Just(Arith::Var)];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|a| Arith::Neg(Box::new(a))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Arith::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Arith::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Arith::Mul(Box::new(a), Box::new(b))),
        ]
    })
}

/// State positioned on `r = <expression>`, after `v` has been assigned
fn state_before_assignment(expression: Expression) -> ProgramState {
    let main = TypeDef::new("Main").with_method(MethodDef::new(
        "main",
        vec![],
        vec![
            Command::assign(Expression::var("v"), Expression::int(VARIABLE_VALUE)),
            Command::assign(Expression::var("r"), expression),
            Command::ret(Expression::var("r")),
        ],
    ));
    let program = Rc::new(Program::new(vec![main]).unwrap());
    let initial = ProgramState::start(program, "Main", "main").unwrap();
    // Method entry, then the assignment of v
    initial.advance().unwrap().advance().unwrap()
}

proptest! {
    #[test]
    fn steps_match_pending_nodes(tree in arith_strategy()) {
        let expression = tree.to_expression();
        let expected_steps = expression.pending_nodes() + 1;
        let mut state = state_before_assignment(expression);
        let position = state.position().clone();

        let mut steps = 0;
        while state.position() == &position {
            state = state.advance().unwrap();
            steps += 1;
        }

        prop_assert_eq!(steps, expected_steps);
        let result = state.memory().peek().unwrap().local("r").unwrap().clone();
        prop_assert_eq!(result, Value::Int(tree.expected()));
    }

    #[test]
    fn transitions_progress_and_are_deterministic(tree in arith_strategy()) {
        let mut state = state_before_assignment(tree.to_expression());

        while !state.is_finished() {
            let next = state.advance().unwrap();
            prop_assert!(
                state.position() != next.position()
                    || state.expression_position() != next.expression_position()
                    || state.stack_depth() != next.stack_depth()
            );
            prop_assert_eq!(&state.advance().unwrap(), &next);
            state = next;
        }
        prop_assert_eq!(state.result(), Some(&Value::Int(tree.expected())));
    }
}
