//! A calculator for arithmetic expressions, built on `descent` actions.
//!
//! Actions only run once an expression has fully matched, in the order their
//! rules completed. For binary operators that's postfix order, so a plain
//! operand stack is enough to evaluate.

use anyhow::{anyhow, bail, Result};
use descent::{Engine, Grammar, Replay, RuleId, Rules};

/// The text grammar used by `arithmetic_ebnf`.
pub const ARITHMETIC_EBNF: &str = include_str!("../arithmetic.ebnf");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
        }
    }
}

/// Operand stack driven by parse actions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Calculator {
    stack: Vec<f64>,
    errors: Vec<String>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.stack.push(value);
    }

    /// Pop two operands and push `a op b`, where `b` was on top.
    pub fn apply(&mut self, op: Op) {
        match (self.stack.pop(), self.stack.pop()) {
            (Some(b), Some(a)) => self.stack.push(op.apply(a, b)),
            _ => self.errors.push(format!("missing operand for {:?}", op)),
        }
    }

    pub fn stack(&self) -> &[f64] {
        &self.stack
    }

    /// The single value left on the stack.
    pub fn result(&self) -> Result<f64> {
        if let Some(err) = self.errors.first() {
            bail!("{}", err);
        }
        match self.stack.as_slice() {
            [value] => Ok(*value),
            stack => Err(anyhow!("expected one value on the stack, found {}", stack.len())),
        }
    }
}

fn push_number(calc: &mut Calculator, m: &Replay<'_, '_>) {
    match m.text().parse() {
        Ok(value) => calc.push(value),
        Err(err) => calc.errors.push(format!("bad number {:?}: {}", m.text(), err)),
    }
}

/// Arithmetic with the usual precedence, written with repetition so no rule
/// refers to itself. Whitespace is allowed between tokens.
///
/// primary = secondary { ("+" | "-") secondary }
/// secondary = tertiary { ("*" | "/") tertiary }
/// tertiary = "(" primary ")" | number
pub struct Arithmetic;

impl Grammar for Arithmetic {
    type Output = Calculator;

    fn define(g: &mut Rules<Calculator>) -> RuleId {
        let digit = g.range('0', '9');
        let digits = g.one_or_more(digit);
        let fraction = g.all(".", digits);
        let fraction = g.optional(fraction);
        let number = g.all(digits, fraction);
        let number = g.action(number, push_number);

        let open = g.literal("(");
        let primary = g.named("primary");
        let close = g.literal(")");
        let group = g.follows_all(&[open, primary, close]);
        let tertiary = g.either(group, number);
        g.add_named_rule("tertiary", tertiary);

        let secondary = binary(g, "tertiary", &[("*", Op::Mul), ("/", Op::Div)]);
        g.add_named_rule("secondary", secondary);

        let primary = binary(g, "secondary", &[("+", Op::Add), ("-", Op::Sub)]);
        g.add_named_rule("primary", primary);

        let root = g.named("primary");
        g.eof(root)
    }
}

/// operand { op operand }, applying each op as it's matched. Whitespace may
/// precede every op.
fn binary(g: &mut Rules<Calculator>, operand: &str, ops: &[(&str, Op)]) -> RuleId {
    let tails: Vec<RuleId> = ops
        .iter()
        .map(|&(symbol, op)| {
            let rhs = g.named(operand);
            let tail = g.follows(symbol, rhs);
            g.action(tail, move |calc: &mut Calculator, _| calc.apply(op))
        })
        .collect();
    let tail = g.either_of(&tails);
    let ws = g.whitespace();
    let tail = g.all(ws, tail);
    let tails = g.zero_or_more(tail);
    let first = g.named(operand);
    g.follows(first, tails)
}

/// Arithmetic written left recursively.
///
/// term = term "+" fact | term "-" fact | fact
/// fact = fact "*" term | fact "/" term | "(" term ")" | num
///
/// A named rule can't be entered while it's already the innermost active
/// one, so the recursive alternatives always fail and only a lone operand
/// (possibly parenthesized) ever matches.
pub struct LeftRecursive;

impl Grammar for LeftRecursive {
    type Output = Calculator;

    fn define(g: &mut Rules<Calculator>) -> RuleId {
        let digit = g.range('0', '9');
        let num = g.one_or_more(digit);
        let num = g.action(num, push_number);

        let add = recursive_op(g, "term", "+", "fact", Op::Add);
        let sub = recursive_op(g, "term", "-", "fact", Op::Sub);
        let fact = g.named("fact");
        let term = g.either_of(&[add, sub, fact]);
        g.add_named_rule("term", term);

        let mul = recursive_op(g, "fact", "*", "term", Op::Mul);
        let div = recursive_op(g, "fact", "/", "term", Op::Div);
        let open = g.literal("(");
        let inner = g.named("term");
        let close = g.literal(")");
        let group = g.all_of(&[open, inner, close]);
        let fact = g.either_of(&[mul, div, group, num]);
        g.add_named_rule("fact", fact);

        let root = g.named("term");
        g.eof(root)
    }
}

fn recursive_op(g: &mut Rules<Calculator>, lhs: &str, symbol: &str, rhs: &str, op: Op) -> RuleId {
    let lhs = g.named(lhs);
    let symbol = g.literal(symbol);
    let rhs = g.named(rhs);
    let rule = g.all_of(&[lhs, symbol, rhs]);
    g.action(rule, move |calc: &mut Calculator, _| calc.apply(op))
}

pub fn arithmetic() -> Engine<Calculator> {
    Engine::from_grammar::<Arithmetic>()
}

pub fn left_recursive() -> Engine<Calculator> {
    Engine::from_grammar::<LeftRecursive>()
}

/// An engine for `ARITHMETIC_EBNF`, with actions attached to its productions
/// by name. Tokens must be adjacent.
pub fn arithmetic_ebnf() -> Result<Engine<Calculator>> {
    let grammar: ebnf::Grammar = ARITHMETIC_EBNF.parse()?;

    let mut engine = Engine::new();
    let rules = engine.rules_mut();
    let expr = grammar.install(rules)?;
    rules.attach("number", push_number)?;
    for &(name, op) in &[
        ("add", Op::Add),
        ("sub", Op::Sub),
        ("mul", Op::Mul),
        ("div", Op::Div),
    ] {
        rules.attach(name, move |calc: &mut Calculator, _| calc.apply(op))?;
    }
    let root = rules.eof(expr);
    engine.set_root(root);
    Ok(engine)
}

/// Parse `expr` with `engine`, returning the computed value.
pub fn evaluate_with(engine: &mut Engine<Calculator>, expr: &str) -> Result<f64> {
    let mut calc = Calculator::new();
    if !engine.parse(expr.trim(), &mut calc)? {
        bail!("invalid expression: {:?}", expr);
    }
    let value = calc.result()?;
    log::debug!("evaluated {:?} to {}", expr, value);
    Ok(value)
}

/// Evaluate `expr` with the `Arithmetic` grammar.
pub fn evaluate(expr: &str) -> Result<f64> {
    evaluate_with(&mut arithmetic(), expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculator_applies_in_postfix_order() {
        let mut calc = Calculator::new();
        calc.push(8.0);
        calc.push(2.0);
        calc.apply(Op::Div);
        calc.push(3.0);
        calc.apply(Op::Sub);
        assert_eq!(calc.stack(), &[1.0]);
        assert_eq!(calc.result().unwrap(), 1.0);
    }

    #[test]
    fn calculator_missing_operand() {
        let mut calc = Calculator::new();
        calc.push(1.0);
        calc.apply(Op::Add);
        assert!(calc.result().is_err());
    }

    #[test]
    fn calculator_leftover_values() {
        let mut calc = Calculator::new();
        assert!(calc.result().is_err());
        calc.push(1.0);
        calc.push(2.0);
        assert!(calc.result().is_err());
    }

    #[test]
    fn ebnf_grammar_parses() {
        let grammar: ebnf::Grammar = ARITHMETIC_EBNF.parse().unwrap();
        assert_eq!(grammar.rules.len(), 10);
        assert_eq!(grammar.rules[0].lhs.to_string(), "expr");
    }
}
