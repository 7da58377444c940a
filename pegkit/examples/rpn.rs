//! This file demonstrates how to make a simple Reverse Polish Notation (RPN) parser and evaluator using pegkit

use pegkit::compiler::{parse_peg, Actions, Captures};
use pegkit::runtime::{Extensions, RuntimeError, Value};
use std::time::Instant;

static RPN_GRAMMAR: &str = r#"

Main = _ value:Expr _ { value }

// Operations must be tried first, as they start with an operand
Expr = Operation / Operand
Operation = left:Operand __ right:Operand _ op:[+\-*/] { apply }
Operand = Number / Group
Group = "(" _ inner:Expr _ ")" { inner }

// Both dots and commas are accepted as decimal separators
Number = digits:$([0-9]+ ([.,] [0-9]+)?) { number }

__ = [ \t]+
_ = [ \t]*

"#;

static TEST_SUBJECT: &str = r"(3 (9.3 3 /) +) (5 (2 3 /) /) /";

fn operand(captures: &Captures, name: &str) -> Result<f64, RuntimeError> {
    captures
        .value(name)?
        .as_float()
        .ok_or_else(|| RuntimeError::action(format!("[{}] is not a number", name)))
}

fn main() {
    // Measure performances
    let now = Instant::now();

    // Compile the grammar
    let grammar = parse_peg(RPN_GRAMMAR)
        .unwrap_or_else(|err| panic!("Failed to compile RPN grammar: {}", err));

    // Implement the code blocks
    let actions = Actions::new()
        .with("value", |captures, _| captures.value("value").cloned())
        .with("inner", |captures, _| captures.value("inner").cloned())
        .with("number", |captures, _| {
            let digits = captures.value("digits")?.concat_text().replace(',', ".");

            digits
                .parse()
                .map(Value::Float)
                .map_err(|_| RuntimeError::action(format!("Invalid number: {}", digits)))
        })
        .with("apply", |captures, _| {
            let left = operand(captures, "left")?;
            let right = operand(captures, "right")?;

            let result = match captures.value("op")?.as_text() {
                Some("+") => left + right,
                Some("-") => left - right,
                Some("*") => left * right,
                Some("/") => left / right,
                _ => return Err(RuntimeError::action("Unknown operator")),
            };

            Ok(Value::Float(result))
        });

    let parser = grammar
        .bind(&actions)
        .unwrap_or_else(|err| panic!("Failed to bind RPN grammar: {}", err));

    // Get elapsed time
    let elapsed = now.elapsed();

    // Display performance
    println!(
        "Grammar in: {}.{:#003} ms{}",
        elapsed.as_millis(),
        elapsed.subsec_micros(),
        if cfg!(debug_assertions) {
            " [WARNING: debug mode heavily impacts performances]"
        } else {
            ""
        }
    );

    // Measure performances
    let now = Instant::now();

    // Evaluate the expression
    let value = parser
        .parse(TEST_SUBJECT, &Extensions::new())
        .unwrap_or_else(|err| panic!("Failed to evaluate RPN expression: {}", err));

    // Get elapsed time
    let elapsed = now.elapsed();

    println!(
        "Evaluated in: {}.{:#003} ms",
        elapsed.as_millis(),
        elapsed.subsec_micros()
    );

    println!("{} = {}", TEST_SUBJECT, value);
}
