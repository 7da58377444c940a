use crate::compiler::utils::escape_class_char;
use crate::compiler::{Bindings, PegExpr, PegGrammar};
use crate::runtime::Predicate;

// Binding strength of each construct, loosest first
const CHOICE: u8 = 0;
const ACTION: u8 = 1;
const SEQUENCE: u8 = 2;
const PREFIX: u8 = 3;
const POSTFIX: u8 = 4;
const TERM: u8 = 5;

/// Generate PEG source from a compiled grammar
///
/// Useful to get back to the source code after parsing. Parsing the output again gives the same grammar.
///
/// Note that blank lines and comments, as well as additional whitespaces, won't be restored.
pub fn gen_peg(grammar: &PegGrammar) -> String {
    let rules = grammar
        .rules()
        .iter()
        .map(|rule| format!("{} = {}", rule.name(), gen_peg_expr(rule.expr())))
        .collect::<Vec<_>>()
        .join("\n");

    match grammar.preamble() {
        Some(preamble) => format!("{{{}}}\n\n{}", preamble, rules),
        None => rules,
    }
}

/// Generate PEG source for a single expression
pub fn gen_peg_expr(expr: &PegExpr) -> String {
    gen_at(expr, CHOICE)
}

fn level(expr: &PegExpr) -> u8 {
    match expr {
        PegExpr::Choice(_) => CHOICE,
        PegExpr::Action { .. } => ACTION,
        PegExpr::Sequence(_) => SEQUENCE,
        PegExpr::And(_) | PegExpr::Not(_) | PegExpr::Text(_) => PREFIX,
        PegExpr::Many(_) | PegExpr::One(_) | PegExpr::Optional(_) => POSTFIX,
        PegExpr::Any | PegExpr::Class { .. } | PegExpr::Literal { .. } | PegExpr::Ref(_) => TERM,
    }
}

/// Generate an expression where a construct binding at least as strongly as `min` is expected
fn gen_at(expr: &PegExpr, min: u8) -> String {
    let code = gen_bare(expr);

    if level(expr) < min {
        format!("({})", code)
    } else {
        code
    }
}

fn gen_bare(expr: &PegExpr) -> String {
    match expr {
        PegExpr::Any => ".".to_string(),
        PegExpr::Class {
            predicates,
            negated,
        } => gen_class(predicates, *negated),
        PegExpr::Literal { raw, value } => {
            if raw.is_empty() {
                quote_literal(value)
            } else {
                raw.clone()
            }
        }
        PegExpr::Ref(name) => name.clone(),
        PegExpr::Sequence(members) => join(members, PREFIX, " "),
        PegExpr::Choice(alternatives) => join(alternatives, ACTION, " / "),
        PegExpr::Many(inner) => format!("{}*", gen_at(inner, TERM)),
        PegExpr::One(inner) => format!("{}+", gen_at(inner, TERM)),
        PegExpr::Optional(inner) => format!("{}?", gen_at(inner, TERM)),
        PegExpr::And(inner) => format!("&{}", gen_at(inner, POSTFIX)),
        PegExpr::Not(inner) => format!("!{}", gen_at(inner, POSTFIX)),
        PegExpr::Text(inner) => format!("${}", gen_at(inner, POSTFIX)),
        PegExpr::Action {
            expr,
            bindings,
            code,
        } => format!("{} {{{}}}", gen_labeled(expr, bindings), code),
    }
}

fn join(exprs: &[PegExpr], min: u8, separator: &str) -> String {
    exprs
        .iter()
        .map(|expr| gen_at(expr, min))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Generate the body of an action, putting its labels back in place
fn gen_labeled(expr: &PegExpr, bindings: &Bindings) -> String {
    match (bindings, expr) {
        (Bindings::Whole(name), _) => format!("{}:{}", name, gen_at(expr, PREFIX)),

        (Bindings::Positional(names), PegExpr::Sequence(members)) => members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                match names.iter().find(|(_, position)| *position == index) {
                    Some((name, _)) => format!("{}:{}", name, gen_at(member, PREFIX)),
                    None => gen_at(member, PREFIX),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),

        _ => gen_at(expr, SEQUENCE),
    }
}

fn gen_class(predicates: &[Predicate], negated: bool) -> String {
    let mut out = String::from("[");

    if negated {
        out.push('^');
    }

    for (index, pred) in predicates.iter().enumerate() {
        let first = index == 0 && !negated;

        match pred {
            Predicate::Equal(c) => out.push_str(&escape_class_char(*c, first)),
            Predicate::Between(min, max) => {
                out.push(*min);
                out.push('-');
                out.push(*max);
            }
        }
    }

    out.push(']');
    out
}

/// Quote a string so the lexer reads it back as the same text
fn quote_literal(value: &str) -> String {
    let mut out = String::from("\"");

    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }

    out.push('"');
    out
}
