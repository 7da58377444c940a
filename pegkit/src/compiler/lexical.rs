//! Lexical productions of the PEG language: strings, identifiers, comments, whitespace, character classes
//! and code blocks.

use super::data::PegExpr;
use super::parser::{COMMENT, CONTENT};
use super::syntax::Syntax;
use super::utils::unescape_char;
use crate::runtime::*;

/// A quoted string, a backslash escaping any character
fn quoted(quote: char) -> Expr<Syntax> {
    sequence(vec![
        string(quote.to_string()),
        many(choice(vec![
            sequence(vec![string("\\"), any()]),
            char_class(vec![equal(quote)], true),
        ])),
        string(quote.to_string()),
    ])
}

/// `String = $(SingleQuotedString / DoubleQuotedString)`
///
/// Produces the raw source text, quotes and escapes included.
pub(super) fn string_rule() -> Rule<Syntax> {
    Rule::new("String", text(choice(vec![quoted('\''), quoted('"')])))
}

/// `Id = $[A-Za-z0-9_]+`
pub(super) fn identifier() -> Rule<Syntax> {
    Rule::new(
        "Id",
        text(one(char_class(
            vec![
                between('A', 'Z'),
                between('a', 'z'),
                between('0', '9'),
                equal('_'),
            ],
            false,
        ))),
    )
}

/// `Comment = "//" [^\r\n]* / "/*" (!"*/" .)* "*/"`
pub(super) fn comment() -> Rule<Syntax> {
    Rule::new(
        "Comment",
        choice(vec![
            sequence(vec![
                string("//"),
                many(char_class(vec![equal('\r'), equal('\n')], true)),
            ]),
            sequence(vec![
                string("/*"),
                many(sequence(vec![not(string("*/")), any()])),
                string("*/"),
            ]),
        ]),
    )
}

fn blank() -> Expr<Syntax> {
    choice(vec![
        reference(COMMENT),
        char_class(
            vec![equal(' '), equal('\t'), equal('\r'), equal('\n')],
            false,
        ),
    ])
}

/// `_ = (Comment / [ \t\r\n])*`
pub(super) fn spacing() -> Rule<Syntax> {
    Rule::new("_", many(blank()))
}

/// `__ = (Comment / [ \t\r\n])+`
pub(super) fn mandatory_spacing() -> Rule<Syntax> {
    Rule::new("__", one(blank()))
}

fn single_char(node: Syntax) -> Result<char, RuntimeError> {
    node.into_text()?
        .chars()
        .next()
        .ok_or_else(|| RuntimeError::action("expected a character"))
}

/// `Class = "[" "^"? (EscapedEqual / Between / Equal)+ "]"`
pub(super) fn class() -> Rule<Syntax> {
    // EscapedEqual = $("\\" .)
    let escaped = action(
        text(sequence(vec![string("\\"), any()])),
        |node: Syntax, _| {
            let escaped = node.into_text()?;
            let c = escaped.chars().nth(1).map(unescape_char).unwrap_or('\\');
            Ok(Syntax::Predicate(equal(c)))
        },
    );

    // Between = . "-" .
    let range = action(
        sequence(vec![any(), string("-"), any()]),
        |node: Syntax, _| {
            let [min, _, max] = node.into_members::<3>()?;
            Ok(Syntax::Predicate(between(single_char(min)?, single_char(max)?)))
        },
    );

    // Equal = [^\]]
    let exact = action(
        char_class(vec![equal(']')], true),
        |node: Syntax, _| Ok(Syntax::Predicate(equal(single_char(node)?))),
    );

    Rule::new(
        "Class",
        action(
            sequence(vec![
                string("["),
                optional(string("^")),
                one(choice(vec![escaped, range, exact])),
                string("]"),
            ]),
            |node: Syntax, _| {
                let [_, caret, members, _] = node.into_members::<4>()?;

                let predicates = members
                    .into_list()?
                    .into_iter()
                    .map(Syntax::into_predicate)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(PegExpr::Class {
                    predicates,
                    negated: caret != Syntax::Null,
                }
                .into())
            },
        ),
    )
}

/// Anything up to the closing brace, nested braces included
fn balanced() -> Expr<Syntax> {
    many(choice(vec![
        reference(CONTENT),
        char_class(vec![equal('}')], true),
    ]))
}

/// `Content = $("{" (Content / [^}])* "}")`
pub(super) fn content() -> Rule<Syntax> {
    Rule::new(
        "Content",
        text(sequence(vec![string("{"), balanced(), string("}")])),
    )
}

/// `Code = "{" $((Content / [^}])*) "}"`
///
/// Produces the block's text without the outer braces.
pub(super) fn code() -> Rule<Syntax> {
    Rule::new(
        "Code",
        action(
            sequence(vec![string("{"), text(balanced()), string("}")]),
            |node: Syntax, _| {
                let [_, body, _] = node.into_members::<3>()?;
                Ok(body)
            },
        ),
    )
}
