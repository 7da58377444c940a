use super::data::{PegExpr, PegGrammar, PegRule};
use super::errors::CompileError;
use super::lexical;
use super::syntax::{Fragment, Syntax};
use super::utils::literal_value;
use crate::runtime::*;
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashSet;
use std::iter;

// Indexes of the compiler's own productions in its rule set
#[cfg_attr(not(test), allow(dead_code))]
pub(super) const GRAMMAR: usize = 0;
pub(super) const RULE: usize = 1;
pub(super) const CHOICE: usize = 2;
pub(super) const ACTION: usize = 3;
pub(super) const SEQUENCE: usize = 4;
pub(super) const LABEL: usize = 5;
pub(super) const PREFIX: usize = 6;
pub(super) const POSTFIX: usize = 7;
pub(super) const TERM: usize = 8;
pub(super) const GROUP: usize = 9;
pub(super) const REFERENCE: usize = 10;
pub(super) const LITERAL: usize = 11;
pub(super) const CLASS: usize = 12;
pub(super) const ANY: usize = 13;
pub(super) const CODE: usize = 14;
pub(super) const CONTENT: usize = 15;
pub(super) const STRING: usize = 16;
pub(super) const ID: usize = 17;
pub(super) const COMMENT: usize = 18;
pub(super) const SPACING: usize = 19;
pub(super) const MANDATORY_SPACING: usize = 20;

/// Extension field telling the grammar production a distributable module was requested
pub(crate) const MODULE_FLAG: &str = "module";

lazy_static! {
    static ref BOOTSTRAP: RuleSet<Syntax> = bootstrap();
}

/// Build the rule set parsing PEG source
///
/// The order of the rules must follow the indexes declared above.
pub(super) fn bootstrap() -> RuleSet<Syntax> {
    parser(vec![
        grammar(),
        rule(),
        choice_rule(),
        action_rule(),
        sequence_rule(),
        label(),
        prefix(),
        postfix(),
        term(),
        group(),
        reference_rule(),
        literal(),
        lexical::class(),
        any_rule(),
        lexical::code(),
        lexical::content(),
        lexical::string_rule(),
        lexical::identifier(),
        lexical::comment(),
        lexical::spacing(),
        lexical::mandatory_spacing(),
    ])
}

/// Options for [`compile`]
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Produce the source of a self-contained Rust module instead of an in-memory grammar
    ///
    /// Requires the `rustgen` feature.
    pub module: bool,
}

impl CompileOptions {
    /// Create a new set of compile options
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { module: false }
    }
}

/// Output of [`compile`]
#[derive(Debug)]
pub enum Compiled {
    /// In-memory grammar, ready to be [bound](PegGrammar::bind) to its actions
    Grammar(PegGrammar),

    /// Source of a Rust module exposing a single `parse` function
    Module(String),
}

/// Compile a grammar, either to an in-memory grammar or to a distributable module
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let mut extensions = Extensions::new();

    if options.module {
        extensions.insert(MODULE_FLAG.to_string(), Syntax::Null);
    }

    let grammar = parse_peg_with(source, &extensions)?;

    if grammar.is_module() {
        gen_module(&grammar).map(Compiled::Module)
    } else {
        Ok(Compiled::Grammar(grammar))
    }
}

#[cfg(feature = "rustgen")]
fn gen_module(grammar: &PegGrammar) -> Result<String, CompileError> {
    Ok(crate::generators::rust::gen_rust_str(grammar)?)
}

#[cfg(not(feature = "rustgen"))]
fn gen_module(_: &PegGrammar) -> Result<String, CompileError> {
    Err(CompileError::ModuleOutputUnavailable)
}

/// Compile a PEG grammar to a [`PegGrammar`]
pub fn parse_peg(source: &str) -> Result<PegGrammar, CompileError> {
    parse_peg_with(source, &Extensions::new())
}

fn parse_peg_with(
    source: &str,
    extensions: &Extensions<Syntax>,
) -> Result<PegGrammar, CompileError> {
    let grammar = match BOOTSTRAP.parse(source, extensions) {
        Ok(Syntax::Grammar(grammar)) => grammar,
        Ok(other) => {
            return Err(CompileError::Runtime(RuntimeError::action(format!(
                "grammar production returned {:?}",
                other
            ))))
        }
        Err(ParseError::Syntax) => return Err(CompileError::Syntax),
        Err(ParseError::Runtime(err)) => return Err(CompileError::Runtime(err)),
    };

    // Ensure all rules have distinct names
    let mut declared = HashSet::new();

    for rule in grammar.rules() {
        if !declared.insert(rule.name()) {
            return Err(CompileError::DuplicateRule(rule.name().to_string()));
        }
    }

    for rule in grammar.rules() {
        check_labels(rule.name(), rule.expr())?;
    }

    debug!(
        "compiled grammar with {} rule(s), entry rule is [{}]",
        grammar.rules().len(),
        grammar.entry().name()
    );

    Ok(grammar)
}

/// Ensure no action binds the same label twice
fn check_labels(rule: &str, expr: &PegExpr) -> Result<(), CompileError> {
    match expr {
        PegExpr::Any | PegExpr::Class { .. } | PegExpr::Literal { .. } | PegExpr::Ref(_) => Ok(()),

        PegExpr::Sequence(exprs) | PegExpr::Choice(exprs) => exprs
            .iter()
            .try_for_each(|expr| check_labels(rule, expr)),

        PegExpr::Many(expr)
        | PegExpr::One(expr)
        | PegExpr::Optional(expr)
        | PegExpr::And(expr)
        | PegExpr::Not(expr)
        | PegExpr::Text(expr) => check_labels(rule, expr),

        PegExpr::Action { expr, bindings, .. } => {
            let mut bound = HashSet::new();

            for name in bindings.names() {
                if !bound.insert(name) {
                    return Err(CompileError::DuplicateLabel {
                        rule: rule.to_string(),
                        label: name.to_string(),
                    });
                }
            }

            check_labels(rule, expr)
        }
    }
}

fn fragment_exprs(
    items: impl IntoIterator<Item = Syntax>,
) -> Result<Vec<Fragment>, RuntimeError> {
    items.into_iter().map(Syntax::into_fragment).collect()
}

/// Keep only the n-th member of a sequence
fn pick<const N: usize, const AT: usize>(node: Syntax) -> Result<Syntax, RuntimeError> {
    let members = node.into_members::<N>()?;
    Ok(IntoIterator::into_iter(members).nth(AT).unwrap_or(Syntax::Null))
}

/// `Grammar = _ Code? _ Rule+`
fn grammar() -> Rule<Syntax> {
    Rule::new(
        "Grammar",
        action(
            sequence(vec![
                reference(SPACING),
                optional(reference(CODE)),
                reference(SPACING),
                one(reference(RULE)),
            ]),
            |node: Syntax, ctx| {
                let [_, preamble, _, rules] = node.into_members::<4>()?;

                let preamble = match preamble {
                    Syntax::Null => None,
                    code => Some(code.into_text()?),
                };

                let rules = rules
                    .into_list()?
                    .into_iter()
                    .map(Syntax::into_rule)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Syntax::Grammar(PegGrammar {
                    preamble,
                    rules,
                    module: ctx.extension(MODULE_FLAG).is_some(),
                }))
            },
        ),
    )
}

/// `Rule = Id _ "=" _ Choice _`
fn rule() -> Rule<Syntax> {
    Rule::new(
        "Rule",
        action(
            sequence(vec![
                reference(ID),
                reference(SPACING),
                string("="),
                reference(SPACING),
                reference(CHOICE),
                reference(SPACING),
            ]),
            |node: Syntax, _| {
                let [name, _, _, _, body, _] = node.into_members::<6>()?;

                Ok(Syntax::Rule(PegRule {
                    name: name.into_text()?,
                    expr: body.into_fragment()?.expr,
                }))
            },
        ),
    )
}

/// `Choice = Action (_ "/" _ Action)*`
fn choice_rule() -> Rule<Syntax> {
    Rule::new(
        "Choice",
        action(
            sequence(vec![
                reference(ACTION),
                many(action(
                    sequence(vec![
                        reference(SPACING),
                        string("/"),
                        reference(SPACING),
                        reference(ACTION),
                    ]),
                    |node: Syntax, _| pick::<4, 3>(node),
                )),
            ]),
            |node: Syntax, _| {
                let [first, rest] = node.into_members::<2>()?;
                let rest = rest.into_list()?;

                // A single alternative is not a choice
                if rest.is_empty() {
                    return Ok(first);
                }

                let alternatives = fragment_exprs(iter::once(first).chain(rest))?;

                Ok(PegExpr::Choice(alternatives.into_iter().map(|alt| alt.expr).collect()).into())
            },
        ),
    )
}

/// `Action = Sequence _ Code / Sequence`
fn action_rule() -> Rule<Syntax> {
    Rule::new(
        "Action",
        choice(vec![
            action(
                sequence(vec![reference(SEQUENCE), reference(SPACING), reference(CODE)]),
                |node: Syntax, _| {
                    let [body, _, code] = node.into_members::<3>()?;
                    let body = body.into_fragment()?;

                    Ok(PegExpr::Action {
                        bindings: body.bindings(),
                        expr: Box::new(body.expr),
                        code: code.into_text()?,
                    }
                    .into())
                },
            ),
            reference(SEQUENCE),
        ]),
    )
}

/// `Sequence = Label (__ Label)*`
fn sequence_rule() -> Rule<Syntax> {
    Rule::new(
        "Sequence",
        action(
            sequence(vec![
                reference(LABEL),
                many(action(
                    sequence(vec![reference(MANDATORY_SPACING), reference(LABEL)]),
                    |node: Syntax, _| pick::<2, 1>(node),
                )),
            ]),
            |node: Syntax, _| {
                let [first, rest] = node.into_members::<2>()?;
                let rest = rest.into_list()?;

                // A single member is not a sequence, and keeps its label
                if rest.is_empty() {
                    return Ok(first);
                }

                let members = fragment_exprs(iter::once(first).chain(rest))?;
                let labels = members.iter().map(|member| member.label.clone()).collect();

                Ok(Syntax::Fragment(Fragment {
                    expr: PegExpr::Sequence(members.into_iter().map(|member| member.expr).collect()),
                    label: None,
                    members: Some(labels),
                }))
            },
        ),
    )
}

/// `Label = Id _ ":" _ Prefix / Prefix`
fn label() -> Rule<Syntax> {
    Rule::new(
        "Label",
        choice(vec![
            action(
                sequence(vec![
                    reference(ID),
                    reference(SPACING),
                    string(":"),
                    reference(SPACING),
                    reference(PREFIX),
                ]),
                |node: Syntax, _| {
                    let [name, _, _, _, inner] = node.into_members::<5>()?;

                    Ok(Syntax::Fragment(Fragment {
                        expr: inner.into_fragment()?.expr,
                        label: Some(name.into_text()?),
                        members: None,
                    }))
                },
            ),
            reference(PREFIX),
        ]),
    )
}

/// `Prefix = [&!$] Postfix / Postfix`
fn prefix() -> Rule<Syntax> {
    Rule::new(
        "Prefix",
        choice(vec![
            action(
                sequence(vec![
                    char_class(vec![equal('&'), equal('!'), equal('$')], false),
                    reference(POSTFIX),
                ]),
                |node: Syntax, _| {
                    let [op, inner] = node.into_members::<2>()?;
                    let inner = Box::new(inner.into_fragment()?.expr);

                    Ok(match op.into_text()?.as_str() {
                        "&" => PegExpr::And(inner),
                        "!" => PegExpr::Not(inner),
                        _ => PegExpr::Text(inner),
                    }
                    .into())
                },
            ),
            reference(POSTFIX),
        ]),
    )
}

/// `Postfix = Term [*+?] / Term`
fn postfix() -> Rule<Syntax> {
    Rule::new(
        "Postfix",
        choice(vec![
            action(
                sequence(vec![
                    reference(TERM),
                    char_class(vec![equal('*'), equal('+'), equal('?')], false),
                ]),
                |node: Syntax, _| {
                    let [inner, op] = node.into_members::<2>()?;
                    let inner = Box::new(inner.into_fragment()?.expr);

                    Ok(match op.into_text()?.as_str() {
                        "*" => PegExpr::Many(inner),
                        "+" => PegExpr::One(inner),
                        _ => PegExpr::Optional(inner),
                    }
                    .into())
                },
            ),
            reference(TERM),
        ]),
    )
}

/// `Term = Reference / Literal / Class / Any / Group`
fn term() -> Rule<Syntax> {
    Rule::new(
        "Term",
        choice(vec![
            reference(REFERENCE),
            reference(LITERAL),
            reference(CLASS),
            reference(ANY),
            reference(GROUP),
        ]),
    )
}

/// `Group = "(" _ Choice _ ")"`
///
/// The inner fragment is passed through untouched, labels included.
fn group() -> Rule<Syntax> {
    Rule::new(
        "Group",
        action(
            sequence(vec![
                string("("),
                reference(SPACING),
                reference(CHOICE),
                reference(SPACING),
                string(")"),
            ]),
            |node: Syntax, _| pick::<5, 2>(node),
        ),
    )
}

/// `Reference = Id !(_ "=" _)`
///
/// An identifier followed by `=` starts the next rule instead.
fn reference_rule() -> Rule<Syntax> {
    Rule::new(
        "Reference",
        action(
            sequence(vec![
                reference(ID),
                not(sequence(vec![
                    reference(SPACING),
                    string("="),
                    reference(SPACING),
                ])),
            ]),
            |node: Syntax, _| {
                let [name, _] = node.into_members::<2>()?;
                Ok(PegExpr::Ref(name.into_text()?).into())
            },
        ),
    )
}

/// `Literal = String`
fn literal() -> Rule<Syntax> {
    Rule::new(
        "Literal",
        action(reference(STRING), |node: Syntax, _| {
            let raw = node.into_text()?;
            let value = literal_value(&raw)?;
            Ok(PegExpr::Literal { raw, value }.into())
        }),
    )
}

/// `Any = "."`
fn any_rule() -> Rule<Syntax> {
    Rule::new(
        "Any",
        action(string("."), |_: Syntax, _| Ok(PegExpr::Any.into())),
    )
}
