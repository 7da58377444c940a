use super::GeneratorError;
use crate::compiler::{rule_symbol, Bindings, PegExpr, PegGrammar};
use crate::runtime::Predicate;
use log::trace;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashMap;

/// Words a label can't be named after, as they are reserved by Rust or by the generated closures
const RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "context", "__node", "__value",
];

/// Generate the source code of a Rust module parsing the grammar's language
///
/// See [`gen_rust_token_stream`].
pub fn gen_rust_str(grammar: &PegGrammar) -> Result<String, GeneratorError> {
    gen_rust_token_stream(grammar).map(|stream| stream.to_string())
}

/// Generate a Rust module parsing the grammar's language
///
/// The module exposes a `parse(input, extensions)` function returning the entry rule's value, and the index
/// of each rule as a constant named after [`rule_symbol`]. The preamble is inserted verbatim as module items,
/// and every action's code block becomes the body of a closure where each label is a [`Value`] local and the
/// current [`Context`] is available as `context`.
///
/// The generated code only depends on [`crate::runtime`].
///
/// [`Value`]: crate::runtime::Value
/// [`Context`]: crate::runtime::Context
pub fn gen_rust_token_stream(grammar: &PegGrammar) -> Result<TokenStream, GeneratorError> {
    let symbols: HashMap<&str, Ident> = grammar
        .rules()
        .iter()
        .map(|rule| (rule.name(), format_ident!("{}", rule_symbol(rule.name()))))
        .collect();

    let preamble = match grammar.preamble() {
        Some(preamble) => preamble
            .parse::<TokenStream>()
            .map_err(|err| GeneratorError::InvalidPreamble(format!("{:?}", err)))?,
        None => TokenStream::new(),
    };

    let indexes = grammar.rules().iter().enumerate().map(|(index, rule)| {
        let symbol = &symbols[rule.name()];
        quote! { pub const #symbol: usize = #index; }
    });

    let rules = grammar
        .rules()
        .iter()
        .map(|rule| {
            let name = rule.name();
            let expr = gen_expr(rule.expr(), name, &symbols)?;
            Ok(quote! { ::pegkit::runtime::Rule::new(#name, #expr) })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    trace!("generated Rust module for {} rule(s)", rules.len());

    Ok(quote! {
        #![allow(unused_variables, unused_imports, non_upper_case_globals, dead_code, clippy::all)]

        use ::pegkit::runtime::*;

        #preamble

        #(#indexes)*

        fn __rules() -> ::pegkit::runtime::RuleSet<::pegkit::runtime::Value> {
            ::pegkit::runtime::parser(::std::vec![#(#rules),*])
        }

        static __RULES: ::std::sync::OnceLock<::pegkit::runtime::RuleSet<::pegkit::runtime::Value>> =
            ::std::sync::OnceLock::new();

        /// Parse an input with the grammar's entry rule
        pub fn parse(
            input: &str,
            extensions: &::pegkit::runtime::Extensions<::pegkit::runtime::Value>,
        ) -> ::std::result::Result<::pegkit::runtime::Value, ::pegkit::runtime::ParseError> {
            __RULES.get_or_init(__rules).parse(input, extensions)
        }
    })
}

fn gen_expr(
    expr: &PegExpr,
    rule: &str,
    symbols: &HashMap<&str, Ident>,
) -> Result<TokenStream, GeneratorError> {
    let gen_all = |exprs: &[PegExpr]| {
        exprs
            .iter()
            .map(|expr| gen_expr(expr, rule, symbols))
            .collect::<Result<Vec<_>, _>>()
    };

    let gen_one = |expr: &PegExpr| gen_expr(expr, rule, symbols);

    Ok(match expr {
        PegExpr::Any => quote! { ::pegkit::runtime::any() },
        PegExpr::Class {
            predicates,
            negated,
        } => {
            let predicates = predicates.iter().map(|pred| match pred {
                Predicate::Equal(c) => quote! { ::pegkit::runtime::equal(#c) },
                Predicate::Between(min, max) => quote! { ::pegkit::runtime::between(#min, #max) },
            });

            quote! { ::pegkit::runtime::char_class(::std::vec![#(#predicates),*], #negated) }
        }
        PegExpr::Literal { value, .. } => quote! { ::pegkit::runtime::string(#value) },
        PegExpr::Ref(name) => match symbols.get(name.as_str()) {
            Some(symbol) => quote! { ::pegkit::runtime::reference(#symbol) },
            None => quote! { ::pegkit::runtime::unresolved(#name) },
        },
        PegExpr::Sequence(exprs) => {
            let exprs = gen_all(exprs)?;
            quote! { ::pegkit::runtime::sequence(::std::vec![#(#exprs),*]) }
        }
        PegExpr::Choice(exprs) => {
            let exprs = gen_all(exprs)?;
            quote! { ::pegkit::runtime::choice(::std::vec![#(#exprs),*]) }
        }
        PegExpr::Many(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::many(#inner) }
        }
        PegExpr::One(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::one(#inner) }
        }
        PegExpr::Optional(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::optional(#inner) }
        }
        PegExpr::And(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::and(#inner) }
        }
        PegExpr::Not(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::not(#inner) }
        }
        PegExpr::Text(inner) => {
            let inner = gen_one(inner)?;
            quote! { ::pegkit::runtime::text(#inner) }
        }
        PegExpr::Action {
            expr,
            bindings,
            code,
        } => {
            let inner = gen_one(expr)?;
            let bindings = gen_bindings(bindings)?;

            let body = code
                .parse::<TokenStream>()
                .map_err(|err| GeneratorError::InvalidCode {
                    rule: rule.to_string(),
                    message: format!("{:?}", err),
                })?;

            quote! {
                    ::pegkit::runtime::action(#inner, |__node: ::pegkit::runtime::Value, context: &::pegkit::runtime::Context<::pegkit::runtime::Value>| {
                    #(#bindings)*
                    let __value: ::pegkit::runtime::Value = ::std::convert::Into::into((|| { #body })());
                    ::std::result::Result::Ok(__value)
                })
            }
        }
    })
}

/// Declare a local for each label of an action
fn gen_bindings(bindings: &Bindings) -> Result<Vec<TokenStream>, GeneratorError> {
    match bindings {
        Bindings::None => Ok(vec![]),
        Bindings::Whole(name) => {
            let ident = label_ident(name)?;
            Ok(vec![quote! { let #ident: ::pegkit::runtime::Value = ::std::clone::Clone::clone(&__node); }])
        }
        Bindings::Positional(names) => names
            .iter()
            .map(|(name, index)| {
                let ident = label_ident(name)?;
                Ok(quote! { let #ident: ::pegkit::runtime::Value = __node.at(#index); })
            })
            .collect(),
    }
}

fn label_ident(name: &str) -> Result<Ident, GeneratorError> {
    let starts_with_digit = name.chars().next().map_or(true, |c| c.is_ascii_digit());

    if starts_with_digit || RESERVED_WORDS.contains(&name) {
        return Err(GeneratorError::InvalidLabel(name.to_string()));
    }

    Ok(format_ident!("{}", name))
}
