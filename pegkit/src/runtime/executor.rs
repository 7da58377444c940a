use super::combinators::{Expr, RuleRef};
use super::data::{Extensions, NodeValue};
use super::errors::{ParseError, RuntimeError};
use log::trace;

/// Result of running an expression
///
/// `Ok(None)` is an ordinary failed match, which enclosing combinators recover from.
/// `Err(_)` is a fatal fault, which aborts the whole parse.
pub type Outcome<V> = Result<Option<V>, RuntimeError>;

/// Parsing state, created once for each call to the [top-level driver](RuleSet::parse)
pub struct Context<'a, V> {
    /// Input text
    input: &'a str,

    /// Cursor (byte offset in the input, always on a character boundary)
    offset: usize,

    /// Rules references are resolved against
    rules: &'a [Rule<V>],

    /// Caller-supplied fields
    extensions: &'a Extensions<V>,
}

impl<'a, V> Context<'a, V> {
    /// Create a context at the beginning of the input
    pub fn new(input: &'a str, rules: &'a [Rule<V>], extensions: &'a Extensions<V>) -> Self {
        Self {
            input,
            offset: 0,
            rules,
            extensions,
        }
    }

    /// Get the whole input
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Get the cursor's offset in the input
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get the input that was not consumed yet
    pub fn remaining(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Is the cursor at the end of the input?
    pub fn at_end(&self) -> bool {
        self.offset == self.input.len()
    }

    /// Get a caller-supplied field
    pub fn extension(&self, name: &str) -> Option<&'a V> {
        self.extensions.get(name)
    }

    /// Get all caller-supplied fields
    pub fn extensions(&self) -> &'a Extensions<V> {
        self.extensions
    }

    fn rewind(&mut self, offset: usize) {
        self.offset = offset;
    }

    fn resolve(&self, target: &RuleRef) -> Result<&'a Rule<V>, RuntimeError> {
        let rules = self.rules;

        match target {
            RuleRef::Index(index) => rules.get(*index).ok_or(RuntimeError::MissingRule(*index)),
            RuleRef::Unresolved(name) => Err(RuntimeError::UnresolvedRule(name.clone())),
        }
    }
}

impl<'a, V: NodeValue> Context<'a, V> {
    /// Consume the next character if it is accepted
    fn bump_if(&mut self, accept: impl FnOnce(char) -> bool) -> Option<V> {
        let c = self.remaining().chars().next()?;

        if !accept(c) {
            return None;
        }

        let start = self.offset;
        self.offset += c.len_utf8();

        Some(V::text(&self.input[start..self.offset]))
    }
}

impl<V: NodeValue> Expr<V> {
    /// Run the expression at the context's cursor
    ///
    /// On success the cursor is moved past the consumed input. On a failed match it is left where it was
    /// (lookaheads never move it).
    pub fn parse(&self, ctx: &mut Context<'_, V>) -> Outcome<V> {
        let start = ctx.offset;

        match self {
            Self::Any => Ok(ctx.bump_if(|_| true)),

            Self::Char {
                predicates,
                negated,
            } => Ok(ctx.bump_if(|c| predicates.iter().any(|pred| pred.test(c)) != *negated)),

            Self::Literal(value) => {
                if ctx.remaining().starts_with(value.as_str()) {
                    ctx.offset += value.len();
                    Ok(Some(V::text(value)))
                } else {
                    Ok(None)
                }
            }

            Self::Sequence(exprs) => {
                let mut nodes = Vec::with_capacity(exprs.len());

                for expr in exprs {
                    match expr.parse(ctx)? {
                        Some(node) => nodes.push(node),
                        None => {
                            // Earlier members may have consumed input
                            ctx.rewind(start);
                            return Ok(None);
                        }
                    }
                }

                Ok(Some(V::list(nodes)))
            }

            Self::Choice(exprs) => {
                for expr in exprs {
                    if let Some(node) = expr.parse(ctx)? {
                        return Ok(Some(node));
                    }

                    ctx.rewind(start);
                }

                Ok(None)
            }

            Self::Many(expr) => repeat(expr, ctx, vec![]).map(|nodes| Some(V::list(nodes))),

            Self::One(expr) => match expr.parse(ctx)? {
                Some(first) if ctx.offset == start => Ok(Some(V::list(vec![first]))),
                Some(first) => repeat(expr, ctx, vec![first]).map(|nodes| Some(V::list(nodes))),
                None => {
                    ctx.rewind(start);
                    Ok(None)
                }
            },

            Self::Text(expr) => match expr.parse(ctx)? {
                Some(_) => Ok(Some(V::text(&ctx.input[start..ctx.offset]))),
                None => {
                    ctx.rewind(start);
                    Ok(None)
                }
            },

            Self::Optional(expr) => match expr.parse(ctx)? {
                Some(node) => Ok(Some(node)),
                None => {
                    ctx.rewind(start);
                    Ok(Some(V::null()))
                }
            },

            Self::And(expr) => {
                let matched = expr.parse(ctx)?;
                ctx.rewind(start);
                Ok(matched.map(|_| V::null()))
            }

            Self::Not(expr) => {
                let matched = expr.parse(ctx)?;
                ctx.rewind(start);
                Ok(match matched {
                    Some(_) => None,
                    None => Some(V::null()),
                })
            }

            Self::Action(expr, mapper) => match expr.parse(ctx)? {
                Some(node) => mapper(node, ctx).map(Some),
                None => {
                    ctx.rewind(start);
                    Ok(None)
                }
            },

            Self::Ref(target) => {
                let rule = ctx.resolve(target)?;
                rule.expr().parse(ctx)
            }
        }
    }
}

/// Match an expression as many times as possible, appending values to `nodes`
///
/// A match that consumes nothing is kept and ends the repetition.
fn repeat<V: NodeValue>(
    expr: &Expr<V>,
    ctx: &mut Context<'_, V>,
    mut nodes: Vec<V>,
) -> Result<Vec<V>, RuntimeError> {
    loop {
        let start = ctx.offset;

        match expr.parse(ctx)? {
            Some(node) => {
                nodes.push(node);

                if ctx.offset == start {
                    break;
                }
            }
            None => {
                ctx.rewind(start);
                break;
            }
        }
    }

    Ok(nodes)
}

/// A named rule
#[derive(Debug)]
pub struct Rule<V> {
    name: String,
    expr: Expr<V>,
}

impl<V> Rule<V> {
    pub fn new(name: impl Into<String>, expr: Expr<V>) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expr<V> {
        &self.expr
    }
}

/// An ordered set of rules, usable as a complete parser
///
/// The first rule is the entry point. References between rules are indexes in this set.
#[derive(Debug)]
pub struct RuleSet<V> {
    rules: Vec<Rule<V>>,
}

impl<V> RuleSet<V> {
    pub fn new(rules: Vec<Rule<V>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule<V>] {
        &self.rules
    }

    /// Get the entry point
    pub fn entry(&self) -> Option<&Rule<V>> {
        self.rules.first()
    }

    /// Find a rule's index from its name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }
}

impl<V: NodeValue> RuleSet<V> {
    /// Parse an input with the entry rule
    ///
    /// Succeeds only if the entry rule matches *and* consumes the whole input.
    pub fn parse(&self, input: &str, extensions: &Extensions<V>) -> Result<V, ParseError> {
        let mut ctx = Context::new(input, &self.rules, extensions);
        let entry = ctx.resolve(&RuleRef::Index(0))?;

        match entry.expr().parse(&mut ctx)? {
            Some(value) if ctx.at_end() => {
                trace!("rule [{}] matched the whole input", entry.name());
                Ok(value)
            }
            Some(_) => {
                trace!(
                    "rule [{}] stopped at offset {} of {}",
                    entry.name(),
                    ctx.offset(),
                    input.len()
                );
                Err(ParseError::Syntax)
            }
            None => {
                trace!("rule [{}] did not match", entry.name());
                Err(ParseError::Syntax)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::*;

    fn run(expr: &Expr<Value>, input: &str) -> (Option<Value>, usize) {
        let extensions = Extensions::new();
        let mut ctx = Context::new(input, &[], &extensions);
        let result = expr.parse(&mut ctx).unwrap();
        (result, ctx.offset())
    }

    fn text_list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|item| Value::from(*item)).collect())
    }

    #[test]
    fn any_consumes_one_character() {
        assert_eq!(run(&any(), "ab"), (Some("a".into()), 1));
        assert_eq!(run(&any(), "é!"), (Some("é".into()), 2));
        assert_eq!(run(&any(), ""), (None, 0));
    }

    #[test]
    fn char_class_matches_predicates() {
        let digit = char_class(vec![between('0', '9')], false);
        assert_eq!(run(&digit, "7x"), (Some("7".into()), 1));
        assert_eq!(run(&digit, "x7"), (None, 0));
        assert_eq!(run(&digit, ""), (None, 0));

        let not_lower = char_class(vec![between('a', 'z')], true);
        assert_eq!(run(&not_lower, "A"), (Some("A".into()), 1));
        assert_eq!(run(&not_lower, "a"), (None, 0));
        assert_eq!(run(&not_lower, ""), (None, 0));

        let quote_or_dash = char_class(vec![equal('"'), equal('-')], false);
        assert_eq!(run(&quote_or_dash, "-"), (Some("-".into()), 1));
    }

    #[test]
    fn string_matches_prefix() {
        assert_eq!(run(&string("let"), "let x"), (Some("let".into()), 3));
        assert_eq!(run(&string("let"), "le"), (None, 0));
    }

    #[test]
    fn sequence_rolls_back_on_failure() {
        let seq = sequence(vec![string("a"), string("b"), string("c")]);
        assert_eq!(run(&seq, "abc"), (Some(text_list(&["a", "b", "c"])), 3));
        assert_eq!(run(&seq, "abx"), (None, 0));
    }

    #[test]
    fn choice_is_ordered() {
        let alt = choice(vec![string("a"), string("ab")]);
        assert_eq!(run(&alt, "ab"), (Some("a".into()), 1));

        let alt = choice(vec![sequence(vec![string("a"), string("x")]), string("ab")]);
        assert_eq!(run(&alt, "ab"), (Some("ab".into()), 2));
        assert_eq!(run(&alt, "zz"), (None, 0));
    }

    #[test]
    fn repetitions() {
        let digit = || char_class(vec![between('0', '9')], false);

        assert_eq!(run(&many(digit()), "12a"), (Some(text_list(&["1", "2"])), 2));
        assert_eq!(run(&many(digit()), "a"), (Some(text_list(&[])), 0));
        assert_eq!(run(&one(digit()), "12a"), (Some(text_list(&["1", "2"])), 2));
        assert_eq!(run(&one(digit()), "a"), (None, 0));
    }

    #[test]
    fn repetition_of_empty_match_terminates() {
        let empty = optional(string("x"));
        assert_eq!(run(&many(empty), "yyy"), (Some(Value::List(vec![Value::Null])), 0));

        let empty = many(string("x"));
        assert_eq!(
            run(&one(empty), "yyy"),
            (Some(Value::List(vec![text_list(&[])])), 0)
        );
    }

    #[test]
    fn repetition_rolls_back_partial_attempt() {
        let pair = sequence(vec![string("a"), string("b")]);
        assert_eq!(
            run(&many(pair), "ababa"),
            (
                Some(Value::List(vec![text_list(&["a", "b"]), text_list(&["a", "b"])])),
                4
            )
        );
    }

    #[test]
    fn text_returns_consumed_input() {
        let digits = text(one(char_class(vec![between('0', '9')], false)));
        assert_eq!(run(&digits, "42+"), (Some("42".into()), 2));
        assert_eq!(run(&digits, "+"), (None, 0));
    }

    #[test]
    fn optional_never_fails() {
        assert_eq!(run(&optional(string("-")), "-1"), (Some("-".into()), 1));
        assert_eq!(run(&optional(string("-")), "1"), (Some(Value::Null), 0));
    }

    #[test]
    fn lookaheads_never_consume() {
        assert_eq!(run(&and(string("a")), "a"), (Some(Value::Null), 0));
        assert_eq!(run(&and(string("a")), "b"), (None, 0));
        assert_eq!(run(&not(string("a")), "a"), (None, 0));
        assert_eq!(run(&not(string("a")), "b"), (Some(Value::Null), 0));
    }

    #[test]
    fn action_maps_value_and_reads_context() {
        let doubled = action(string("21"), |node: Value, ctx| {
            let factor = ctx.extension("factor").and_then(Value::as_int).unwrap_or(1);
            let number: i64 = node.as_text().unwrap_or("0").parse().unwrap_or(0);
            Ok(Value::Int(number * factor))
        });

        let mut extensions = Extensions::new();
        extensions.insert("factor".to_string(), Value::Int(2));

        let mut ctx = Context::new("21", &[], &extensions);
        assert_eq!(doubled.parse(&mut ctx), Ok(Some(Value::Int(42))));
        assert_eq!(ctx.offset(), 2);
    }

    #[test]
    fn action_errors_are_fatal() {
        let failing = choice(vec![
            action(string("a"), |_: Value, _| Err(RuntimeError::action("nope"))),
            string("a"),
        ]);

        let extensions = Extensions::new();
        let mut ctx = Context::new("a", &[], &extensions);
        assert_eq!(
            failing.parse(&mut ctx),
            Err(RuntimeError::Action("nope".to_string()))
        );
    }

    #[test]
    fn references_resolve_lazily() {
        // list = "(" list? ")"
        let rules: RuleSet<Value> = parser(vec![Rule::new(
            "list",
            sequence(vec![string("("), optional(reference(0)), string(")")]),
        )]);

        let extensions = Extensions::new();
        assert!(rules.parse("((()))", &extensions).is_ok());
        assert_eq!(rules.parse("(()", &extensions), Err(ParseError::Syntax));
    }

    #[test]
    fn unresolved_reference_is_fatal() {
        let rules: RuleSet<Value> = parser(vec![Rule::new(
            "main",
            choice(vec![unresolved("missing"), string("a")]),
        )]);

        assert_eq!(
            rules.parse("a", &Extensions::new()),
            Err(ParseError::Runtime(RuntimeError::UnresolvedRule(
                "missing".to_string()
            )))
        );
    }

    #[test]
    fn driver_requires_full_input() {
        let rules = parser(vec![Rule::new("digit", char_class(vec![between('0', '9')], false))]);
        let extensions = Extensions::new();

        assert_eq!(rules.parse("2", &extensions), Ok(Value::from("2")));
        assert_eq!(rules.parse("2x", &extensions), Err(ParseError::Syntax));
        assert_eq!(rules.parse("", &extensions), Err(ParseError::Syntax));
    }

    #[test]
    fn empty_rule_set_has_no_entry() {
        let rules: RuleSet<Value> = parser(vec![]);
        assert_eq!(
            rules.parse("", &Extensions::new()),
            Err(ParseError::Runtime(RuntimeError::MissingRule(0)))
        );
    }
}
