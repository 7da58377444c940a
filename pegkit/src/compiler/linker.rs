use super::actions::{Actions, Captures};
use super::data::{PegExpr, PegGrammar};
use super::errors::BindError;
use crate::runtime::*;
use log::debug;
use std::collections::HashMap;

impl PegGrammar {
    /// Link the grammar into an executable parser
    ///
    /// Rule names are resolved to their position in the grammar. A reference to a rule that doesn't exist is
    /// kept as-is and only faults if it is reached while parsing.
    ///
    /// Every code block must have a handler in `actions`.
    pub fn bind(&self, actions: &Actions) -> Result<RuleSet<Value>, BindError> {
        let indexes: HashMap<&str, usize> = self
            .rules()
            .iter()
            .enumerate()
            .map(|(index, rule)| (rule.name(), index))
            .collect();

        let linker = Linker { indexes, actions };

        let rules = self
            .rules()
            .iter()
            .map(|rule| {
                linker
                    .link(rule.expr(), rule.name())
                    .map(|expr| Rule::new(rule.name(), expr))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "bound grammar with {} rule(s), entry rule is [{}]",
            rules.len(),
            self.entry().name()
        );

        Ok(parser(rules))
    }
}

struct Linker<'a> {
    indexes: HashMap<&'a str, usize>,
    actions: &'a Actions,
}

impl<'a> Linker<'a> {
    fn link(&self, expr: &PegExpr, rule: &str) -> Result<Expr<Value>, BindError> {
        let link_all = |exprs: &[PegExpr]| {
            exprs
                .iter()
                .map(|expr| self.link(expr, rule))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(match expr {
            PegExpr::Any => any(),
            PegExpr::Class {
                predicates,
                negated,
            } => char_class(predicates.clone(), *negated),
            PegExpr::Literal { value, .. } => string(value.as_str()),
            PegExpr::Ref(name) => match self.indexes.get(name.as_str()) {
                Some(index) => reference(*index),
                None => unresolved(name.as_str()),
            },
            PegExpr::Sequence(exprs) => sequence(link_all(exprs)?),
            PegExpr::Choice(exprs) => choice(link_all(exprs)?),
            PegExpr::Many(inner) => many(self.link(inner, rule)?),
            PegExpr::One(inner) => one(self.link(inner, rule)?),
            PegExpr::Optional(inner) => optional(self.link(inner, rule)?),
            PegExpr::And(inner) => and(self.link(inner, rule)?),
            PegExpr::Not(inner) => not(self.link(inner, rule)?),
            PegExpr::Text(inner) => text(self.link(inner, rule)?),
            PegExpr::Action {
                expr,
                bindings,
                code,
            } => {
                let handler = self
                    .actions
                    .get(code)
                    .cloned()
                    .ok_or_else(|| BindError::MissingAction {
                        rule: rule.to_string(),
                        code: code.trim().to_string(),
                    })?;

                let bindings = bindings.clone();

                action(self.link(expr, rule)?, move |node: Value, ctx| {
                    handler(&Captures::new(node, &bindings), ctx)
                })
            }
        })
    }
}
