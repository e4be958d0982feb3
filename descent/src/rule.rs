use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::capture::Replay;
use crate::error::{Error, Result};

/// Index of a rule within the `Rules` arena that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) usize);

/// A deferred action, run against the caller's output state once the whole
/// parse has succeeded.
pub type Action<S> = Box<dyn Fn(&mut S, &Replay<'_, '_>)>;

/// A single combinator. Children are ids into the same arena.
pub enum Rule<S> {
    /// Match text char by char.
    Literal(String),
    /// Match one char whose string form lies within the inclusive range.
    Range(char, char),
    /// Anchored regex match against the remainder. `None` if the expression
    /// failed to compile, in which case the rule never matches.
    Pattern {
        source: String,
        regex: Option<Regex>,
    },
    /// Succeed iff the inner rule fails. Never consumes input.
    Not(RuleId),
    /// Succeed iff the inner rule succeeds and input is then exhausted.
    EndOfInput(RuleId),
    /// Both in order. Does not roll back if the second fails.
    All(RuleId, RuleId),
    /// Both in order, with whitespace allowed in between.
    Follows(RuleId, RuleId),
    /// Ordered choice.
    Either(RuleId, RuleId),
    ZeroOrMore(RuleId),
    OneOrMore(RuleId),
    Optional(RuleId),
    /// Reference to a rule registered by name, resolved at evaluation time.
    Named(String),
    /// Record a capture for the inner rule's match.
    Action(RuleId, Action<S>),
}

/// Types that can stand in for a rule when building combinators. Strings are
/// turned into literals.
pub trait IntoRule {
    fn into_rule<S>(self, rules: &mut Rules<S>) -> RuleId;
}

impl IntoRule for RuleId {
    fn into_rule<S>(self, _rules: &mut Rules<S>) -> RuleId {
        self
    }
}

impl IntoRule for &str {
    fn into_rule<S>(self, rules: &mut Rules<S>) -> RuleId {
        rules.literal(self)
    }
}

/// Arena of rules together with the named-rule table and the whitespace rule
/// used by `follows`.
///
/// Rules are only ever added, and a rule can only reference rules created
/// before it or rules reached by name.
pub struct Rules<S> {
    rules: Vec<Rule<S>>,
    named: HashMap<String, RuleId>,
    whitespace: RuleId,
}

impl<S> Rules<S> {
    pub fn new() -> Self {
        let mut rules = Rules {
            rules: Vec::new(),
            named: HashMap::new(),
            whitespace: RuleId(0),
        };
        rules.whitespace = rules.default_whitespace();
        rules
    }

    /// `{ " " | "\t" | "\r\n" | "\r" | "\n" }`
    fn default_whitespace(&mut self) -> RuleId {
        let chars: Vec<RuleId> = [" ", "\t", "\r\n", "\r", "\n"]
            .iter()
            .map(|s| self.literal(s))
            .collect();
        let any = self.either_of(&chars);
        self.zero_or_more(any)
    }

    fn push(&mut self, rule: Rule<S>) -> RuleId {
        let id = RuleId(self.rules.len());
        self.rules.push(rule);
        id
    }

    /// Get a rule. Panics if `id` came from a different arena.
    pub fn get(&self, id: RuleId) -> &Rule<S> {
        &self.rules[id.0]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn literal(&mut self, text: &str) -> RuleId {
        self.push(Rule::Literal(text.to_owned()))
    }

    pub fn range(&mut self, lo: char, hi: char) -> RuleId {
        self.push(Rule::Range(lo, hi))
    }

    /// Regex matched at the current position. A malformed expression produces
    /// a rule that never matches.
    pub fn pattern(&mut self, expr: &str) -> RuleId {
        let regex = match Regex::new(&format!("^(?:{})", expr)) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::warn!("pattern /{}/ will never match: {}", expr, e);
                None
            }
        };
        self.push(Rule::Pattern {
            source: expr.to_owned(),
            regex,
        })
    }

    pub fn not(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        self.push(Rule::Not(rule))
    }

    pub fn eof(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        self.push(Rule::EndOfInput(rule))
    }

    pub fn all(&mut self, a: impl IntoRule, b: impl IntoRule) -> RuleId {
        let a = a.into_rule(self);
        let b = b.into_rule(self);
        self.push(Rule::All(a, b))
    }

    pub fn follows(&mut self, a: impl IntoRule, b: impl IntoRule) -> RuleId {
        let a = a.into_rule(self);
        let b = b.into_rule(self);
        self.push(Rule::Follows(a, b))
    }

    pub fn either(&mut self, a: impl IntoRule, b: impl IntoRule) -> RuleId {
        let a = a.into_rule(self);
        let b = b.into_rule(self);
        self.push(Rule::Either(a, b))
    }

    pub fn zero_or_more(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        self.push(Rule::ZeroOrMore(rule))
    }

    pub fn one_or_more(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        self.push(Rule::OneOrMore(rule))
    }

    /// One or more matches where the first must be adjacent and later ones
    /// may be separated by whitespace.
    pub fn one_or_more_spaced(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        let rest = self.zero_or_more(rule);
        self.follows(rule, rest)
    }

    pub fn optional(&mut self, rule: impl IntoRule) -> RuleId {
        let rule = rule.into_rule(self);
        self.push(Rule::Optional(rule))
    }

    /// Reference a named rule. The name doesn't need to be registered yet.
    pub fn named(&mut self, name: &str) -> RuleId {
        self.push(Rule::Named(name.to_owned()))
    }

    /// Attach an action to run for each match of `rule` on a successful parse.
    pub fn action<F>(&mut self, rule: impl IntoRule, action: F) -> RuleId
    where
        F: Fn(&mut S, &Replay<'_, '_>) + 'static,
    {
        let rule = rule.into_rule(self);
        self.push(Rule::Action(rule, Box::new(action)))
    }

    /// `a ~ b ~ ...`. Panics if `rules` is empty.
    pub fn all_of(&mut self, rules: &[RuleId]) -> RuleId {
        self.fold(rules, Rule::All)
    }

    /// `a ~~ b ~~ ...`. Panics if `rules` is empty.
    pub fn follows_all(&mut self, rules: &[RuleId]) -> RuleId {
        self.fold(rules, Rule::Follows)
    }

    /// `a | b | ...`. Panics if `rules` is empty.
    pub fn either_of(&mut self, rules: &[RuleId]) -> RuleId {
        self.fold(rules, Rule::Either)
    }

    fn fold(&mut self, rules: &[RuleId], f: fn(RuleId, RuleId) -> Rule<S>) -> RuleId {
        let (last, rest) = match rules.split_last() {
            Some(split) => split,
            None => panic!("cannot combine an empty list of rules"),
        };
        let mut acc = *last;
        for rule in rest.iter().rev() {
            acc = self.push(f(*rule, acc));
        }
        acc
    }

    /// Register `rule` under `name`, returning the rule previously registered
    /// under that name.
    pub fn add_named_rule(&mut self, name: impl Into<String>, rule: RuleId) -> Option<RuleId> {
        self.named.insert(name.into(), rule)
    }

    pub fn named_rule(&self, name: &str) -> Option<RuleId> {
        self.named.get(name).copied()
    }

    /// Wrap the rule registered as `name` with an action, so every reference
    /// to `name` runs it. Returns the new rule.
    pub fn attach<F>(&mut self, name: &str, action: F) -> Result<RuleId>
    where
        F: Fn(&mut S, &Replay<'_, '_>) + 'static,
    {
        let rule = self
            .named_rule(name)
            .ok_or_else(|| Error::UnknownRule(name.to_owned()))?;
        let rule = self.action(rule, action);
        self.named.insert(name.to_owned(), rule);
        Ok(rule)
    }

    pub fn whitespace(&self) -> RuleId {
        self.whitespace
    }

    /// Replace the rule skipped between the parts of `follows`.
    pub fn set_whitespace(&mut self, rule: RuleId) {
        self.whitespace = rule;
    }

    /// Check that every named reference resolves.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if let Rule::Named(name) = rule {
                if !self.named.contains_key(name) {
                    return Err(Error::UnknownRule(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Render a rule as a grammar expression.
    pub fn display(&self, id: RuleId) -> RuleDisplay<'_, S> {
        RuleDisplay { rules: self, id }
    }
}

impl<S> Default for Rules<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RuleDisplay<'r, S> {
    rules: &'r Rules<S>,
    id: RuleId,
}

impl<'r, S> RuleDisplay<'r, S> {
    fn child(&self, id: RuleId) -> Self {
        RuleDisplay {
            rules: self.rules,
            id,
        }
    }
}

impl<'r, S> fmt::Display for RuleDisplay<'r, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rules.get(self.id) {
            Rule::Literal(text) => write!(f, "{:?}", text),
            Rule::Range(lo, hi) => write!(f, "{:?}..{:?}", lo, hi),
            Rule::Pattern { source, .. } => write!(f, "/{}/", source),
            Rule::Not(rule) => write!(f, "!{}", self.child(*rule)),
            Rule::EndOfInput(rule) => write!(f, "{} !!", self.child(*rule)),
            Rule::All(a, b) => write!(f, "({} ~ {})", self.child(*a), self.child(*b)),
            Rule::Follows(a, b) => write!(f, "({} ~~ {})", self.child(*a), self.child(*b)),
            Rule::Either(a, b) => write!(f, "({} | {})", self.child(*a), self.child(*b)),
            Rule::ZeroOrMore(rule) => write!(f, "{}*", self.child(*rule)),
            Rule::OneOrMore(rule) => write!(f, "{}+", self.child(*rule)),
            Rule::Optional(rule) => write!(f, "[ {} ]", self.child(*rule)),
            Rule::Named(name) => write!(f, "{}", name),
            Rule::Action(rule, _) => write!(f, "({} => action)", self.child(*rule)),
        }
    }
}

/// Short description of a single rule for trace output.
pub(crate) struct Label<'r, S>(pub &'r Rule<S>);

impl<'r, S> fmt::Display for Label<'r, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Rule::Literal(text) => write!(f, "literal {:?}", text),
            Rule::Range(lo, hi) => write!(f, "range [{}-{}]", lo, hi),
            Rule::Pattern { source, .. } => write!(f, "pattern /{}/", source),
            Rule::Not(_) => write!(f, "!"),
            Rule::EndOfInput(_) => write!(f, "eof"),
            Rule::All(_, _) => write!(f, "~"),
            Rule::Follows(_, _) => write!(f, "~~"),
            Rule::Either(_, _) => write!(f, "|"),
            Rule::ZeroOrMore(_) => write!(f, "zero or more"),
            Rule::OneOrMore(_) => write!(f, "one or more"),
            Rule::Optional(_) => write!(f, "optionally"),
            Rule::Named(name) => write!(f, "named rule {}", name),
            Rule::Action(_, _) => write!(f, "=>"),
        }
    }
}
