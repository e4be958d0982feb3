use crate::capture::{Capture, Replay};
use crate::error::{Error, Result};
use crate::eval::eval;
use crate::rule::{Rule, RuleId, Rules};
use crate::state::State;

/// Builds a grammar's rules, returning the root.
pub type Definition<S> = Box<dyn FnOnce(&mut Rules<S>) -> RuleId>;

/// Owns a grammar and runs it against input.
///
/// Actions attached to rules run against an output value of type `S` passed
/// to `parse`, and only once the root rule has matched.
///
/// # Examples
///
/// ```
/// use descent::Engine;
///
/// let mut engine: Engine<Vec<String>> = Engine::with_definition(|g| {
///     let letter = g.range('a', 'z');
///     let word = g.one_or_more(letter);
///     let word = g.action(word, |words: &mut Vec<String>, m| words.push(m.text().to_owned()));
///     let words = g.one_or_more_spaced(word);
///     g.eof(words)
/// });
///
/// let mut words = Vec::new();
/// assert!(engine.parse("hello world", &mut words).unwrap());
/// assert_eq!(words, vec!["hello", "world"]);
/// ```
pub struct Engine<S = ()> {
    rules: Rules<S>,
    root: Option<RuleId>,
    definition: Option<Definition<S>>,
    debug: bool,
}

impl<S> Engine<S> {
    /// Create an engine with no rules. A root must be set with `set_root`
    /// before parsing.
    pub fn new() -> Self {
        Engine {
            rules: Rules::new(),
            root: None,
            definition: None,
            debug: false,
        }
    }

    /// Create an engine whose grammar is built by `definition` the first time
    /// it's used.
    pub fn with_definition<F>(definition: F) -> Self
    where
        F: FnOnce(&mut Rules<S>) -> RuleId + 'static,
    {
        Engine {
            definition: Some(Box::new(definition)),
            ..Self::new()
        }
    }

    pub fn rules(&self) -> &Rules<S> {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Rules<S> {
        &mut self.rules
    }

    pub fn add_named_rule(&mut self, name: impl Into<String>, rule: RuleId) {
        self.rules.add_named_rule(name, rule);
    }

    pub fn set_root(&mut self, root: RuleId) {
        self.root = Some(root);
    }

    pub fn set_whitespace(&mut self, rule: RuleId) {
        self.rules.set_whitespace(rule);
    }

    /// Log every rule entered and left at debug level.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// The root rule, running the definition if it hasn't been run yet.
    pub fn root(&mut self) -> Result<RuleId> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        let definition = self.definition.take().ok_or(Error::MissingRoot)?;
        let root = definition(&mut self.rules);
        self.root = Some(root);
        Ok(root)
    }

    /// Parse `input`. On a match, actions for every recorded capture run
    /// against `output` in the order they were recorded before this returns.
    ///
    /// Matching doesn't require consuming all input; use an `eof` rule for
    /// that.
    pub fn parse(&mut self, input: &str, output: &mut S) -> Result<bool> {
        let root = self.root()?;
        let mut state = State::new(input, self.debug);
        if !eval(&self.rules, &mut state, root)? {
            log::trace!("no match for input of {} bytes", input.len());
            return Ok(false);
        }

        let captures = state.into_captures();
        log::trace!("matched, replaying {} captures", captures.len());
        self.replay(&captures, output);
        Ok(true)
    }

    fn replay(&self, captures: &[Capture<'_>], output: &mut S) {
        let mut last = None;
        for capture in captures {
            if let Rule::Action(_, action) = self.rules.get(capture.rule) {
                action(output, &Replay::new(capture, last));
            }
            last = Some(capture);
        }
    }
}

impl Engine<()> {
    /// Parse `input` for grammars without output.
    pub fn recognize(&mut self, input: &str) -> Result<bool> {
        self.parse(input, &mut ())
    }
}

impl<S> Default for Engine<S> {
    fn default() -> Self {
        Self::new()
    }
}
