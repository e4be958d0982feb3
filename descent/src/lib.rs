//! Backtracking recursive-descent parsing from composable rules.
//!
//! Grammars are built from combinators in a [`Rules`] arena and run by an
//! [`Engine`]. Actions attached to rules are deferred: they're recorded as
//! captures while matching and replayed, in order, only after the whole parse
//! has succeeded.

mod capture;
mod cursor;
mod engine;
mod error;
mod eval;
mod rule;
mod span;
mod state;

pub use capture::{Capture, Replay};
pub use cursor::Cursor;
pub use engine::{Definition, Engine};
pub use error::{Error, Result};
pub use eval::eval;
pub use rule::{Action, IntoRule, Rule, RuleDisplay, RuleId, Rules};
pub use span::Span;
pub use state::State;

/// A grammar defined by a type, for building engines with
/// [`Engine::from_grammar`].
pub trait Grammar {
    /// State that the grammar's actions write to.
    type Output;

    /// Register the grammar's rules, returning the root.
    fn define(rules: &mut Rules<Self::Output>) -> RuleId;
}

impl<S> Engine<S> {
    /// Create an engine for `G`. Its rules are built on first use.
    pub fn from_grammar<G>() -> Self
    where
        G: Grammar<Output = S> + 'static,
    {
        Engine::with_definition(G::define)
    }
}
