use std::fmt::Display;

use crate::capture::Capture;
use crate::cursor::Cursor;
use crate::rule::RuleId;
use crate::span::Span;

/// Mutable state for a single parse.
///
/// A fresh state is created for every call to `Engine::parse` and threaded by
/// reference through evaluation, so nothing carries over between parses.
#[derive(Debug)]
pub struct State<'a> {
    cursor: Cursor<'a>,
    /// Captures recorded so far, in the order their rules completed.
    captures: Vec<Capture<'a>>,
    /// Name of the named rule currently being evaluated.
    active: Option<&'a str>,
    depth: usize,
    trace: bool,
}

impl<'a> State<'a> {
    pub fn new(input: &'a str, trace: bool) -> Self {
        State {
            cursor: Cursor::new(input),
            captures: Vec::new(),
            active: None,
            depth: 0,
            trace,
        }
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn seek(&mut self, pos: usize) {
        self.cursor.seek(pos)
    }

    /// Number of captures recorded so far. Pass to `truncate_captures` to
    /// drop everything recorded after this point.
    pub fn capture_mark(&self) -> usize {
        self.captures.len()
    }

    pub fn truncate_captures(&mut self, mark: usize) {
        self.captures.truncate(mark);
    }

    /// Record a capture from `start` up to the current position.
    pub fn push_capture(&mut self, start: usize, rule: RuleId) {
        let span = Span::new(self.cursor.input(), start, self.cursor.position());
        self.captures.push(Capture::new(span, rule));
    }

    pub fn captures(&self) -> &[Capture<'a>] {
        &self.captures
    }

    /// Consume the state, returning captures in recording order.
    pub fn into_captures(self) -> Vec<Capture<'a>> {
        self.captures
    }

    pub fn active(&self) -> Option<&'a str> {
        self.active
    }

    /// Mark `name` as the active named rule, returning the previously active
    /// one so it can be put back with `set_active`.
    pub fn activate(&mut self, name: &'a str) -> Option<&'a str> {
        self.active.replace(name)
    }

    pub fn set_active(&mut self, name: Option<&'a str>) {
        self.active = name;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self, what: &dyn Display) {
        self.depth += 1;
        if self.trace {
            log::debug!("{}++ {}", self.indent(), what);
        }
    }

    pub(crate) fn leave(&mut self, what: &dyn Display, res: bool) {
        if self.trace {
            log::debug!("{}-- {}: {}", self.indent(), what, res);
        }
        self.depth -= 1;
    }

    pub(crate) fn blocked(&self, name: &str) {
        if self.trace {
            log::debug!("{}-- named rule {}: blocked", self.indent(), name);
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_truncate_to_mark() {
        let mut state = State::new("abc", false);
        state.push_capture(0, RuleId(0));
        let mark = state.capture_mark();
        state.seek(2);
        state.push_capture(1, RuleId(1));
        state.push_capture(0, RuleId(2));
        assert_eq!(state.captures().len(), 3);

        state.truncate_captures(mark);
        let caps = state.into_captures();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].rule, RuleId(0));
        assert_eq!(caps[0].as_str(), "");
    }

    #[test]
    fn active_rule_restores() {
        let mut state = State::new("", false);
        assert_eq!(state.activate("outer"), None);
        let prior = state.activate("inner");
        assert_eq!(prior, Some("outer"));
        assert_eq!(state.active(), Some("inner"));
        state.set_active(prior);
        assert_eq!(state.active(), Some("outer"));
    }

    #[test]
    fn depth_tracks_nesting() {
        let mut state = State::new("", true);
        state.enter(&"a");
        state.enter(&"b");
        assert_eq!(state.depth(), 2);
        state.leave(&"b", true);
        state.leave(&"a", false);
        assert_eq!(state.depth(), 0);
    }
}
