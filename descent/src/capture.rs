use std::fmt;

use crate::rule::RuleId;
use crate::span::Span;

/// A successful match of an action rule, recorded during evaluation and
/// replayed once the whole parse succeeds.
#[derive(Debug, Clone, Copy)]
pub struct Capture<'a> {
    pub span: Span<'a>,
    /// The action rule that recorded this capture.
    pub rule: RuleId,
}

impl<'a> Capture<'a> {
    pub fn new(span: Span<'a>, rule: RuleId) -> Self {
        Capture { span, rule }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn as_str(&self) -> &'a str {
        self.span.as_str()
    }
}

impl<'a> fmt::Display for Capture<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{}:{}]", self.span.start, self.span.end, self.as_str())
    }
}

/// View handed to an action while captures are replayed.
#[derive(Debug, Clone, Copy)]
pub struct Replay<'r, 'a> {
    current: &'r Capture<'a>,
    last: Option<&'r Capture<'a>>,
}

impl<'r, 'a> Replay<'r, 'a> {
    pub(crate) fn new(current: &'r Capture<'a>, last: Option<&'r Capture<'a>>) -> Self {
        Replay { current, last }
    }

    /// Text matched by the capture being replayed.
    pub fn text(&self) -> &'a str {
        self.current.as_str()
    }

    /// The capture being replayed.
    pub fn capture(&self) -> &'r Capture<'a> {
        self.current
    }

    /// The capture replayed just before this one, if any.
    pub fn last(&self) -> Option<&'r Capture<'a>> {
        self.last
    }
}
