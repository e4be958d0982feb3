/// A region over a string.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    pub s: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Span<'a> {
    /// Create a span over `s`. `start` must not come after `end`.
    pub fn new(s: &'a str, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "start: {}, end: {}", start, end);
        Span { s, start, end }
    }

    pub fn as_str(&self) -> &'a str {
        &self.s[self.start..self.end]
    }
}

impl<'a> PartialEq for Span<'a> {
    fn eq(&self, other: &Span<'a>) -> bool {
        self.as_str() == other.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_as_str() {
        let input = "hello world";
        let tests = vec![(0, 5, "hello"), (5, 11, " world"), (3, 3, "")];
        for test in tests {
            let span = Span::new(input, test.0, test.1);
            assert_eq!(span.as_str(), test.2, "test case: {:?}", test);
        }
    }

    #[test]
    fn span_eq_compares_text() {
        let a = Span::new("ab ab", 0, 2);
        let b = Span::new("ab ab", 3, 5);
        assert_eq!(a, b);
        assert_ne!(a, Span::new("ab ab", 0, 1));
    }
}
