/// Keep track of a position within a str. Positions are byte offsets that
/// always sit on a `char` boundary; reading steps one `char` at a time.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    idx: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Cursor { input, idx: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn position(&self) -> usize {
        self.idx
    }

    /// Move to a previously observed position.
    ///
    /// Panics if `pos` is past the end of input or not on a char boundary.
    pub fn seek(&mut self, pos: usize) {
        assert!(
            self.input.is_char_boundary(pos),
            "seek out of range, pos: {}, len: {}",
            pos,
            self.input.len()
        );
        self.idx = pos;
    }

    /// Read the next char, advancing past it. Returns `None` without moving
    /// once the end of input is reached.
    pub fn read(&mut self) -> Option<char> {
        let c = self.remainder().chars().next()?;
        self.idx += c.len_utf8();
        Some(c)
    }

    /// Text in `[start, end)`.
    pub fn substring(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    pub fn eof(&self) -> bool {
        self.idx == self.input.len()
    }

    /// The unconsumed part of the input.
    pub fn remainder(&self) -> &'a str {
        &self.input[self.idx..]
    }

    /// Advance by `n` bytes. Used after a pattern match, whose length is
    /// always a whole number of chars.
    pub(crate) fn skip(&mut self, n: usize) {
        self.seek(self.idx + n);
    }
}
