//! Word-boundary classification over the input character stream.

/// Input characters that end a word. Newline always does as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Word separator (`.` in the v101 transcription).
    pub primary: char,
    /// Uncertain word separator (`,` in the v101 transcription).
    pub secondary: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            primary: '.',
            secondary: ',',
        }
    }
}

/// Which of the two delimiters a boundary character is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Primary,
    Secondary,
}

impl Delimiters {
    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.primary || c == self.secondary || c == '\n'
    }

    /// Kind of a word delimiter. Newline is a boundary but not a delimiter
    /// kind; it is carried through on its own.
    pub fn kind(&self, c: char) -> Option<DelimiterKind> {
        if c == self.primary {
            Some(DelimiterKind::Primary)
        } else if c == self.secondary {
            Some(DelimiterKind::Secondary)
        } else {
            None
        }
    }

    /// True iff `index` is the first character of the stream or follows a
    /// delimiter.
    pub fn is_word_start(&self, index: usize, data: &[char]) -> bool {
        index == 0 || data.get(index - 1).is_some_and(|&c| self.is_delimiter(c))
    }

    /// True iff a token of `length` characters at `index` runs to the end of
    /// the stream or is followed by a delimiter.
    pub fn is_word_end(&self, index: usize, data: &[char], length: usize) -> bool {
        match data.get(index + length) {
            None => true,
            Some(&c) => self.is_delimiter(c),
        }
    }
}
