use thiserror::Error;

/// The edit primitive: replace the byte range `[byte_start, byte_end)` of a
/// buffer with `new_text`.
///
/// Every surgical update compiles down to a batch of splices computed against
/// the original document and applied bottom-to-top.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Splice does nothing until applied"]
pub struct Splice {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// Text to insert at [byte_start, byte_end)
    pub new_text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("invalid byte range: [{byte_start}, {byte_end}) in buffer of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("overlapping splices: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    Overlapping {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

impl Splice {
    pub fn new(byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
        }
    }

    fn validate(&self, content: &str) -> Result<(), SpliceError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(SpliceError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(offset) {
                return Err(SpliceError::NotCharBoundary { offset });
            }
        }

        Ok(())
    }

    /// Text currently covered by this splice.
    pub fn current<'a>(&self, content: &'a str) -> Result<&'a str, SpliceError> {
        self.validate(content)?;
        Ok(&content[self.byte_start..self.byte_end])
    }

    /// Apply this splice, returning a new buffer.
    pub fn apply(&self, content: &str) -> Result<String, SpliceError> {
        self.validate(content)?;
        let mut updated = String::with_capacity(
            content.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        updated.push_str(&content[..self.byte_start]);
        updated.push_str(&self.new_text);
        updated.push_str(&content[self.byte_end..]);
        Ok(updated)
    }

    /// Apply splices computed against the same `content` in one pass.
    ///
    /// Splices are sorted by byte_start descending and applied bottom-to-top,
    /// so offsets of splices not yet applied stay valid. The input is never
    /// modified; the result is always a fresh buffer.
    pub fn apply_batch(content: &str, mut splices: Vec<Splice>) -> Result<String, SpliceError> {
        for splice in &splices {
            splice.validate(content)?;
        }

        splices.sort_by(|a, b| {
            b.byte_start
                .cmp(&a.byte_start)
                .then(b.byte_end.cmp(&a.byte_end))
        });

        // Sorted descending: the earlier splice must end before the later one starts.
        for window in splices.windows(2) {
            let (later, earlier) = (&window[0], &window[1]);
            if earlier.byte_end > later.byte_start {
                return Err(SpliceError::Overlapping {
                    first_start: earlier.byte_start,
                    first_end: earlier.byte_end,
                    second_start: later.byte_start,
                    second_end: later.byte_end,
                });
            }
        }

        let mut updated = content.to_string();
        for splice in &splices {
            updated.replace_range(splice.byte_start..splice.byte_end, &splice.new_text);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_single_splice() {
        let splice = Splice::new(6, 11, "there");
        assert_eq!(splice.apply("hello world").unwrap(), "hello there");
    }

    #[test]
    fn invalid_range() {
        let splice = Splice::new(5, 20, "replacement");
        assert!(matches!(
            splice.apply("hello world"),
            Err(SpliceError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn inverted_range() {
        let splice = Splice::new(10, 5, "replacement");
        assert!(matches!(
            splice.apply("hello world"),
            Err(SpliceError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn rejects_offsets_inside_characters() {
        let splice = Splice::new(1, 2, "x");
        assert_eq!(
            splice.apply("é!"),
            Err(SpliceError::NotCharBoundary { offset: 1 })
        );
    }

    #[test]
    fn current_text() {
        let splice = Splice::new(0, 5, "HELLO");
        assert_eq!(splice.current("hello world").unwrap(), "hello");
    }

    #[test]
    fn batch_applies_bottom_to_top() {
        let content = "line1\nline2\nline3\n";
        let splices = vec![
            Splice::new(0, 5, "LINE_ONE"),
            Splice::new(12, 17, "3"),
            Splice::new(6, 11, "L2"),
        ];
        assert_eq!(
            Splice::apply_batch(content, splices).unwrap(),
            "LINE_ONE\nL2\n3\n"
        );
    }

    #[test]
    fn batch_rejects_overlap() {
        let splices = vec![Splice::new(0, 5, "a"), Splice::new(3, 8, "b")];
        assert!(matches!(
            Splice::apply_batch("0123456789", splices),
            Err(SpliceError::Overlapping { .. })
        ));
    }

    #[test]
    fn batch_allows_adjacent_splices() {
        let splices = vec![Splice::new(0, 2, "A"), Splice::new(2, 4, "B")];
        assert_eq!(Splice::apply_batch("xxyyzz", splices).unwrap(), "ABzz");
    }

    #[test]
    fn empty_batch_copies_input() {
        assert_eq!(Splice::apply_batch("unchanged", Vec::new()).unwrap(), "unchanged");
    }
}
