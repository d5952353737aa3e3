use crate::yaml::node::Position;

/// Byte offset of the start of every line in a document.
///
/// Lines are split on raw `\n` only. A `\r` before the `\n` stays part of the
/// line it ends, so byte columns are exact for LF, CRLF and mixed documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &[u8]) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.iter()
                .enumerate()
                .filter(|(_, byte)| **byte == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self {
            starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte offset where the 1-based `line` begins.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|idx| self.starts.get(idx).copied())
    }

    /// Convert a 1-based line/byte-column position into an absolute byte offset.
    ///
    /// Returns `None` when the position lies outside the document.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let start = self.line_start(position.line)?;
        let offset = start.checked_add(position.column.checked_sub(1)?)?;
        let line_end = self
            .line_start(position.line + 1)
            .unwrap_or(self.len);
        (offset <= line_end).then_some(offset)
    }

    /// Convert an absolute byte offset into a 1-based line/byte-column position.
    /// Offsets past the end clamp to the end of the document.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = self.starts.partition_point(|start| *start <= offset);
        Position::new(line, offset - self.starts[line - 1] + 1)
    }
}
