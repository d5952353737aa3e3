//! Scalar end positions.
//!
//! The YAML event parser only reports where a scalar token starts. The end is
//! recovered here by scanning the source forward from that start according to
//! the scalar's style and whether it sits in block or flow context. All
//! delimiters involved are ASCII, so scanning works on raw bytes and every
//! returned offset falls on a UTF-8 character boundary.

use crate::yaml::node::ScalarStyle;

/// Where a scalar sits in the document, as far as its extent is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScalarContext {
    pub in_flow: bool,
    /// Indentation (in bytes) of the enclosing block collection, `None` at the
    /// document root.
    pub parent_indent: Option<usize>,
}

/// Exclusive byte offset where the scalar token starting at `start` ends.
pub(crate) fn scalar_end(
    source: &str,
    start: usize,
    style: ScalarStyle,
    context: ScalarContext,
) -> usize {
    let bytes = source.as_bytes();
    if start >= bytes.len() {
        return bytes.len();
    }
    match style {
        ScalarStyle::DoubleQuoted => double_quoted_end(bytes, start),
        ScalarStyle::SingleQuoted => single_quoted_end(bytes, start),
        ScalarStyle::Literal | ScalarStyle::Folded => {
            block_scalar_end(bytes, start, context.parent_indent)
        }
        ScalarStyle::Plain if context.in_flow => flow_plain_end(bytes, start),
        ScalarStyle::Plain => block_plain_end(bytes, start, context.parent_indent),
    }
}

/// Offset of the `|`/`>` indicator heading the block scalar whose parser
/// marker sits at `marker`.
///
/// The marker points into the content, so the header is the closest
/// preceding line (or the text before the marker on its own line) holding a
/// block scalar indicator. Only blank lines may sit between the two.
pub(crate) fn block_scalar_header(source: &str, marker: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    if matches!(bytes.get(marker), Some(b'|' | b'>')) {
        return Some(marker);
    }
    let mut end = marker.min(bytes.len());
    loop {
        let start = bytes[..end]
            .iter()
            .rposition(|byte| *byte == b'\n')
            .map_or(0, |idx| idx + 1);
        let line = &bytes[start..end];
        if let Some(idx) = header_indicator(line) {
            return Some(start + idx);
        }
        if !is_blank(line) || start == 0 {
            return None;
        }
        end = start - 1;
    }
}

/// First `|` or `>` in `line` that starts a node and is followed only by
/// chomping/indentation indicators and then whitespace or a comment.
fn header_indicator(line: &[u8]) -> Option<usize> {
    (0..line.len()).find(|&idx| {
        matches!(line[idx], b'|' | b'>')
            && (idx == 0 || matches!(line[idx - 1], b' ' | b'\t'))
            && {
                let rest = &line[idx + 1..];
                let flags = rest
                    .iter()
                    .take_while(|byte| matches!(byte, b'+' | b'-' | b'1'..=b'9'))
                    .count();
                let tail = &rest[flags..];
                let blanks = leading_whitespace(tail);
                tail[blanks..]
                    .iter()
                    .all(|byte| matches!(byte, b' ' | b'\t' | b'\r'))
                    || (blanks > 0 && tail[blanks] == b'#')
            }
    })
}

fn double_quoted_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn single_quoted_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn block_plain_end(bytes: &[u8], start: usize, parent_indent: Option<usize>) -> usize {
    let first_line_end = line_end(bytes, start);
    let (segment_end, stopped) = plain_segment_end(bytes, start, first_line_end);
    let mut end = trim_trailing_whitespace(bytes, start, segment_end);
    if stopped {
        return end;
    }

    // Continuation lines must be indented deeper than the enclosing collection.
    let mut line_start = first_line_end + 1;
    while line_start < bytes.len() {
        let current_end = line_end(bytes, line_start);
        let line = &bytes[line_start..current_end];
        if is_blank(line) {
            line_start = current_end + 1;
            continue;
        }

        let indent = indent_of(line);
        if parent_indent.is_some_and(|parent| indent <= parent) || is_document_marker(line) {
            break;
        }

        let content_start = line_start + leading_whitespace(line);
        if bytes[content_start] == b'#' {
            break;
        }

        let (segment_end, stopped) = plain_segment_end(bytes, content_start, current_end);
        end = trim_trailing_whitespace(bytes, content_start, segment_end);
        if stopped {
            break;
        }
        line_start = current_end + 1;
    }

    end
}

/// Scan one line of a block plain scalar. Returns the offset where scanning
/// stopped and whether a comment or mapping indicator terminated the scalar.
fn plain_segment_end(bytes: &[u8], from: usize, limit: usize) -> (usize, bool) {
    let mut i = from;
    while i < limit {
        match bytes[i] {
            b'#' if i > from && matches!(bytes[i - 1], b' ' | b'\t') => return (i, true),
            b':' if matches!(bytes.get(i + 1), None | Some(b' ' | b'\t' | b'\r' | b'\n')) => {
                return (i, true);
            }
            _ => i += 1,
        }
    }
    (limit, false)
}

fn flow_plain_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b',' | b'[' | b']' | b'{' | b'}' => break,
            b'#' if i > start && matches!(bytes[i - 1], b' ' | b'\t' | b'\r' | b'\n') => break,
            b':' if matches!(
                bytes.get(i + 1),
                None | Some(b' ' | b'\t' | b'\r' | b'\n' | b',' | b'[' | b']' | b'{' | b'}')
            ) =>
            {
                break
            }
            b' ' | b'\t' | b'\r' | b'\n' => {}
            _ => end = i + 1,
        }
        i += 1;
    }
    end
}

fn block_scalar_end(bytes: &[u8], start: usize, parent_indent: Option<usize>) -> usize {
    let header_end = line_end(bytes, start);

    // Indicator followed by optional chomping and indentation indicators.
    let mut explicit_indent = None;
    let mut end = start + 1;
    while end < header_end {
        match bytes[end] {
            digit @ b'1'..=b'9' => explicit_indent = Some(usize::from(digit - b'0')),
            b'+' | b'-' => {}
            _ => break,
        }
        end += 1;
    }

    let min_indent = parent_indent.map_or(0, |parent| parent + 1);
    let mut content_indent = explicit_indent.map(|digit| parent_indent.unwrap_or(0) + digit);

    let mut line_start = header_end + 1;
    while line_start < bytes.len() {
        let current_end = line_end(bytes, line_start);
        let line = &bytes[line_start..current_end];
        if is_blank(line) {
            line_start = current_end + 1;
            continue;
        }

        let indent = indent_of(line);
        let required = *content_indent.get_or_insert(indent);
        if indent < required || indent < min_indent || (indent == 0 && is_document_marker(line)) {
            break;
        }

        end = trim_carriage_return(bytes, line_start, current_end);
        line_start = current_end + 1;
    }

    end
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map_or(bytes.len(), |idx| from + idx)
}

fn trim_trailing_whitespace(bytes: &[u8], start: usize, mut end: usize) -> usize {
    while end > start && matches!(bytes[end - 1], b' ' | b'\t' | b'\r') {
        end -= 1;
    }
    end
}

fn trim_carriage_return(bytes: &[u8], start: usize, end: usize) -> usize {
    if end > start && bytes[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|byte| matches!(byte, b' ' | b'\t' | b'\r'))
}

fn indent_of(line: &[u8]) -> usize {
    line.iter().take_while(|byte| **byte == b' ').count()
}

fn leading_whitespace(line: &[u8]) -> usize {
    line.iter()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count()
}

fn is_document_marker(line: &[u8]) -> bool {
    (line.starts_with(b"---") || line.starts_with(b"..."))
        && matches!(line.get(3), None | Some(b' ' | b'\t' | b'\r'))
}
