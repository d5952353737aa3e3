//! Builds a [`Node`] tree with byte-accurate spans from `yaml-rust2` events.

use crate::yaml::errors::YamlError;
use crate::yaml::line_index::LineIndex;
use crate::yaml::node::{Mapping, MappingEntry, Node, Scalar, ScalarStyle, Sequence, Span, Tag};
use crate::yaml::span::{block_scalar_header, scalar_end, ScalarContext};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::Yaml;

const CORE_SCHEMA_HANDLE: &str = "tag:yaml.org,2002:";

/// Parse a document that must contain exactly one YAML document.
pub fn parse(source: &str) -> Result<Node, YamlError> {
    let mut parser = Parser::new_from_str(source);
    let mut builder = TreeBuilder::new(source);
    parser.load(&mut builder, true)?;
    builder.finish()
}

/// Parse raw document bytes, rejecting input that is not UTF-8.
pub fn parse_bytes(document: &[u8]) -> Result<Node, YamlError> {
    let source = std::str::from_utf8(document)?;
    parse(source)
}

/// A collection under construction.
enum Frame {
    Sequence {
        start: usize,
        flow: bool,
        indent: usize,
        items: Vec<Node>,
    },
    Mapping {
        start: usize,
        flow: bool,
        indent: usize,
        entries: Vec<MappingEntry>,
        pending_key: Option<Scalar>,
    },
}

impl Frame {
    fn is_flow(&self) -> bool {
        match self {
            Frame::Sequence { flow, .. } | Frame::Mapping { flow, .. } => *flow,
        }
    }

    fn indent(&self) -> usize {
        match self {
            Frame::Sequence { indent, .. } | Frame::Mapping { indent, .. } => *indent,
        }
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    line_index: LineIndex,
    /// Byte offset of every character, present only for non-ASCII sources.
    char_offsets: Option<Vec<usize>>,
    stack: Vec<Frame>,
    root: Option<Node>,
    documents: usize,
    error: Option<YamlError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let char_offsets = (!source.is_ascii())
            .then(|| source.char_indices().map(|(offset, _)| offset).collect());
        Self {
            source,
            line_index: LineIndex::new(source.as_bytes()),
            char_offsets,
            stack: Vec::new(),
            root: None,
            documents: 0,
            error: None,
        }
    }

    fn finish(self) -> Result<Node, YamlError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.documents != 1 {
            return Err(YamlError::DocumentCount {
                found: self.documents,
            });
        }
        match self.root {
            // "---" alone: the document holds nothing but an implicit null.
            Some(Node::Scalar(scalar))
                if scalar.tag == Tag::Null && scalar.span.start == scalar.span.end =>
            {
                Err(YamlError::DocumentCount { found: 0 })
            }
            Some(root) => Ok(root),
            None => Err(YamlError::DocumentCount { found: 0 }),
        }
    }

    /// Markers count characters; spans count bytes.
    fn byte_offset(&self, marker: &Marker) -> usize {
        let index = marker.index();
        match &self.char_offsets {
            None => index.min(self.source.len()),
            Some(offsets) => offsets.get(index).copied().unwrap_or(self.source.len()),
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.line_index.position(start), self.line_index.position(end))
    }

    fn unsupported(&self, kind: impl Into<String>, offset: usize) -> YamlError {
        let position = self.line_index.position(offset);
        YamlError::UnsupportedNodeKind {
            kind: kind.into(),
            line: position.line,
            column: position.column,
        }
    }

    fn in_flow(&self) -> bool {
        self.stack.last().is_some_and(Frame::is_flow)
    }

    fn open_collection(&self, marker: &Marker, opener: u8) -> (usize, bool, usize) {
        let start = self.byte_offset(marker);
        let flow = self.in_flow() || self.source.as_bytes().get(start) == Some(&opener);
        let indent = self.line_index.position(start).column - 1;
        (start, flow, indent)
    }

    fn close_collection(&self, marker: &Marker, closer: u8, flow: bool, last_end: Option<usize>) -> usize {
        let offset = self.byte_offset(marker);
        if flow && self.source.as_bytes().get(offset) == Some(&closer) {
            offset + 1
        } else {
            last_end.unwrap_or(offset)
        }
    }

    fn build_scalar(
        &self,
        value: String,
        style: TScalarStyle,
        explicit_tag: Option<(&str, &str)>,
        start: usize,
    ) -> Scalar {
        let style = convert_style(style);
        let tag = resolve_tag(&value, style, explicit_tag);
        let in_flow = self.in_flow();
        let context = ScalarContext {
            in_flow,
            parent_indent: self
                .stack
                .last()
                .filter(|frame| !frame.is_flow())
                .map(Frame::indent),
        };

        // Block scalar markers point at the first content line.
        let start = if style == ScalarStyle::Literal || style == ScalarStyle::Folded {
            block_scalar_header(self.source, start).unwrap_or(start)
        } else {
            start
        };

        // Empty values ("key:") are reported as a "~" that is not in the source.
        let implicit = style == ScalarStyle::Plain
            && value
                .chars()
                .next()
                .map_or(true, |first| !self.source[start..].starts_with(first));
        let end = if implicit {
            start
        } else {
            scalar_end(self.source, start, style, context)
        };

        Scalar {
            tag,
            value,
            style,
            in_flow,
            span: self.span(start, end),
        }
    }

    fn attach(&mut self, node: Node) -> Result<(), YamlError> {
        let key_start = match &node {
            Node::Scalar(key) => self
                .line_index
                .offset(key.span.start)
                .map(|offset| (offset, key.span.start.column - 1)),
            _ => None,
        };
        let complex_key = match self.stack.last_mut() {
            None => {
                self.root = Some(node);
                return Ok(());
            }
            Some(Frame::Sequence { items, .. }) => {
                items.push(node);
                return Ok(());
            }
            Some(Frame::Mapping {
                start,
                flow,
                indent,
                entries,
                pending_key,
            }) => match (pending_key.take(), node) {
                (Some(key), value) => {
                    entries.push(MappingEntry { key, value });
                    return Ok(());
                }
                (None, Node::Scalar(key)) => {
                    // Block mapping markers sit on the first key's ':'.
                    if let (false, true, Some((offset, column))) =
                        (*flow, entries.is_empty(), key_start)
                    {
                        *start = offset;
                        *indent = column;
                    }
                    *pending_key = Some(key);
                    return Ok(());
                }
                (None, complex) => complex,
            },
        };

        let offset = self
            .line_index
            .offset(complex_key.span().start)
            .unwrap_or_default();
        Err(self.unsupported(format!("{} mapping key", complex_key.tag_name()), offset))
    }

    fn handle(&mut self, event: Event, marker: Marker) -> Result<(), YamlError> {
        match event {
            Event::DocumentStart => self.documents += 1,

            Event::Scalar(value, style, _anchor, tag) => {
                let start = self.byte_offset(&marker);
                let explicit = tag
                    .as_ref()
                    .map(|tag| (tag.handle.as_str(), tag.suffix.as_str()));
                let scalar = self.build_scalar(value, style, explicit, start);
                self.attach(Node::Scalar(scalar))?;
            }

            Event::SequenceStart(..) => {
                let (start, flow, indent) = self.open_collection(&marker, b'[');
                self.stack.push(Frame::Sequence {
                    start,
                    flow,
                    indent,
                    items: Vec::new(),
                });
            }

            Event::MappingStart(..) => {
                let (start, flow, indent) = self.open_collection(&marker, b'{');
                self.stack.push(Frame::Mapping {
                    start,
                    flow,
                    indent,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }

            Event::SequenceEnd => {
                if let Some(Frame::Sequence {
                    start, flow, items, ..
                }) = self.stack.pop()
                {
                    let last_end = items.last().and_then(|item| self.end_offset(item));
                    let end = self.close_collection(&marker, b']', flow, last_end);
                    let span = self.span(start, end);
                    self.attach(Node::Sequence(Sequence { items, flow, span }))?;
                }
            }

            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    start,
                    flow,
                    entries,
                    ..
                }) = self.stack.pop()
                {
                    let last_end = entries
                        .last()
                        .and_then(|entry| self.end_offset(&entry.value));
                    let end = self.close_collection(&marker, b'}', flow, last_end);
                    let span = self.span(start, end);
                    self.attach(Node::Mapping(Mapping {
                        entries,
                        flow,
                        span,
                    }))?;
                }
            }

            Event::Alias(_) => {
                let offset = self.byte_offset(&marker);
                return Err(self.unsupported("alias", offset));
            }

            _ => {}
        }
        Ok(())
    }

    fn end_offset(&self, node: &Node) -> Option<usize> {
        self.line_index.offset(node.span().end)
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, event: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.handle(event, marker) {
            self.error = Some(error);
        }
    }
}

fn convert_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Plain,
    }
}

/// Resolve a scalar's tag: explicit tags win, non-plain scalars are strings,
/// plain scalars follow the core schema.
fn resolve_tag(value: &str, style: ScalarStyle, explicit: Option<(&str, &str)>) -> Tag {
    if let Some((handle, suffix)) = explicit {
        if handle == "!!" || handle == CORE_SCHEMA_HANDLE {
            return match suffix {
                "str" => Tag::Str,
                "int" => Tag::Int,
                "float" => Tag::Float,
                "bool" => Tag::Bool,
                "null" => Tag::Null,
                other => Tag::Other(format!("!!{other}")),
            };
        }
        if handle == "!" && suffix.is_empty() {
            return Tag::Str;
        }
        return Tag::Other(format!("{handle}{suffix}"));
    }

    if style != ScalarStyle::Plain {
        return Tag::Str;
    }

    match Yaml::from_str(value) {
        Yaml::Integer(_) => Tag::Int,
        Yaml::Real(_) => Tag::Float,
        Yaml::Boolean(_) => Tag::Bool,
        Yaml::Null => Tag::Null,
        _ => Tag::Str,
    }
}
