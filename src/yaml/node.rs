use std::fmt;

/// A 1-based source position. `column` counts bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source extent of a node; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Resolved YAML tag of a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Str,
    Int,
    Float,
    Bool,
    Null,
    /// Any explicit tag outside the core schema, kept verbatim.
    Other(String),
}

impl Tag {
    /// Tags whose keys can be compared by their textual form.
    pub fn is_key_comparable(&self) -> bool {
        matches!(self, Tag::Str | Tag::Int | Tag::Bool | Tag::Null)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Str => f.write_str("!!str"),
            Tag::Int => f.write_str("!!int"),
            Tag::Float => f.write_str("!!float"),
            Tag::Bool => f.write_str("!!bool"),
            Tag::Null => f.write_str("!!null"),
            Tag::Other(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub tag: Tag,
    /// Textual value after unquoting and folding.
    pub value: String,
    pub style: ScalarStyle,
    /// True when the scalar sits inside a flow mapping or flow sequence.
    pub in_flow: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub key: Scalar,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub entries: Vec<MappingEntry>,
    pub flow: bool,
    pub span: Span,
}

impl Mapping {
    /// Find the entry whose key text equals `key`.
    pub fn entry(&self, key: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|entry| entry.key.value == key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entry(key).map(|entry| &entry.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub flow: bool,
    pub span: Span,
}

/// A parsed YAML node. Anything outside these three kinds is rejected while
/// the tree is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Mapping(Mapping),
    Sequence(Sequence),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Scalar(scalar) => scalar.span,
            Node::Mapping(mapping) => mapping.span,
            Node::Sequence(sequence) => sequence.span,
        }
    }

    /// Tag name as it would be reported to a user, e.g. `!!int` or `!!map`.
    pub fn tag_name(&self) -> String {
        match self {
            Node::Scalar(scalar) => scalar.tag.to_string(),
            Node::Mapping(_) => "!!map".to_string(),
            Node::Sequence(_) => "!!seq".to_string(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }
}
