pub mod errors;
pub mod line_index;
pub mod matcher;
pub mod node;
pub mod parser;
pub mod scanner;
mod span;

pub use errors::YamlError;
pub use line_index::LineIndex;
pub use matcher::{search, MappingContains, Matcher, PathEquals, PrefixScopedMappingContains};
pub use node::{Mapping, MappingEntry, Node, Position, Scalar, ScalarStyle, Sequence, Span, Tag};
pub use parser::{parse, parse_bytes};
pub use scanner::NodeScanner;
