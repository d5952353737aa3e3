//! The surgical update engine.
//!
//! [`update`] locates mappings in a YAML document by path and/or by the
//! values they already hold, then rewrites selected string fields of those
//! mappings in place. Only the bytes of the replaced scalars change; comments,
//! indentation, quoting and ordering everywhere else are left untouched.

pub mod encode;
pub mod errors;

pub use errors::UpdateError;

use crate::splice::Splice;
use crate::yaml::{
    self, search, LineIndex, MappingContains, Matcher, Node, PathEquals,
    PrefixScopedMappingContains, Scalar, ScalarStyle, Tag,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Path of the document root.
pub const ROOT_PATH: &str = ".";

/// One logical edit group: which mappings to touch and what to write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rule {
    /// Exact path of the mapping to edit, e.g. `.image`.
    #[serde(default)]
    pub path: String,
    /// Restricts `selectors` to mappings whose path starts with this string.
    #[serde(default)]
    pub selector_prefix: String,
    /// `field: value` pairs a mapping must already hold to be edited.
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,
    /// `field: new value` pairs written into every matched mapping.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Rule {
    pub fn apply(&self, document: &[u8]) -> Result<Vec<u8>, UpdateError> {
        update(
            document,
            &self.path,
            &self.selector_prefix,
            &self.selectors,
            &self.values,
        )
    }
}

/// Rewrite `new_values` fields of every mapping selected by the rule.
///
/// Mappings are selected by, in order of precedence:
/// 1. `selector_prefix` and `selectors` together: mappings under the prefix
///    holding all selectors;
/// 2. otherwise `path_spec` and/or `selectors`, both required when both are
///    given.
///
/// Every targeted field must exist and currently hold a string scalar. The
/// input is never modified and the returned buffer is always freshly
/// allocated; on error nothing is returned.
pub fn update(
    document: &[u8],
    path_spec: &str,
    selector_prefix: &str,
    selectors: &BTreeMap<String, String>,
    new_values: &BTreeMap<String, String>,
) -> Result<Vec<u8>, UpdateError> {
    let matchers = compose_matchers(path_spec, selector_prefix, selectors)?;

    let source = std::str::from_utf8(document).map_err(yaml::YamlError::from)?;
    let root = yaml::parse(source)?;

    let encoded = new_values
        .iter()
        .map(|(field, value)| {
            encode::encode_scalar(field, value).map(|token| (field.as_str(), (value.as_str(), token)))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let matched = search(&root, ROOT_PATH, &matchers);
    debug!(
        matched = matched.len(),
        fields = encoded.len(),
        "selected mappings for update"
    );

    let line_index = LineIndex::new(document);
    let mut splices = Vec::with_capacity(matched.len() * encoded.len());
    for (path, node) in &matched {
        for (field, (value, token)) in &encoded {
            let scalar = target_scalar(path, node, field)?;
            let token = if scalar.in_flow {
                encode::encode_for_flow(field, value, token)?
            } else {
                token.clone()
            };
            splices.push(replacement(source, &line_index, path, field, scalar, token)?);
        }
    }

    if splices.is_empty() {
        return Ok(document.to_vec());
    }

    let updated = Splice::apply_batch(source, splices)?;
    yaml::parse(&updated).map_err(UpdateError::InvalidOutput)?;
    Ok(updated.into_bytes())
}

fn compose_matchers(
    path_spec: &str,
    selector_prefix: &str,
    selectors: &BTreeMap<String, String>,
) -> Result<Vec<Box<dyn Matcher>>, UpdateError> {
    if !selector_prefix.is_empty() && !selectors.is_empty() {
        debug!(selector_prefix, "matching selectors under prefix");
        return Ok(vec![Box::new(PrefixScopedMappingContains::new(
            selector_prefix,
            selectors.clone(),
        ))]);
    }

    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
    if !path_spec.is_empty() {
        matchers.push(Box::new(PathEquals::new(path_spec)));
    }
    if !selectors.is_empty() {
        matchers.push(Box::new(MappingContains::new(selectors.clone())));
    }

    if matchers.is_empty() {
        return Err(UpdateError::NoMatcher);
    }
    debug!(path_spec, selectors = selectors.len(), "matching by path and selectors");
    Ok(matchers)
}

/// The string scalar currently stored under `field` in the matched node.
fn target_scalar<'a>(path: &str, node: &'a Node, field: &str) -> Result<&'a Scalar, UpdateError> {
    let entry = node
        .as_mapping()
        .and_then(|mapping| mapping.entry(field))
        .ok_or_else(|| UpdateError::MissingField {
            path: path.to_string(),
            field: field.to_string(),
        })?;

    match &entry.value {
        Node::Scalar(scalar) if scalar.tag == Tag::Str => Ok(scalar),
        other => Err(UpdateError::TypeMismatch {
            path: path.to_string(),
            field: field.to_string(),
            found: other.tag_name(),
        }),
    }
}

/// Convert the scalar's span into byte offsets and check they cover the value.
fn replacement(
    source: &str,
    line_index: &LineIndex,
    path: &str,
    field: &str,
    scalar: &Scalar,
    token: String,
) -> Result<Splice, UpdateError> {
    let start = line_index.offset(scalar.span.start);
    let end = line_index.offset(scalar.span.end);
    let mismatch = || UpdateError::SpanMismatch {
        path: path.to_string(),
        field: field.to_string(),
        byte_start: start.unwrap_or_default(),
        byte_end: end.unwrap_or_default(),
    };

    let (Some(byte_start), Some(byte_end)) = (start, end) else {
        return Err(mismatch());
    };
    let splice = Splice::new(byte_start, byte_end, token);
    match splice.current(source) {
        Ok(text) if covers_value(text, scalar) => {}
        _ => return Err(mismatch()),
    }

    trace!(path, field, byte_start, byte_end, token = %splice.new_text, "replacing scalar");
    Ok(splice)
}

/// Whether `text`, the source slice of a span, is the scalar it claims to be.
fn covers_value(text: &str, scalar: &Scalar) -> bool {
    let quoted = |quote: char| text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote);
    match scalar.style {
        ScalarStyle::DoubleQuoted => quoted('"'),
        ScalarStyle::SingleQuoted => quoted('\''),
        ScalarStyle::Literal => text.starts_with('|'),
        ScalarStyle::Folded => text.starts_with('>'),
        ScalarStyle::Plain if text.contains('\n') => text
            .split_whitespace()
            .eq(scalar.value.split_whitespace()),
        ScalarStyle::Plain => text == scalar.value,
    }
}
