//! Predicates over `(node, path)` pairs and the search that applies them.

use crate::yaml::node::{Node, Tag};
use crate::yaml::scanner::NodeScanner;
use std::collections::BTreeMap;

/// A predicate selecting nodes during a [`search`].
pub trait Matcher {
    fn matches(&self, node: &Node, path: &str) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Node, &str) -> bool,
{
    fn matches(&self, node: &Node, path: &str) -> bool {
        self(node, path)
    }
}

/// Matches the node whose path is exactly the given string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEquals {
    path: String,
}

impl PathEquals {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for PathEquals {
    fn matches(&self, _node: &Node, path: &str) -> bool {
        path == self.path
    }
}

/// Matches mappings that already hold every `field: value` selector.
///
/// Keys compare by their text when tagged string, int, bool or null. Values
/// must be string scalars with exactly the expected text. An empty selector
/// set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingContains {
    selectors: BTreeMap<String, String>,
}

impl MappingContains {
    pub fn new(selectors: BTreeMap<String, String>) -> Self {
        Self { selectors }
    }
}

impl Matcher for MappingContains {
    fn matches(&self, node: &Node, _path: &str) -> bool {
        let Node::Mapping(mapping) = node else {
            return false;
        };
        if self.selectors.is_empty() {
            return false;
        }

        self.selectors.iter().all(|(field, expected)| {
            mapping.entries.iter().any(|entry| {
                entry.key.tag.is_key_comparable()
                    && entry.key.value == *field
                    && matches!(
                        &entry.value,
                        Node::Scalar(value) if value.tag == Tag::Str && value.value == *expected
                    )
            })
        })
    }
}

/// [`MappingContains`] restricted to paths starting with `prefix`.
///
/// The prefix test is a plain string prefix: `.foo` also covers `.foobar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixScopedMappingContains {
    prefix: String,
    contains: MappingContains,
}

impl PrefixScopedMappingContains {
    pub fn new(prefix: impl Into<String>, selectors: BTreeMap<String, String>) -> Self {
        Self {
            prefix: prefix.into(),
            contains: MappingContains::new(selectors),
        }
    }
}

impl Matcher for PrefixScopedMappingContains {
    fn matches(&self, node: &Node, path: &str) -> bool {
        path.starts_with(&self.prefix) && self.contains.matches(node, path)
    }
}

/// Scan the whole tree and collect every node that satisfies all `matchers`.
///
/// With no matchers nothing is selected.
pub fn search<'a>(
    root: &'a Node,
    root_path: &str,
    matchers: &[Box<dyn Matcher + '_>],
) -> BTreeMap<String, &'a Node> {
    if matchers.is_empty() {
        return BTreeMap::new();
    }

    NodeScanner::new(root, root_path)
        .filter(|(node, path)| matchers.iter().all(|matcher| matcher.matches(node, path)))
        .map(|(node, path)| (path, node))
        .collect()
}
