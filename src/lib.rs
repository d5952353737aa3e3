//! Chart Values Patcher: surgical rewriting of scalar values in YAML documents
//!
//! Rewrites container-image coordinates (or any other string fields) inside
//! Helm values files without re-serializing the document. Comments, anchors,
//! quoting, indentation and key order of everything that is not replaced stay
//! byte-for-byte identical.
//!
//! # Architecture
//!
//! A document is parsed into a [`yaml::Node`] tree whose scalars carry exact
//! byte spans. A [`yaml::NodeScanner`] walks the tree yielding `(node, path)`
//! pairs, [`yaml::Matcher`]s select mappings by path or by the values they
//! already hold, and every selected field becomes a [`Splice`] over the
//! original bytes. Splices are applied bottom-to-top so earlier offsets stay
//! valid.
//!
//! # Example
//!
//! ```
//! use chart_values_patcher::update;
//! use std::collections::BTreeMap;
//!
//! let values = b"image:\n  repository: nginx # upstream\n  tag: \"1.25\"\n";
//! let new_values = BTreeMap::from([
//!     ("repository".to_string(), "registry.example.com/nginx".to_string()),
//! ]);
//!
//! let edited = update(values, ".image", "", &BTreeMap::new(), &new_values).unwrap();
//! assert_eq!(
//!     edited,
//!     b"image:\n  repository: registry.example.com/nginx # upstream\n  tag: \"1.25\"\n"
//! );
//! ```

pub mod config;
pub mod splice;
pub mod update;
pub mod yaml;

// Re-exports
pub use config::{
    apply_rules, apply_to_file, load_from_path, load_from_str, ApplicationError, ConfigError,
    FileOutcome, RuleDefinition, RuleSet,
};
pub use splice::{Splice, SpliceError};
pub use update::{update, Rule, UpdateError};
pub use yaml::{Node, NodeScanner, YamlError};
