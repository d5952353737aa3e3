pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_rules, apply_to_file, ApplicationError, FileOutcome};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{Metadata, RuleDefinition, RuleSet, ValidationError, ValidationIssue};
