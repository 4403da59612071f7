pub mod loader;
pub mod schema;

pub use loader::{
    discover, load_from_path, load_from_str, resolve, ConfigError, ConfigFormat, CONFIG_FILE_NAMES,
};
pub use schema::{SorterConfig, ValidationError, ValidationIssue};
