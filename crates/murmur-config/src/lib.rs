//! murmur configuration system.
//!
//! TOML-based configuration with full validation. All config sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use murmur_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("display name: {}", config.session.display_name);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{MurmurConfig, CONFIG_SCHEMA_VERSION};
pub use validation::{MAX_VOLUME, MIN_VOLUME};

use murmur_common::ConfigError;
use std::path::Path;

/// Load config from `path` when given, otherwise from the platform default
/// location (creating a commented default file on first run). A file that
/// fails validation is replaced by the defaults with a warning.
pub fn load_config(path: Option<&Path>) -> Result<MurmurConfig, ConfigError> {
    match path {
        Some(p) => toml_loader::load_from_path(p),
        None => toml_loader::load_default(),
    }
}
