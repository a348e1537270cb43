//! `.codeprint.toml` configuration.
//!
//! The file is looked up in the current directory and its ancestors. Every
//! section is optional and every field has a default, so an empty or missing
//! file yields [`CodeprintConfig::default`].

mod core;
mod loader;

pub use self::core::{
    CacheConfig, CodeprintConfig, DetectionConfig, OutputConfig, OutputFormat,
    DEFAULT_CACHE_CAPACITY, DEFAULT_DEBOUNCE_MS,
};
pub use loader::{
    default_config_toml, directory_ancestors, load_config, load_config_file, load_config_from_dir,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
