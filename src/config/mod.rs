//! Configuration module for Genewiki-Priority
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering environment-supplied credentials on top.
//!
//! # Example
//!
//! ```no_run
//! use genewiki_priority::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("genewiki.toml")).unwrap();
//! println!("Retry budget: {}", config.fetch.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EndpointConfig, FetchConfig, OutputConfig, PageViewConfig, ResumeConfig,
    ThresholdConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, ENV_API_KEY,
    ENV_CONTACT_EMAIL, ENV_USER_AGENT,
};
pub use validation::validate;
