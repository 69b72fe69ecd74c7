use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Full user-agent string
pub const ENV_USER_AGENT: &str = "GENEWIKI_USER_AGENT";

/// Contact email for the user agent and the literature index
pub const ENV_CONTACT_EMAIL: &str = "GENEWIKI_CONTACT_EMAIL";

/// Literature index API key
pub const ENV_API_KEY: &str = "NCBI_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// Credentials from the environment (and a `.env` file, if present) take
/// precedence over the file before validation runs.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use genewiki_priority::config::load_config;
///
/// let config = load_config(Path::new("genewiki.toml")).unwrap();
/// println!("Data dir: {}", config.output.data_dir);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;

    // A missing .env file is the normal case
    let _ = dotenvy::dotenv();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Applies environment-supplied credentials to a configuration
///
/// The lookup is injected so tests do not have to mutate process state.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(agent) = lookup(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
        config.user_agent.override_string = Some(agent);
    }
    if let Some(email) = lookup(ENV_CONTACT_EMAIL).filter(|v| !v.trim().is_empty()) {
        config.user_agent.contact_email = email;
    }
    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.user_agent.ncbi_api_key = Some(key);
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded in the run ledger to tell whether thresholds changed between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
