use crate::config::types::{
    Config, EndpointConfig, FetchConfig, OutputConfig, ResumeConfig, ThresholdConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_endpoints(&config.endpoints)?;
    validate_thresholds(&config.thresholds)?;
    validate_resume_config(&config.resume)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates client identification
///
/// Both upstreams refuse anonymous bulk clients, so a contact email is a hard
/// precondition.
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.contact_email.trim().is_empty() {
        return Err(ConfigError::MissingCredential(format!(
            "contact email (set [user-agent] contact-email or {})",
            crate::config::ENV_CONTACT_EMAIL
        )));
    }
    validate_email(&config.contact_email)?;

    if config.override_string.is_none() {
        if config.client_name.is_empty() {
            return Err(ConfigError::Validation(
                "client_name cannot be empty".to_string(),
            ));
        }

        if !config
            .client_name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "client_name must contain only alphanumeric characters and hyphens, got '{}'",
                config.client_name
            )));
        }
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if !(config.backoff_factor >= 0.0 && config.backoff_factor.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a non-negative number, got {}",
            config.backoff_factor
        )));
    }

    for status in &config.retry_statuses {
        if !(100..=599).contains(status) {
            return Err(ConfigError::Validation(format!(
                "retry_statuses contains an invalid HTTP status: {}",
                status
            )));
        }
    }

    if config.wiki_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "wiki_delay_ms must be >= 100ms, got {}ms",
            config.wiki_delay_ms
        )));
    }

    if config.literature_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "literature_delay_ms must be >= 100ms, got {}ms",
            config.literature_delay_ms
        )));
    }

    if config.concurrency < 1 || config.concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 16, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("sparql-url", &config.sparql_url),
        ("wiki-api-url", &config.wiki_api_url),
        ("pageviews-url", &config.pageviews_url),
        ("eutils-url", &config.eutils_url),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                name, value
            )));
        }
    }
    Ok(())
}

fn validate_thresholds(config: &ThresholdConfig) -> Result<(), ConfigError> {
    if config.max_page_length == 0 {
        return Err(ConfigError::Validation(
            "max_page_length must be >= 1".to_string(),
        ));
    }

    if config.top_n == 0 {
        return Err(ConfigError::Validation("top_n must be >= 1".to_string()));
    }

    if config.pubcount_divisor <= 0.0 || config.length_numerator <= 0.0 {
        return Err(ConfigError::Validation(
            "length_numerator and pubcount_divisor must be positive".to_string(),
        ));
    }

    Ok(())
}

fn validate_resume_config(config: &ResumeConfig) -> Result<(), ConfigError> {
    if config.residual_threshold == 0 {
        return Err(ConfigError::Validation(
            "residual_threshold must be >= 1".to_string(),
        ));
    }

    if config.max_passes == 0 {
        return Err(ConfigError::Validation(
            "max_passes must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("data_dir", &config.data_dir),
        ("result_dir", &config.result_dir),
        ("ledger_path", &config.ledger_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
