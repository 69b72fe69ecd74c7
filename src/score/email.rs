use once_cell::sync::Lazy;
use regex::Regex;

/// First address-like token in free text
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^@|\s]+@[^@]+\.[^@|\s]+)").expect("email pattern is valid")
});

/// Extracts a contact email from affiliation text
///
/// A trailing period (end of the affiliation sentence) is stripped.
pub fn extract_email(affiliation: &str) -> Option<String> {
    let found = EMAIL_PATTERN.captures(affiliation)?.get(1)?.as_str();
    let email = found.strip_suffix('.').unwrap_or(found);
    Some(email.to_string())
}
