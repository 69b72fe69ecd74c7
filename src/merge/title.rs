/// Host and path prefix stripped from English-language article links
const ARTICLE_PREFIX: &str = "http://en.wikipedia.org/wiki/";

/// Normalizes an article link (or title) to the key used by every stage
///
/// # Normalization Steps
///
/// 1. Replace spaces with underscores
/// 2. Downgrade `https://` to `http://`
/// 3. Strip the `http://en.wikipedia.org/wiki/` prefix
///
/// Applying it to an already normalized title is a no-op.
///
/// # Examples
///
/// ```
/// use genewiki_priority::normalize_title;
///
/// assert_eq!(normalize_title("https://en.wikipedia.org/wiki/Cyclin D1"), "Cyclin_D1");
/// assert_eq!(normalize_title("Cyclin_D1"), "Cyclin_D1");
/// ```
pub fn normalize_title(link: &str) -> String {
    // Step 1
    let underscored = link.replace(' ', "_");

    // Step 2
    let downgraded = underscored.replace("https://", "http://");

    // Step 3
    downgraded.replace(ARTICLE_PREFIX, "")
}
