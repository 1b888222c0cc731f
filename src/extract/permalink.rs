use url::Url;

/// Resolve a post href to an absolute URL and drop its query string.
///
/// Relative hrefs resolve against `site_root`.
///
/// # Errors
///
/// Returns an error if the href cannot be parsed or joined.
pub fn resolve_permalink(href: &str, site_root: &Url) -> Result<String, url::ParseError> {
    let absolute = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => site_root.join(href)?,
        Err(e) => return Err(e),
    };

    let absolute = String::from(absolute);
    Ok(absolute
        .split_once('?')
        .map_or(absolute.as_str(), |(before, _)| before)
        .to_string())
}

/// Whether an href points at a post, per the configured path patterns.
#[must_use]
pub fn is_post_link(href: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| href.contains(p.as_str()))
}
