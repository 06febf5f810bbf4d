use once_cell::sync::Lazy;
use regex::Regex;

pub static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Derives a URL slug from a title: ASCII letters and digits are kept (lowercased),
/// every other run of characters becomes a single `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Uses the explicit slug when given, otherwise derives one from `source`.
pub fn resolve_slug(explicit: Option<String>, source: &str) -> Option<String> {
    let slug = explicit.unwrap_or_else(|| slugify(source));
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
