//! Slug and excerpt helpers

/// Number of characters kept when deriving an excerpt
pub const EXCERPT_CHARS: usize = 150;

/// Lowercase, ASCII-alphanumeric words joined with `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
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

/// First `EXCERPT_CHARS` characters of `content`, trimmed.
pub fn excerpt_of(content: &str) -> String {
    content
        .trim()
        .chars()
        .take(EXCERPT_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}
