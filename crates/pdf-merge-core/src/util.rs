//! Filename sanitization helpers.

use std::path::Path;

/// Slugify a string into a filesystem/URL-safe token.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-`, and trims leading/trailing dashes. ASCII only; anything
/// outside `[a-z0-9]` is a separator.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Derive the safe output filename from a user-supplied one.
///
/// The extension is stripped, the base slugified, and `.pdf` appended.
/// An empty or all-symbol base falls back to `merged`.
pub fn safe_filename(requested: &str) -> String {
    let base = Path::new(requested)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let slug = slugify(base);
    let base = if slug.is_empty() { "merged" } else { &slug };
    format!("{base}.pdf")
}
