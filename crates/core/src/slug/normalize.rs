//! Turning display names into URL-safe candidates.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Longest slug a venue may carry.
pub const MAX_SLUG_LEN: usize = 100;

/// Room kept free at the end of a generated base for a `-N` suffix.
const SUFFIX_RESERVE: usize = 8;

/// Used when a name has no ASCII letter or digit left after normalization.
pub const FALLBACK_SLUG: &str = "restaurant";

/// Derives a slug candidate from a display name.
///
/// Accents are stripped, the result is lowercased, every run of characters outside
/// `[a-z0-9]` becomes a single hyphen, and leading or trailing hyphens are removed.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    truncate(slug, MAX_SLUG_LEN - SUFFIX_RESERVE)
}

fn truncate(mut slug: String, max: usize) -> String {
    if slug.len() > max {
        slug.truncate(max);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Returns true if `slug` matches `^[a-z0-9]+(?:-[a-z0-9]+)*$` and fits the length limit.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}
