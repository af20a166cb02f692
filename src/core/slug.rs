//! Slug generation for company and industry codes
//!
//! Codes double as primary keys and URL segments, so they are derived once
//! at creation time and never recomputed when the display name changes.

use regex::Regex;
use std::sync::LazyLock;

/// Characters removed outright before whitespace is collapsed.
static REMOVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[*+~.()'"!:@]"#).expect("static slug pattern"));

/// Separator inserted in place of each whitespace run
pub const SEPARATOR: char = '-';

/// Derive a code from a display name.
///
/// Lowercases, strips `* + ~ . ( ) ' " ! : @` and joins the remaining
/// whitespace-separated words with `-`.
///
/// ```
/// use biztime::core::slug::slugify;
///
/// assert_eq!(slugify("Apple Computer"), "apple-computer");
/// assert_eq!(slugify("  I.B.M.  (Big Blue) "), "ibm-big-blue");
/// ```
pub fn slugify(name: &str) -> String {
    let stripped = REMOVED.replace_all(name, "");
    let lowered = stripped.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !slug.is_empty() {
            slug.push(SEPARATOR);
        }
        slug.push_str(word);
    }
    slug
}
