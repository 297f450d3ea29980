//! Key normalisation and display-name humanising.
//!
//! Canonical keys are compared byte-for-byte, so every spelling of a site
//! ("Hello Fresh", "hello_fresh", "HELLO-FRESH") must collapse to the same
//! lowercase alphanumeric string before it is used for grouping.

/// Normalise an arbitrary string into a canonical grouping key.
///
/// Lowercases, then drops every character outside `[a-z0-9]`.
///
/// "Blue Apron" → "blueapron", "green_chef-2" → "greenchef2", "" → "".
pub fn normalize_key(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Turn an identifier-ish string into a human-readable title.
///
/// # Algorithm
///
/// 1. Runs of `_` and `-` become a single space
/// 2. Whitespace runs collapse to a single space, ends trimmed
/// 3. Every ASCII letter that begins a word is uppercased. A word begins at
///    the start of the string or after any character outside `[A-Za-z0-9_]`,
///    so "hellofresh.com" becomes "Hellofresh.Com".
///
/// Characters that are not word starts are left as they are.
pub fn humanize(value: &str) -> String {
    let spaced: String = value
        .split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    let mut prev_is_word = false;
    for c in collapsed.chars() {
        if !prev_is_word && c.is_ascii_alphabetic() {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = c.is_ascii_alphanumeric() || c == '_';
    }
    out
}
