//! String escaping and fuzzy comparison for catalog lookups.
//!
//! Two services live here:
//! - [`escape_search_syntax`] makes user text safe to embed in a Lucene
//!   query sent to the catalog search endpoints.
//! - [`compare_string`] / [`compare_strings`] decide whether two names refer
//!   to the same thing, at two strictness levels.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Characters with meaning in the catalog's Lucene query syntax.
const SEARCH_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// Minimum similarity ratio for two comparison strings to match loosely.
const LOOSE_SIMILARITY: f64 = 0.9;

/// Prefix each search-syntax metacharacter with a backslash.
pub fn escape_search_syntax(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if SEARCH_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the normalized comparison form of a string.
///
/// Diacritics are stripped (NFKD, combining marks dropped), everything is
/// lower-cased, punctuation is removed and whitespace runs collapse to a
/// single space. `&` is spelled out so "Simon & Garfunkel" and
/// "Simon and Garfunkel" compare equal.
pub fn compare_string(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.replace('&', " and ").split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if cleaned.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&cleaned);
    }
    out
}

/// Compare two names at the given strictness.
///
/// Strict: case-folded, whitespace-collapsed text is equal, or the
/// comparison forms are equal. Loose additionally ignores a leading "the"
/// and accepts comparison forms whose similarity ratio reaches 0.9.
pub fn compare_strings(a: &str, b: &str, strict: bool) -> bool {
    if fold_case(a) == fold_case(b) {
        return true;
    }
    let (a, b) = (compare_string(a), compare_string(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if strict {
        return false;
    }

    let (a, b) = (strip_article(&a), strip_article(&b));
    a == b || strsim::normalized_levenshtein(a, b) >= LOOSE_SIMILARITY
}

fn fold_case(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strip_article(input: &str) -> &str {
    input.strip_prefix("the ").unwrap_or(input)
}
