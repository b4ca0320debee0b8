//! Best-effort grouping key from a free-text listing title.
//!
//! Titles are not normalised upstream, so this is a handful of cleanup
//! rules rather than a parser. New product lines may need new rules.

use std::sync::LazyLock;

use regex::Regex;

/// `(pattern, replacement)` pairs applied in order.
static CLEANUP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // keep only what precedes the first "/"
        (r"(?i)^\s*(\w.*?)/.+", "${1}"),
        (r"(?i)thinkpad\s", ""),
        // "(Gen 3)", "Gen3", "gen 3" -> "Gen3"
        (r"(?i)\(*gen\s*([0-9]+)\)*", "Gen${1}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid model cleanup regex"),
            replacement,
        )
    })
    .collect()
});

/// Derives a coarse model name from a listing title.
///
/// If any cleanup rule changes the title the cleaned title is returned in
/// title case. Otherwise titles of three or more words are cut to their
/// first two words (title-cased), and shorter titles are returned as-is.
///
/// ```
/// use cexfind_search::extract_model;
///
/// assert_eq!(extract_model("Lenovo ThinkPad X390/i5-8265U/8GB/256GB SSD/B"), "Lenovo X390");
/// assert_eq!(extract_model("Terminator 2"), "Terminator 2");
/// ```
#[must_use]
pub fn extract_model(title: &str) -> String {
    let mut cleaned = title.to_string();
    for (pattern, replacement) in CLEANUP_RULES.iter() {
        cleaned = pattern.replace_all(&cleaned, *replacement).into_owned();
    }
    if cleaned != title {
        return title_case(&cleaned);
    }

    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() < 3 {
        return title.to_string();
    }
    title_case(&words[..2].join(" "))
}

/// Upper-cases the first letter of each word and lower-cases the rest.
/// A word starts after any character that is not a letter or digit.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}
