//! Store-name aliases shared by the search results and the store directory.
//!
//! Search hits and the store directory spell a few London stores
//! differently. Both sides rewrite names containing a known long form to the
//! same short canonical name so directory lookups line up.

/// `(substring of the long store name, canonical alias)` pairs.
pub const STORE_ALIASES: &[(&str, &str)] = &[
    ("Tottenham Crt Rd", "London W1 TCR"),
    ("Rathbone Place", "London W1 Rathbone"),
];

/// Returns the canonical alias for `name`, or `None` when no alias applies.
#[must_use]
pub fn canonical_store_name(name: &str) -> Option<&'static str> {
    STORE_ALIASES
        .iter()
        .find(|(long_form, _)| name.contains(long_form))
        .map(|(_, alias)| *alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_known_long_forms() {
        assert_eq!(
            canonical_store_name("London - W1 Rathbone Place"),
            Some("London W1 Rathbone")
        );
        assert_eq!(
            canonical_store_name("London W1 Tottenham Crt Rd"),
            Some("London W1 TCR")
        );
    }

    #[test]
    fn leaves_other_names_alone() {
        assert_eq!(canonical_store_name("Walthamstow"), None);
        assert_eq!(canonical_store_name(""), None);
    }
}
