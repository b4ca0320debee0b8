//! Validation and splitting of free-text query input.

use thiserror::Error;

/// Separator for packing several query terms into one input string.
pub const QUERY_SPLIT_CHAR: char = ';';

/// Minimum length of a single query term, in characters.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryInputError {
    #[error("each query needs to be at least {MIN_QUERY_LEN} characters in length")]
    TooShort,
}

/// Splits each raw input on [`QUERY_SPLIT_CHAR`], trims the parts and
/// returns them in input order.
///
/// # Errors
///
/// Returns [`QueryInputError::TooShort`] when there is no input at all or
/// when any trimmed part is shorter than [`MIN_QUERY_LEN`] characters.
pub fn check_queries<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, QueryInputError> {
    if inputs.is_empty() {
        return Err(QueryInputError::TooShort);
    }
    let mut queries = Vec::new();
    for input in inputs {
        for part in input.as_ref().split(QUERY_SPLIT_CHAR) {
            let part = part.trim();
            if part.chars().count() < MIN_QUERY_LEN {
                return Err(QueryInputError::TooShort);
            }
            queries.push(part.to_string());
        }
    }
    Ok(queries)
}
