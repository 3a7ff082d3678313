//! Raw user input and the parsing rules applied to it.
//!
//! Number lists are parsed leniently: tokens that are not numbers are dropped,
//! but a list that ends up empty is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StatError, StatResult};

/// Raw strings keyed by input step id. Nothing is coerced at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputValues(BTreeMap<String, String>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(id, raw);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.0.insert(id.into(), raw.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Raw value for `id`, treating blank strings as not provided.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0
            .get(id)
            .map(String::as_str)
            .filter(|raw| !raw.trim().is_empty())
    }

    pub fn is_provided(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn require(&self, id: &str) -> StatResult<&str> {
        self.get(id)
            .ok_or_else(|| StatError::validation(format!("missing input: {id}")))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// The whole token must be a number; `10kg` is not.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a delimited list of numbers.
///
/// Tokens are separated by any run of whitespace or commas. Tokens that do not
/// parse as finite numbers are skipped; an empty result is an error.
pub fn parse_number_list(raw: &str) -> StatResult<Vec<f64>> {
    let values: Vec<f64> = tokens(raw).filter_map(parse_finite).collect();
    if values.is_empty() {
        return Err(StatError::validation("no valid numbers supplied"));
    }
    Ok(values)
}

/// Number of tokens in `raw` that [`parse_number_list`] would keep.
pub fn count_valid_numbers(raw: &str) -> usize {
    tokens(raw).filter_map(parse_finite).count()
}

pub(crate) fn parse_number(id: &str, raw: &str) -> StatResult<f64> {
    parse_finite(raw.trim())
        .ok_or_else(|| StatError::validation(format!("'{}' is not a valid number for {id}", raw.trim())))
}

/// Largest integer an `f64` holds exactly (2^53).
const MAX_SAMPLE_SIZE: f64 = 9_007_199_254_740_992.0;

/// Sample sizes must be whole numbers of at least one.
pub(crate) fn parse_sample_size(id: &str, raw: &str) -> StatResult<u64> {
    let n = parse_number(id, raw)?;
    if n < 1.0 || n.fract() != 0.0 {
        return Err(StatError::validation(format!(
            "{id} must be a positive whole number, got {n}"
        )));
    }
    if n > MAX_SAMPLE_SIZE {
        return Err(StatError::validation(format!(
            "{id} is too large, got {n}"
        )));
    }
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_parse_drops_invalid_tokens() {
        let values = parse_number_list("1, 2, abc, 3").unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_tokens_with_units_are_dropped() {
        assert_eq!(parse_number_list("10kg, 20").unwrap(), vec![20.0]);
        assert_eq!(count_valid_numbers("10kg 20kg 30"), 1);
    }

    #[test]
    fn test_all_invalid_tokens_is_error() {
        let err = parse_number_list("abc, def").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "no valid numbers supplied");
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse_number_list("").unwrap_err().is_validation());
        assert!(parse_number_list(" ,\t, \n").unwrap_err().is_validation());
    }

    #[test]
    fn test_mixed_delimiters() {
        let values = parse_number_list("10\t20\n30,,40  50").unwrap();
        assert_eq!(values, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_negative_and_decimal_tokens() {
        let values = parse_number_list("-1.5, 2e2, .25").unwrap();
        assert_eq!(values, vec![-1.5, 200.0, 0.25]);
    }

    #[test]
    fn test_non_finite_tokens_dropped() {
        let values = parse_number_list("NaN, inf, 4").unwrap();
        assert_eq!(values, vec![4.0]);
        assert!(parse_number_list("nan infinity").is_err());
    }

    #[test]
    fn test_count_valid_numbers() {
        assert_eq!(count_valid_numbers("1, 2, abc, 3"), 3);
        assert_eq!(count_valid_numbers("x y"), 0);
    }

    #[test]
    fn test_blank_input_counts_as_missing() {
        let inputs = InputValues::new().with("mean", "   ").with("n", "5");
        assert!(!inputs.is_provided("mean"));
        assert!(inputs.is_provided("n"));
        assert!(inputs.require("mean").unwrap_err().is_validation());
        assert!(inputs.require("absent").is_err());
    }

    #[test]
    fn test_parse_number_trims() {
        assert_eq!(parse_number("mean", " 75.5 ").unwrap(), 75.5);
        assert!(parse_number("mean", "12abc").is_err());
    }

    #[test]
    fn test_parse_sample_size() {
        assert_eq!(parse_sample_size("sampleSize", "25").unwrap(), 25);
        assert_eq!(parse_sample_size("sampleSize", "25.0").unwrap(), 25);
        assert!(parse_sample_size("sampleSize", "2.5").is_err());
        assert!(parse_sample_size("sampleSize", "0").is_err());
        assert!(parse_sample_size("sampleSize", "-3").is_err());
    }

    #[test]
    fn test_sample_size_too_large() {
        assert_eq!(
            parse_sample_size("sampleSize", "9007199254740992").unwrap(),
            9_007_199_254_740_992
        );
        let err = parse_sample_size("sampleSize", "1e20").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("sampleSize is too large"));
    }
}
