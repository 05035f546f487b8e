use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::shared::constants::{AMOUNT_DECIMAL_PLACES, AMOUNT_MAX_DIGITS};

lazy_static! {
    /// Regex for validating usernames
    /// Letters, digits and the characters @ . + - _
    /// - Valid: "john_doe", "jane.doe", "user+1", "a@b"
    /// - Invalid: "john doe", "user!", "näme"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9@.+_-]+$").unwrap();
}

/// Deserialize a string with surrounding whitespace removed
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Deserialize an optional string with surrounding whitespace removed
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()))
}

/// Deserialize a patch field where `null` clears the value.
///
/// Pair with `#[serde(default)]`: an absent field stays `None`, `null`
/// becomes `Some(None)` and a string is trimmed into `Some(Some(..))`.
pub fn trimmed_patch<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    trimmed_opt(deserializer).map(Some)
}

/// Deserialize a query value, treating an empty one as absent
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let inner: StrDeserializer<'_, D::Error> = raw.into_deserializer();
            T::deserialize(inner).map(Some)
        }
    }
}

/// Transaction amounts: strictly positive, at most 2 decimal places and
/// 10 digits in total
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ValidationError::new("amount_not_positive")
            .with_message(Cow::Borrowed("Amount must be greater than zero.")));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    if scale > AMOUNT_DECIMAL_PLACES {
        return Err(ValidationError::new("amount_decimal_places").with_message(
            Cow::Owned(format!(
                "Ensure that there are no more than {} decimal places.",
                AMOUNT_DECIMAL_PLACES
            )),
        ));
    }

    let digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let whole_digits = digits.saturating_sub(scale);
    let max_whole_digits = AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES;
    if whole_digits > max_whole_digits {
        return Err(ValidationError::new("amount_max_digits").with_message(Cow::Owned(
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_whole_digits
            ),
        )));
    }

    Ok(())
}
