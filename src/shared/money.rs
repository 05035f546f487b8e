//! Fixed-point money helpers.
//!
//! Amounts are `rust_decimal::Decimal` values carried at exactly two
//! fractional digits, so sums never pick up floating-point drift and render as
//! `"D.DD"` strings.

use rust_decimal::Decimal;
use serde::Serializer;

use crate::shared::constants::AMOUNT_DECIMAL_PLACES;

/// Rescale to two fractional digits ("0" becomes "0.00", "42.5" becomes "42.50")
pub fn to_money(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(AMOUNT_DECIMAL_PLACES);
    value
}

/// Serialize a decimal as a fixed two-decimal string
pub fn serialize_money<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_money(*value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_to_money_pads_scale() {
        assert_eq!(to_money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(to_money(Decimal::from_str("42.5").unwrap()).to_string(), "42.50");
        assert_eq!(to_money(Decimal::from_str("-42.5").unwrap()).to_string(), "-42.50");
    }

    #[test]
    fn test_serialize_money() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_money")]
            value: Decimal,
        }

        let json = serde_json::to_string(&Wrapper {
            value: Decimal::new(5, 0),
        })
        .unwrap();
        assert_eq!(json, r#"{"value":"5.00"}"#);
    }
}
