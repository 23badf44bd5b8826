//! Exact JSON encoding of monetary [Decimal] values.
//!
//! Amounts are written as JSON number literals carrying every stored digit,
//! e.g. `12345678901234567.25`, instead of being rounded through `f64`.
//! On input both a JSON number and a string holding a decimal are accepted,
//! and the literal text is parsed directly so no digits are lost either way.
//!
//! Use with `#[serde(with = "crate::decimal_format")]` for [Decimal] fields,
//! `#[serde(deserialize_with = "crate::decimal_format::option::deserialize", default)]`
//! for `Option<Decimal>` fields and
//! `#[serde(deserialize_with = "crate::decimal_format::patch::deserialize", default)]`
//! for [crate::patch::Patch] fields.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// Parse a decimal from the raw JSON text of a number or a string.
fn parse_raw(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();

    let text = if raw.starts_with('"') {
        serde_json::from_str::<String>(raw).map_err(|error| error.to_string())?
    } else {
        raw.to_owned()
    };
    let text = text.trim();

    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    }
    .map_err(|_| format!("invalid decimal amount {raw}"))
}

pub fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let literal = RawValue::from_string(amount.to_string()).map_err(serde::ser::Error::custom)?;
    literal.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    parse_raw(raw.get()).map_err(serde::de::Error::custom)
}

pub mod option {
    //! Optional amounts, `null` or a missing key maps to `None`.

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::value::RawValue;

    use super::parse_raw;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Box<RawValue>>::deserialize(deserializer)?
            .map(|raw| parse_raw(raw.get()).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub mod patch {
    //! Amounts in partial updates, `null` maps to [Patch::Null].

    use rust_decimal::Decimal;
    use serde::Deserializer;

    use crate::patch::Patch;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Patch<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::option::deserialize(deserializer).map(|amount| match amount {
            Some(amount) => Patch::Value(amount),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde::{Deserialize, Serialize};

    use crate::patch::Patch;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "crate::decimal_format")]
        amount: Decimal,
    }

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(deserialize_with = "crate::decimal_format::option::deserialize", default)]
        amount: Option<Decimal>,
        #[serde(deserialize_with = "crate::decimal_format::patch::deserialize", default)]
        change: Patch<Decimal>,
    }

    #[test]
    fn serializes_every_digit() {
        let priced = Priced {
            amount: dec!(12345678901234567.25),
        };

        let json = serde_json::to_string(&priced).unwrap();

        assert_eq!(json, r#"{"amount":12345678901234567.25}"#);
    }

    #[test]
    fn keeps_trailing_zeros() {
        let json = serde_json::to_string(&Priced { amount: dec!(40.50) }).unwrap();

        assert_eq!(json, r#"{"amount":40.50}"#);
    }

    #[test]
    fn parses_long_number_literal_exactly() {
        let priced: Priced = serde_json::from_str(r#"{"amount": 12345678901234567.25}"#).unwrap();

        assert_eq!(priced.amount, dec!(12345678901234567.25));
    }

    #[test]
    fn parses_decimal_string() {
        let priced: Priced = serde_json::from_str(r#"{"amount": " 0.10 "}"#).unwrap();

        assert_eq!(priced.amount, dec!(0.10));
    }

    #[test]
    fn parses_exponent() {
        let priced: Priced = serde_json::from_str(r#"{"amount": 5e3}"#).unwrap();

        assert_eq!(priced.amount, dec!(5000));
    }

    #[test]
    fn rejects_non_numbers() {
        assert!(serde_json::from_str::<Priced>(r#"{"amount": "lots"}"#).is_err());
        assert!(serde_json::from_str::<Priced>(r#"{"amount": true}"#).is_err());
    }

    #[test]
    fn optional_and_patch_amounts() {
        let missing: Update = serde_json::from_str("{}").unwrap();
        let null: Update = serde_json::from_str(r#"{"amount": null, "change": null}"#).unwrap();
        let given: Update = serde_json::from_str(r#"{"amount": 1.5, "change": "2"}"#).unwrap();

        assert_eq!(missing.amount, None);
        assert_eq!(missing.change, Patch::Missing);
        assert_eq!(null.amount, None);
        assert_eq!(null.change, Patch::Null);
        assert_eq!(given.amount, Some(dec!(1.5)));
        assert_eq!(given.change, Patch::Value(dec!(2)));
    }
}
