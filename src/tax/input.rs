use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use schemars::gen::SchemaGenerator;
use schemars::schema::{Schema, SchemaObject};
use schemars::JsonSchema;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::credits::DependentCount;
use crate::money::max_amount;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("unknown bonus type '{0}' (expected christmas, easter or summer)")]
    UnknownBonusType(String),
    #[error("unknown employment category '{0}'")]
    UnknownCategory(String),
    #[error("unknown profession '{0}'")]
    UnknownProfession(String),
    #[error("unknown gift category '{0}' (expected A, B or C)")]
    UnknownGiftCategory(String),
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Parse a calendar date, accepting a plain ISO-8601 date or a full timestamp.
pub fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(InputError::InvalidDate(s.to_string()))
}

fn capped(amount: Decimal) -> Decimal {
    let max = max_amount();
    amount.clamp(-max, max)
}

/// Parse a money amount from user text. Anything unparseable is zero, and the magnitude
/// is capped at [`max_amount`].
pub fn parse_amount(s: &str) -> Decimal {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '€' | '_') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(capped)
        .unwrap_or_else(|_| {
            log::debug!("unparseable amount {:?}, using 0", s);
            Decimal::ZERO
        })
}

/// A numeric request field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Whole, non-negative count, e.g. an age or a number of payments.
    pub fn as_count(self) -> Option<u32> {
        self.0.trunc().to_u32()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl FromStr for Amount {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Amount(parse_amount(s)))
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount(parse_amount(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(capped(Decimal::from(v))))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(capped(Decimal::from(v))))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        let max = max_amount();
        if max.to_f64().is_some_and(|limit| v.abs() > limit) {
            return Ok(Amount(if v < 0.0 { -max } else { max }));
        }
        // shortest round-trip text keeps 0.1 as 0.1
        Ok(Amount(parse_amount(&v.to_string())))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Amount, E> {
        Ok(Amount::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::default())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl JsonSchema for Amount {
    fn schema_name() -> String {
        "Amount".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = SchemaObject::default();
        schema.subschemas().any_of = Some(vec![
            gen.subschema_for::<f64>(),
            gen.subschema_for::<String>(),
        ]);
        schema.metadata().description =
            Some("Number, or numeric string; unparseable values count as 0".to_string());
        Schema::Object(schema)
    }
}

struct DependentsVisitor;

impl<'de> Visitor<'de> for DependentsVisitor {
    type Value = DependentCount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a dependent count such as 2 or \"4+\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DependentCount, E> {
        Ok(DependentCount::parse_lenient(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DependentCount, E> {
        Ok(DependentCount(u32::try_from(v).unwrap_or(u32::MAX)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DependentCount, E> {
        Ok(DependentCount(u32::try_from(v).unwrap_or_default()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DependentCount, E> {
        Ok(Amount(parse_amount(&v.to_string()))
            .as_count()
            .map(DependentCount)
            .unwrap_or_default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<DependentCount, E> {
        Ok(DependentCount::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<DependentCount, E> {
        Ok(DependentCount::default())
    }
}

/// `deserialize_with` helper for dependent counts given as `"0".."4+"` or a number.
pub fn deserialize_dependents<'de, D>(deserializer: D) -> Result<DependentCount, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DependentsVisitor)
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        Ok(matches!(
            v.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "on"
        ))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

/// `deserialize_with` helper for flags sent as booleans, "yes"/"no" or 0/1.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Record {
        amount: Amount,
        #[serde(deserialize_with = "deserialize_dependents")]
        children: DependentCount,
        #[serde(deserialize_with = "deserialize_flag")]
        flag: bool,
    }

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn amounts_from_numbers_and_strings() {
        assert_eq!(parse_amount("1500"), dec!(1500));
        assert_eq!(parse_amount(" €1 500.50 "), dec!(1500.50));
        assert_eq!(parse_amount("1_000"), dec!(1000));
        assert_eq!(parse_amount("1e3"), dec!(1000));
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn huge_amounts_are_capped() {
        assert_eq!(parse_amount("1e28"), max_amount());
        assert_eq!(parse_amount("-1e28"), -max_amount());
        assert_eq!(parse_amount("99999999999999999999"), max_amount());

        let r = record(r#"{"amount": 1e40, "children": 0, "flag": false}"#);
        assert_eq!(r.amount, Amount(max_amount()));
        let r = record(r#"{"amount": 18446744073709551615, "children": 0, "flag": false}"#);
        assert_eq!(r.amount, Amount(max_amount()));
    }

    #[test]
    fn lenient_record_fields() {
        let r = record(r#"{"amount": "1200.5", "children": "4+", "flag": true}"#);
        assert_eq!(r.amount, Amount(dec!(1200.5)));
        assert_eq!(r.children, DependentCount(4));
        assert!(r.flag);

        let r = record(r#"{"amount": 0.1, "children": 2, "flag": "no"}"#);
        assert_eq!(r.amount, Amount(dec!(0.1)));
        assert_eq!(r.children, DependentCount(2));
        assert!(!r.flag);

        let r = record(r#"{"amount": "n/a", "children": "lots", "flag": null}"#);
        assert_eq!(r.amount, Amount::default());
        assert_eq!(r.children, DependentCount(0));
        assert!(!r.flag);
    }

    #[test]
    fn amount_counts() {
        assert_eq!(Amount(dec!(14)).as_count(), Some(14));
        assert_eq!(Amount(dec!(31.9)).as_count(), Some(31));
        assert_eq!(Amount(dec!(-1)).as_count(), None);
    }

    #[test]
    fn parses_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(parse_date("2025-03-01"), Ok(expected));
        assert_eq!(parse_date("2025-03-01T00:00:00.000Z"), Ok(expected));
        assert_eq!(parse_date("2025-03-01T09:30:00"), Ok(expected));
        assert_eq!(
            parse_date("01/03/2025"),
            Err(InputError::InvalidDate("01/03/2025".to_string()))
        );
    }
}
