//! Derived-field computation
//!
//! `try_derive_at` enumerates every failure as a `DerivationError`;
//! `derive_value_at` folds all of them into the empty string so callers
//! always get something displayable.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::errors::{DerivationError, DerivationResult};
use crate::schema::{DerivationLogic, FieldConfig, ValueMap};
use crate::validation::{is_truthy, to_display_string};

/// Year the age calculation measures from
const EPOCH_YEAR: i32 = 1970;

/// Computes a derived field's value against the current wall clock.
pub fn derive_value(field: &FieldConfig, values: &ValueMap) -> Value {
    derive_value_at(field, values, Utc::now())
}

/// Computes a derived field's value as of `now`; any failure yields `""`.
pub fn derive_value_at(field: &FieldConfig, values: &ValueMap, now: DateTime<Utc>) -> Value {
    try_derive_at(field, values, now).unwrap_or_else(|_| blank())
}

/// Computes a derived field's value as of `now`, reporting why it failed.
pub fn try_derive_at(
    field: &FieldConfig,
    values: &ValueMap,
    now: DateTime<Utc>,
) -> DerivationResult<Value> {
    if !field.is_derived {
        return Err(DerivationError::NotDerived);
    }

    match &field.derivation_logic {
        DerivationLogic::None => Err(DerivationError::NoLogic),
        DerivationLogic::AgeFromDob => age_from_dob(field, values, now).map(Value::from),
        DerivationLogic::Unknown(name) => Err(DerivationError::UnknownLogic(name.clone())),
    }
}

/// Whole years between the first parent's date and `now`.
///
/// The millisecond delta is read back as an instant after the Unix epoch and
/// its calendar year is compared with 1970. This can be off by one around
/// birthdays because of leap days; callers rely on this exact behavior.
fn age_from_dob(field: &FieldConfig, values: &ValueMap, now: DateTime<Utc>) -> DerivationResult<i32> {
    let parent = field
        .parent_fields
        .first()
        .ok_or(DerivationError::MissingParent)?;

    let raw = values
        .get(parent)
        .filter(|v| is_truthy(v))
        .ok_or_else(|| DerivationError::EmptyParent(parent.clone()))?;

    let dob = parse_date(raw).ok_or_else(|| DerivationError::UnparseableDate {
        field: parent.clone(),
        value: to_display_string(raw),
    })?;

    let delta = now
        .timestamp_millis()
        .checked_sub(dob.timestamp_millis())
        .ok_or(DerivationError::OutOfRange)?;
    let elapsed = DateTime::<Utc>::from_timestamp_millis(delta).ok_or(DerivationError::OutOfRange)?;

    Ok((elapsed.year() - EPOCH_YEAR).abs())
}

/// Parses an entered date.
///
/// Accepts RFC 3339 timestamps, bare `YYYY-MM-DD` dates (midnight UTC),
/// zone-less date-times (read as UTC) and epoch milliseconds.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn blank() -> Value {
    Value::String(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn age_field() -> FieldConfig {
        FieldConfig::new("age", FieldType::Number, "Age")
            .with_derivation(vec!["dob".into()], DerivationLogic::AgeFromDob)
    }

    fn values(dob: Value) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("dob".into(), dob);
        map
    }

    #[test]
    fn test_age_from_iso_date() {
        let now = at(2024, 6, 15);
        let value = derive_value_at(&age_field(), &values(json!("1990-01-01")), now);
        assert_eq!(value, json!(34));
    }

    #[test]
    fn test_age_day_after_birthday() {
        let now = at(2024, 3, 2);
        let value = derive_value_at(&age_field(), &values(json!("2000-03-01")), now);
        assert_eq!(value, json!(24));
    }

    #[test]
    fn test_age_epoch_approximation_drifts_early() {
        // The real 54th birthday is March 1st; leap days in the span roll the
        // epoch-relative instant into 2024 a day early.
        let now = at(2024, 2, 29);
        let value = derive_value_at(&age_field(), &values(json!("1970-03-01")), now);
        assert_eq!(value, json!(54));
    }

    #[test]
    fn test_future_date_counts_from_epoch() {
        let now = at(2024, 1, 1);
        let value = derive_value_at(&age_field(), &values(json!("2024-06-01")), now);
        assert_eq!(value, json!(1));
    }

    #[test]
    fn test_epoch_millis_accepted() {
        let now = at(2024, 6, 15);
        let dob = at(2004, 1, 1).timestamp_millis();
        assert_eq!(derive_value_at(&age_field(), &values(json!(dob)), now), json!(20));
    }

    #[test]
    fn test_unparseable_date_yields_blank() {
        let now = at(2024, 6, 15);
        let field = age_field();
        let map = values(json!("not a date"));
        assert_eq!(derive_value_at(&field, &map, now), json!(""));
        assert!(matches!(
            try_derive_at(&field, &map, now),
            Err(DerivationError::UnparseableDate { .. })
        ));
    }

    #[test]
    fn test_missing_or_empty_parent_yields_blank() {
        let now = at(2024, 6, 15);
        let field = age_field();

        assert_eq!(
            try_derive_at(&field, &ValueMap::new(), now),
            Err(DerivationError::EmptyParent("dob".into()))
        );
        assert_eq!(derive_value_at(&field, &values(json!("")), now), json!(""));

        let orphan = FieldConfig::new("age", FieldType::Number, "Age")
            .with_derivation(Vec::new(), DerivationLogic::AgeFromDob);
        assert_eq!(
            try_derive_at(&orphan, &values(json!("1990-01-01")), now),
            Err(DerivationError::MissingParent)
        );
    }

    #[test]
    fn test_unknown_logic_yields_blank() {
        let now = at(2024, 6, 15);
        let field = FieldConfig::new("x", FieldType::Text, "X")
            .with_derivation(vec!["dob".into()], DerivationLogic::Unknown("bmi".into()));
        let map = values(json!("1990-01-01"));
        assert_eq!(derive_value_at(&field, &map, now), json!(""));
        assert_eq!(
            try_derive_at(&field, &map, now),
            Err(DerivationError::UnknownLogic("bmi".into()))
        );

        let none = FieldConfig::new("x", FieldType::Text, "X").with_derived(true);
        assert_eq!(try_derive_at(&none, &map, now), Err(DerivationError::NoLogic));
    }

    #[test]
    fn test_non_derived_field_yields_blank() {
        let field = FieldConfig::new("x", FieldType::Text, "X");
        assert_eq!(derive_value(&field, &values(json!("1990-01-01"))), json!(""));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(&json!("2000-02-29")), Some(at(2000, 2, 29)));
        assert_eq!(
            parse_date(&json!("2000-02-29T10:30:00Z")),
            Some(Utc.with_ymd_and_hms(2000, 2, 29, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date(&json!("2000-02-29T10:30")),
            Some(Utc.with_ymd_and_hms(2000, 2, 29, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_date(&json!("2001-02-29")), None);
        assert_eq!(parse_date(&json!(true)), None);
    }
}
