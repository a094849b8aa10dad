//! Parameter normalization: turning user-facing field values into the query
//! and body payloads the OneTap API expects.
//!
//! Everything here is a pure function of its input, so building the same
//! request twice yields an identical payload.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use client::Payload;
use serde_json::{Number, Value};

use crate::ParamError;

/// Per-call normalization rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rules<'a> {
    /// Keys holding comma-separated ID lists, sent as arrays.
    pub id_lists: &'a [&'a str],
    /// Keys holding a `{ coordinates: { lat, lng } }` selection.
    pub locations: &'a [&'a str],
    /// Convert every key containing `Date` to epoch seconds.
    pub dates: bool,
    /// Reduce a `customFields` repeating group to a flat map.
    pub custom_fields: bool,
}

/// `null` and `""` count as "not set".  `false` and `0` are values.
pub fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Copy `fields` without its unset values.
pub fn compact(fields: &Payload) -> Payload {
    fields
        .iter()
        .filter(|(_, value)| !is_unset(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn is_date_key(key: &str) -> bool {
    key.contains("Date")
}

/// Copy the set values of `fields`, applying `rules` key by key.
pub fn normalize(fields: &Payload, rules: &Rules<'_>) -> Result<Payload, ParamError> {
    let mut out = Payload::new();

    for (key, value) in &compact(fields) {
        if rules.locations.contains(&key.as_str()) {
            if let Some(coords) = coordinates(value) {
                out.insert(key.clone(), coords);
            }
            continue;
        }

        if rules.custom_fields && key == "customFields" {
            let flat = custom_fields(value)?;
            if !flat.is_empty() {
                out.insert(key.clone(), Value::Object(flat));
            }
            continue;
        }

        if rules.id_lists.contains(&key.as_str()) {
            if let Value::String(raw) = value {
                let ids = split_ids(raw);
                if !ids.is_empty() {
                    out.insert(key.clone(), Value::Array(ids));
                }
                continue;
            }
        }

        if rules.dates && is_date_key(key) {
            out.insert(key.clone(), epoch_seconds(key, value)?.into());
            continue;
        }

        out.insert(key.clone(), value.clone());
    }

    Ok(out)
}

/// Insert `value` under `key` unless it is unset.
pub fn insert_set(payload: &mut Payload, key: &str, value: impl Into<Value>) {
    let value = value.into();
    if !is_unset(&value) {
        payload.insert(key.to_owned(), value);
    }
}

/// `"a, b ,c"` -> `["a", "b", "c"]`; blank entries are dropped.
pub fn split_ids(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Value::String(id.to_owned()))
        .collect()
}

/// The `{ lat, lng }` object of a location selection, if one was made.
pub fn coordinates(value: &Value) -> Option<Value> {
    value
        .get("coordinates")
        .filter(|c| c.is_object())
        .cloned()
}

/// Seconds since the epoch for a date parameter.
///
/// Strings may be RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a
/// bare `YYYY-MM-DD`.  Numbers are milliseconds.
pub fn epoch_seconds(key: &str, value: &Value) -> Result<i64, ParamError> {
    let invalid = || ParamError::InvalidDate {
        key: key.to_owned(),
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|ms| (ms / 1000.0).floor() as i64)
            .ok_or_else(invalid),
        Value::String(s) => parse_date(s).map(|dt| dt.timestamp()).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ---------------------------------------------------------------------------
// Custom fields
// ---------------------------------------------------------------------------

/// Reduce `{ customField: [{ name, type, value }, ..] }` to `{ name: value }`.
///
/// Entries without a name or with an unset value are skipped.
pub fn custom_fields(group: &Value) -> Result<Payload, ParamError> {
    let mut flat = Payload::new();

    let Some(entries) = group.get("customField").and_then(Value::as_array) else {
        return Ok(flat);
    };

    for entry in entries {
        let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
        let value = entry.get("value").unwrap_or(&Value::Null);
        if name.is_empty() || is_unset(value) {
            continue;
        }
        let kind = entry.get("type").and_then(Value::as_str).unwrap_or("string");
        flat.insert(name.to_owned(), coerce(name, kind, value)?);
    }

    Ok(flat)
}

/// Coerce a custom field value by its declared type tag.
pub fn coerce(name: &str, kind: &str, value: &Value) -> Result<Value, ParamError> {
    Ok(match kind {
        "number" => match value {
            Value::Number(_) => value.clone(),
            Value::String(s) => s.trim().parse::<f64>().map_or(Value::Null, number),
            _ => Value::Null,
        },
        "boolean" => Value::Bool(match value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true" || s == "1",
            Value::Number(n) => n.as_f64() == Some(1.0),
            _ => false,
        }),
        "array" => match value {
            Value::String(s) => {
                serde_json::from_str(s).unwrap_or_else(|_| Value::Array(split_trimmed(s)))
            }
            other => other.clone(),
        },
        "date" => epoch_seconds(name, value)?.into(),
        _ => value.clone(),
    })
}

fn split_trimmed(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(|part| Value::String(part.trim().to_owned()))
        .collect()
}

/// Integral floats stay integers so `"5"` becomes `5`, not `5.0`.
fn number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> Payload {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn numeric_custom_field_is_a_number() {
        let fields = payload(json!({
            "customFields": { "customField": [{ "name": "age", "type": "number", "value": "5" }] }
        }));
        let out = normalize(&fields, &Rules { custom_fields: true, ..Rules::default() }).unwrap();

        assert_eq!(out["customFields"]["age"], json!(5));
        assert!(out["customFields"]["age"].is_number());
    }

    #[test]
    fn custom_field_types_are_coerced() {
        let group = json!({ "customField": [
            { "name": "ratio", "type": "number", "value": "2.5" },
            { "name": "bad", "type": "number", "value": "abc" },
            { "name": "vip", "type": "boolean", "value": "1" },
            { "name": "opt", "type": "boolean", "value": "yes" },
            { "name": "tags", "type": "array", "value": "[\"x\",\"y\"]" },
            { "name": "loose", "type": "array", "value": "x, y" },
            { "name": "joined", "type": "date", "value": "2024-01-01" },
            { "name": "note", "value": "hi" },
            { "name": "", "type": "string", "value": "orphan" },
            { "name": "blank", "type": "string", "value": "" }
        ]});
        let flat = custom_fields(&group).unwrap();

        assert_eq!(flat["ratio"], json!(2.5));
        assert_eq!(flat["bad"], Value::Null);
        assert_eq!(flat["vip"], json!(true));
        assert_eq!(flat["opt"], json!(false));
        assert_eq!(flat["tags"], json!(["x", "y"]));
        assert_eq!(flat["loose"], json!(["x", "y"]));
        assert_eq!(flat["joined"], json!(1_704_067_200));
        assert_eq!(flat["note"], json!("hi"));
        assert!(!flat.contains_key(""));
        assert!(!flat.contains_key("blank"));
    }

    #[test]
    fn empty_custom_field_group_is_omitted() {
        let fields = payload(json!({ "name": "Ann", "customFields": { "customField": [] } }));
        let out = normalize(&fields, &Rules { custom_fields: true, ..Rules::default() }).unwrap();
        assert!(!out.contains_key("customFields"));
    }

    #[test]
    fn dates_become_epoch_seconds() {
        assert_eq!(
            epoch_seconds("checkInDate", &json!("2024-01-01T00:00:00Z")).unwrap(),
            1_704_067_200
        );
        assert_eq!(
            epoch_seconds("checkInDate", &json!("2024-01-01T01:00:00+01:00")).unwrap(),
            1_704_067_200
        );
        assert_eq!(epoch_seconds("d", &json!("2024-01-01T00:00:00.999")).unwrap(), 1_704_067_200);
        assert_eq!(epoch_seconds("d", &json!(1_704_067_200_999_i64)).unwrap(), 1_704_067_200);
        assert!(matches!(
            epoch_seconds("d", &json!("yesterday")),
            Err(ParamError::InvalidDate { .. })
        ));
    }

    #[test]
    fn date_keys_are_converted_only_when_enabled() {
        let fields = payload(json!({ "gtCheckInDate": "2024-01-01T00:00:00Z", "source": "kiosk" }));

        let converted = normalize(&fields, &Rules { dates: true, ..Rules::default() }).unwrap();
        assert_eq!(converted["gtCheckInDate"], json!(1_704_067_200));
        assert_eq!(converted["source"], json!("kiosk"));

        let untouched = normalize(&fields, &Rules::default()).unwrap();
        assert_eq!(untouched["gtCheckInDate"], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn id_lists_are_split_and_trimmed() {
        assert_eq!(split_ids("a, b ,c"), vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(split_ids(" a,, b ,"), vec![json!("a"), json!("b")]);

        let fields = payload(json!({ "listIds": "a, b ,c", "profileIds": " , " }));
        let out = normalize(
            &fields,
            &Rules { id_lists: &["listIds", "profileIds"], ..Rules::default() },
        )
        .unwrap();
        assert_eq!(out["listIds"], json!(["a", "b", "c"]));
        assert!(!out.contains_key("profileIds"));
    }

    #[test]
    fn coordinates_replace_location_or_drop_it() {
        let fields = payload(json!({
            "location": { "coordinates": { "lat": 1.5, "lng": -2.0 } },
            "checkOutLocation": {}
        }));
        let out = normalize(
            &fields,
            &Rules { locations: &["location", "checkOutLocation"], ..Rules::default() },
        )
        .unwrap();

        assert_eq!(out["location"], json!({ "lat": 1.5, "lng": -2.0 }));
        assert!(!out.contains_key("checkOutLocation"));
    }

    #[test]
    fn unset_values_are_dropped_but_false_is_kept() {
        let fields = payload(json!({
            "notes": "",
            "source": null,
            "checkedIn": false,
            "limit": 0,
            "method": "QR"
        }));
        let out = normalize(&fields, &Rules::default()).unwrap();

        assert_eq!(
            Value::Object(out),
            json!({ "checkedIn": false, "limit": 0, "method": "QR" })
        );
        assert_eq!(compact(&fields).len(), 3);
    }

    #[test]
    fn normalization_is_deterministic() {
        let fields = payload(json!({
            "listIds": "b, a",
            "checkInDate": "2024-03-05T10:00:00Z",
            "location": { "coordinates": { "lat": 1, "lng": 2 } },
            "customFields": { "customField": [{ "name": "n", "type": "number", "value": "7" }] }
        }));
        let rules = Rules {
            id_lists: &["listIds"],
            locations: &["location"],
            dates: true,
            custom_fields: true,
        };

        let first = serde_json::to_string(&normalize(&fields, &rules).unwrap()).unwrap();
        let second = serde_json::to_string(&normalize(&fields, &rules).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
