//! Scalar coercion
//!
//! Raw path/query/header values arrive as JSON strings; body values arrive as
//! whatever JSON the client sent. Both go through the same rules:
//!
//! - int: integral numbers, floats with zero fraction, decimal strings
//! - float: any finite number, numeric strings
//! - bool: booleans, 0/1, and the usual textual spellings
//! - datetime: RFC 3339 strings (naive timestamps read as UTC), unix seconds
//! - uuid, url, email, enum: strings that parse as such
//! - string: strings only

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use super::value::BoundValue;
use crate::schema::FieldType;

/// Coerces a scalar value. Returns `None` when the value does not fit the type
/// or when `field_type` is not a scalar type.
pub(crate) fn coerce_scalar(value: &Value, field_type: &FieldType) -> Option<BoundValue> {
    match field_type {
        FieldType::String => value.as_str().map(|s| BoundValue::Str(s.to_string())),
        FieldType::Int => coerce_int(value).map(BoundValue::Int),
        FieldType::Float => coerce_float(value).map(BoundValue::Float),
        FieldType::Bool => coerce_bool(value).map(BoundValue::Bool),
        FieldType::Datetime => coerce_datetime(value),
        FieldType::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(BoundValue::Uuid),
        FieldType::Url => value
            .as_str()
            .filter(|s| is_http_url(s))
            .map(|s| BoundValue::Str(s.to_string())),
        FieldType::Email => value
            .as_str()
            .filter(|s| email_regex().is_match(s))
            .map(|s| BoundValue::Str(s.to_string())),
        FieldType::Enum { variants } => value
            .as_str()
            .filter(|s| variants.iter().any(|v| v == s))
            .map(|s| BoundValue::Str(s.to_string())),
        FieldType::Any => Some(BoundValue::Raw(value.clone())),
        FieldType::Object { .. }
        | FieldType::Sequence { .. }
        | FieldType::Set { .. }
        | FieldType::Mapping { .. } => None,
    }
}

/// Canonical string form of a coerced mapping key.
pub(crate) fn key_string(key: &BoundValue) -> String {
    match key {
        BoundValue::Str(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_datetime(value: &Value) -> Option<BoundValue> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(BoundValue::DateTime(dt));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| BoundValue::DateTime(Utc.from_utc_datetime(&naive).fixed_offset()))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|dt| BoundValue::DateTime(dt.fixed_offset())),
        _ => None,
    }
}

fn is_http_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_coercion() {
        assert_eq!(coerce_scalar(&json!(5), &FieldType::Int), Some(BoundValue::Int(5)));
        assert_eq!(coerce_scalar(&json!("42"), &FieldType::Int), Some(BoundValue::Int(42)));
        assert_eq!(coerce_scalar(&json!(3.0), &FieldType::Int), Some(BoundValue::Int(3)));
        assert_eq!(coerce_scalar(&json!(3.5), &FieldType::Int), None);
        assert_eq!(coerce_scalar(&json!("foo"), &FieldType::Int), None);
        assert_eq!(coerce_scalar(&json!(true), &FieldType::Int), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(coerce_scalar(&json!(62), &FieldType::Float), Some(BoundValue::Float(62.0)));
        assert_eq!(coerce_scalar(&json!("10.5"), &FieldType::Float), Some(BoundValue::Float(10.5)));
        assert_eq!(coerce_scalar(&json!("NaN"), &FieldType::Float), None);
        assert_eq!(coerce_scalar(&json!("inf"), &FieldType::Float), None);
    }

    #[test]
    fn test_bool_coercion() {
        for raw in ["true", "1", "yes", "on", "True"] {
            assert_eq!(coerce_scalar(&json!(raw), &FieldType::Bool), Some(BoundValue::Bool(true)));
        }
        for raw in ["false", "0", "no", "off"] {
            assert_eq!(coerce_scalar(&json!(raw), &FieldType::Bool), Some(BoundValue::Bool(false)));
        }
        assert_eq!(coerce_scalar(&json!("maybe"), &FieldType::Bool), None);
        assert_eq!(coerce_scalar(&json!(2), &FieldType::Bool), None);
    }

    #[test]
    fn test_string_is_strict() {
        assert_eq!(coerce_scalar(&json!(123), &FieldType::String), None);
        assert_eq!(
            coerce_scalar(&json!("Foo"), &FieldType::String),
            Some(BoundValue::Str("Foo".into()))
        );
    }

    #[test]
    fn test_enum_coercion() {
        let model = FieldType::enumeration(["alexnet", "resnet", "lenet"]);
        assert_eq!(coerce_scalar(&json!("lenet"), &model), Some(BoundValue::Str("lenet".into())));
        assert_eq!(coerce_scalar(&json!("vgg"), &model), None);
    }

    #[test]
    fn test_datetime_coercion() {
        let dt = coerce_scalar(&json!("2020-05-01T10:00:00+02:00"), &FieldType::Datetime).unwrap();
        assert_eq!(dt.to_json(), json!("2020-05-01T10:00:00+02:00"));

        let naive = coerce_scalar(&json!("2020-05-01T10:00:00"), &FieldType::Datetime).unwrap();
        assert_eq!(naive.to_json(), json!("2020-05-01T10:00:00Z"));

        let epoch = coerce_scalar(&json!(0), &FieldType::Datetime).unwrap();
        assert_eq!(epoch.to_json(), json!("1970-01-01T00:00:00Z"));

        assert_eq!(coerce_scalar(&json!("yesterday"), &FieldType::Datetime), None);
    }

    #[test]
    fn test_url_coercion() {
        assert!(coerce_scalar(&json!("http://example.com/a.png"), &FieldType::Url).is_some());
        assert!(coerce_scalar(&json!("asd"), &FieldType::Url).is_none());
        assert!(coerce_scalar(&json!("ftp://example.com"), &FieldType::Url).is_none());
    }

    #[test]
    fn test_email_coercion() {
        assert!(coerce_scalar(&json!("jane@example.com"), &FieldType::Email).is_some());
        assert!(coerce_scalar(&json!("jane.example.com"), &FieldType::Email).is_none());
        assert!(coerce_scalar(&json!("jane@localhost"), &FieldType::Email).is_none());
    }

    #[test]
    fn test_uuid_coercion() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(
            coerce_scalar(&json!(id), &FieldType::Uuid).unwrap().to_json(),
            json!(id)
        );
        assert!(coerce_scalar(&json!("not-a-uuid"), &FieldType::Uuid).is_none());
    }

    #[test]
    fn test_collections_are_not_scalars() {
        assert!(coerce_scalar(&json!([1]), &FieldType::sequence(FieldType::Int)).is_none());
    }

    #[test]
    fn test_key_string() {
        assert_eq!(key_string(&BoundValue::Int(3)), "3");
        assert_eq!(key_string(&BoundValue::Str("a".into())), "a");
    }
}
