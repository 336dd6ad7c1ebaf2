//! Conversions between database values and JSON for dynamic attribute access

use sea_orm::sea_query::ColumnType;
use sea_orm::Value;
use serde_json::Value as Json;

/// Render a database value as JSON; SQL NULL of any type becomes `null`
pub fn to_json(value: &Value) -> Json {
    if is_null(value) {
        return Json::Null;
    }
    match value {
        Value::Bool(Some(b)) => Json::Bool(*b),
        Value::TinyInt(Some(i)) => Json::from(*i),
        Value::SmallInt(Some(i)) => Json::from(*i),
        Value::Int(Some(i)) => Json::from(*i),
        Value::BigInt(Some(i)) => Json::from(*i),
        Value::TinyUnsigned(Some(u)) => Json::from(*u),
        Value::SmallUnsigned(Some(u)) => Json::from(*u),
        Value::Unsigned(Some(u)) => Json::from(*u),
        Value::BigUnsigned(Some(u)) => Json::from(*u),
        Value::Float(Some(f)) => Json::from(f64::from(*f)),
        Value::Double(Some(f)) => Json::from(*f),
        Value::Char(Some(c)) => Json::String(c.to_string()),
        Value::String(Some(s)) => Json::String(s.to_string()),
        Value::Json(Some(j)) => Json::clone(j),
        Value::Bytes(Some(b)) => Json::from(b.to_vec()),
        Value::ChronoDate(Some(d)) => Json::String(d.to_string()),
        Value::ChronoTime(Some(t)) => Json::String(t.to_string()),
        Value::ChronoDateTime(Some(d)) => {
            Json::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
        Value::ChronoDateTimeUtc(Some(d)) => Json::String(d.to_rfc3339()),
        Value::ChronoDateTimeLocal(Some(d)) => Json::String(d.to_rfc3339()),
        Value::ChronoDateTimeWithTimeZone(Some(d)) => Json::String(d.to_rfc3339()),
        Value::Uuid(Some(u)) => Json::String(u.to_string()),
        Value::Decimal(Some(d)) => Json::String(d.to_string()),
        Value::BigDecimal(Some(d)) => Json::String(d.to_string()),
        Value::TimeDate(Some(d)) => Json::String(d.to_string()),
        Value::TimeTime(Some(t)) => Json::String(t.to_string()),
        Value::TimeDateTime(Some(d)) => Json::String(d.to_string()),
        Value::TimeDateTimeWithTimeZone(Some(d)) => Json::String(d.to_string()),
        other => Json::String(format!("{:?}", other)),
    }
}

/// SQL NULL, whatever the column type
pub fn is_null(value: &Value) -> bool {
    *value == value.as_null()
}

/// Presence in the `name?` sense: non-blank strings, non-zero numbers, `true`
pub fn is_present(value: &Value) -> bool {
    match to_json(value) {
        Json::Null => false,
        Json::Bool(b) => b,
        Json::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Json::String(s) => !s.trim().is_empty(),
        Json::Array(items) => !items.is_empty(),
        Json::Object(map) => !map.is_empty(),
    }
}

/// Convert a JSON value into a database value of the given column type.
///
/// Returns the expected type name when `json` cannot be represented.
pub fn from_json(column_type: &ColumnType, json: Json) -> Result<Value, &'static str> {
    match column_type {
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => match json {
            Json::Null => Ok(Option::<String>::None.into()),
            Json::String(s) => Ok(Some(s).into()),
            _ => Err("a string"),
        },
        ColumnType::Double => match json {
            Json::Null => Ok(Option::<f64>::None.into()),
            Json::Number(n) => n.as_f64().map(|f| Some(f).into()).ok_or("a number"),
            _ => Err("a number"),
        },
        ColumnType::Float => match json {
            Json::Null => Ok(Option::<f32>::None.into()),
            Json::Number(n) => n.as_f64().map(|f| Some(f as f32).into()).ok_or("a number"),
            _ => Err("a number"),
        },
        ColumnType::Integer => match json {
            Json::Null => Ok(Option::<i32>::None.into()),
            Json::Number(n) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(|i| Some(i).into())
                .ok_or("a 32-bit integer"),
            _ => Err("a 32-bit integer"),
        },
        ColumnType::BigInteger => match json {
            Json::Null => Ok(Option::<i64>::None.into()),
            Json::Number(n) => n.as_i64().map(|i| Some(i).into()).ok_or("an integer"),
            _ => Err("an integer"),
        },
        ColumnType::SmallInteger => match json {
            Json::Null => Ok(Option::<i16>::None.into()),
            Json::Number(n) => n
                .as_i64()
                .and_then(|i| i16::try_from(i).ok())
                .map(|i| Some(i).into())
                .ok_or("a 16-bit integer"),
            _ => Err("a 16-bit integer"),
        },
        ColumnType::Boolean => match json {
            Json::Null => Ok(Option::<bool>::None.into()),
            Json::Bool(b) => Ok(Some(b).into()),
            _ => Err("a boolean"),
        },
        _ => Err("a supported column type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::prelude::{Date, Decimal, Uuid};
    use serde_json::json;

    #[test]
    fn test_to_json_handles_nulls() {
        assert_eq!(to_json(&Value::Int(None)), Json::Null);
        assert_eq!(to_json(&Value::Double(Some(0.8))), json!(0.8));
        assert_eq!(to_json(&Value::from("pen")), json!("pen"));
        assert!(is_null(&Value::from(Option::<String>::None)));
    }

    #[test]
    fn test_temporal_and_uuid_nulls() {
        let null_date = Value::ChronoDate(None);
        assert!(is_null(&null_date));
        assert!(!is_present(&null_date));
        assert_eq!(to_json(&null_date), Json::Null);

        let null_uuid = Value::Uuid(None);
        assert!(is_null(&null_uuid));
        assert_eq!(to_json(&null_uuid), Json::Null);
        assert!(is_null(&Value::Decimal(None)));
        assert!(is_null(&Value::ChronoDateTime(None)));
    }

    #[test]
    fn test_temporal_and_uuid_rendering() {
        let date = Date::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(to_json(&Value::from(date)), json!("2024-03-09"));
        assert!(is_present(&Value::from(date)));

        let uuid = Uuid::nil();
        assert_eq!(
            to_json(&Value::from(uuid)),
            json!("00000000-0000-0000-0000-000000000000")
        );

        let price = Decimal::new(80, 2);
        assert_eq!(to_json(&Value::from(price)), json!("0.80"));
    }

    #[test]
    fn test_presence() {
        assert!(is_present(&Value::from("red")));
        assert!(!is_present(&Value::from("  ")));
        assert!(!is_present(&Value::Double(Some(0.0))));
        assert!(is_present(&Value::Double(Some(0.8))));
        assert!(!is_present(&Value::Bool(Some(false))));
    }

    #[test]
    fn test_from_json_by_column_type() {
        assert_eq!(
            from_json(&ColumnType::Double, json!(0.8)),
            Ok(Value::Double(Some(0.8)))
        );
        assert_eq!(
            from_json(&ColumnType::Text, json!("red")),
            Ok(Value::from("red".to_string()))
        );
        assert_eq!(from_json(&ColumnType::Text, json!(1)), Err("a string"));
        assert_eq!(
            from_json(&ColumnType::Integer, json!(5_000_000_000_i64)),
            Err("a 32-bit integer")
        );
        assert_eq!(
            from_json(&ColumnType::Integer, Json::Null),
            Ok(Value::Int(None))
        );
    }
}
