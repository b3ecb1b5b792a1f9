//! MySQL row to JSON conversion.
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the server's column type name
//! 2. a per-category decoder extracts the value from the row
//!
//! Decoding never fails the statement: a value that cannot be extracted is
//! logged and reported as `null`.

use crate::models::ColumnMetadata;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Date,
    Time,
    DateTime,
    Timestamp,
}

/// Classify a MySQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower.contains("int") {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    match lower.as_str() {
        "json" => return TypeCategory::Json,
        "date" => return TypeCategory::Date,
        "time" => return TypeCategory::Time,
        "datetime" => return TypeCategory::DateTime,
        "timestamp" => return TypeCategory::Timestamp,
        _ => {}
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bit" {
        return TypeCategory::Binary;
    }

    // varchar, text, char, enum, set, year, ...
    TypeCategory::Text
}

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact server representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Binary columns are returned as UTF-8 text when valid, base64 otherwise.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
    fn get_column_metadata(&self) -> Vec<ColumnMetadata>;
}

impl RowToJson for MySqlRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                (col.name().to_string(), decode_column(self, idx, category))
            })
            .collect()
    }

    fn get_column_metadata(&self) -> Vec<ColumnMetadata> {
        self.columns()
            .iter()
            .map(|col| ColumnMetadata::new(col.name(), col.type_info().name()))
            .collect()
    }
}

fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::Decimal => match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(v) => v.map_or(JsonValue::Null, |d| JsonValue::String(d.0)),
            Err(e) => {
                tracing::error!(column = idx, error = %e, "Failed to decode DECIMAL");
                JsonValue::Null
            }
        },
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_nullable(row, idx, JsonValue::Bool),
        TypeCategory::Float => decode_nullable(row, idx, |v: f64| {
            serde_json::Number::from_f64(v)
                .map_or_else(|| JsonValue::String(v.to_string()), JsonValue::Number)
        }),
        TypeCategory::Binary => decode_nullable(row, idx, |v: Vec<u8>| decode_binary_value(&v)),
        TypeCategory::Json => decode_nullable(row, idx, |v: JsonValue| v),
        TypeCategory::Date => decode_temporal::<NaiveDate>(row, idx),
        TypeCategory::Time => decode_temporal::<NaiveTime>(row, idx),
        TypeCategory::DateTime => decode_temporal::<NaiveDateTime>(row, idx),
        TypeCategory::Timestamp => decode_temporal::<DateTime<Utc>>(row, idx),
        TypeCategory::Text => decode_text(row, idx),
    }
}

/// Decode `Option<T>` and map it, reporting `null` for NULL or undecodable values.
fn decode_nullable<'r, T, F>(row: &'r MySqlRow, idx: usize, map: F) -> JsonValue
where
    T: Decode<'r, sqlx::MySql> + Type<sqlx::MySql>,
    F: FnOnce(T) -> JsonValue,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(v) => v.map_or(JsonValue::Null, map),
        Err(e) => {
            tracing::debug!(column = idx, error = %e, "Column value could not be decoded");
            JsonValue::Null
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
    let unsigned = row.columns()[idx]
        .type_info()
        .name()
        .to_ascii_uppercase()
        .contains("UNSIGNED");
    if unsigned {
        decode_nullable(row, idx, |v: u64| JsonValue::Number(v.into()))
    } else {
        decode_nullable(row, idx, |v: i64| JsonValue::Number(v.into()))
    }
}

/// Date and time values rendered the way they are written into statements.
trait Temporal {
    const PATTERN: &'static str;
    fn render(&self) -> String;
}

macro_rules! impl_temporal {
    ($($ty:ty => $pattern:literal),* $(,)?) => {
        $(
            impl Temporal for $ty {
                const PATTERN: &'static str = $pattern;
                fn render(&self) -> String {
                    self.format(Self::PATTERN).to_string()
                }
            }
        )*
    };
}

impl_temporal! {
    NaiveDate => "%Y-%m-%d",
    NaiveTime => "%H:%M:%S",
    NaiveDateTime => "%Y-%m-%d %H:%M:%S",
    DateTime<Utc> => "%Y-%m-%d %H:%M:%S",
}

fn decode_temporal<'r, T>(row: &'r MySqlRow, idx: usize) -> JsonValue
where
    T: Decode<'r, sqlx::MySql> + Type<sqlx::MySql> + Temporal,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(v) => v.map_or(JsonValue::Null, |t| JsonValue::String(t.render())),
        // Zero dates ("0000-00-00") do not fit chrono; fall back to the text form.
        Err(_) => decode_text(row, idx),
    }
}

fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    // ENUM, SET and some text-protocol values only decode as raw bytes.
    row.try_get_unchecked::<Option<Vec<u8>>, _>(idx)
        .ok()
        .flatten()
        .map_or(JsonValue::Null, |v| decode_binary_value(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_numeric() {
        assert_eq!(categorize_type("INT"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT UNSIGNED"), TypeCategory::Integer);
        assert_eq!(categorize_type("TINYINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("DECIMAL"), TypeCategory::Decimal);
        assert_eq!(categorize_type("DOUBLE"), TypeCategory::Float);
        assert_eq!(categorize_type("BOOLEAN"), TypeCategory::Boolean);
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("TIME"), TypeCategory::Time);
        assert_eq!(categorize_type("DATETIME"), TypeCategory::DateTime);
        assert_eq!(categorize_type("TIMESTAMP"), TypeCategory::Timestamp);
    }

    #[test]
    fn test_categorize_type_other() {
        assert_eq!(categorize_type("JSON"), TypeCategory::Json);
        assert_eq!(categorize_type("VARBINARY"), TypeCategory::Binary);
        assert_eq!(categorize_type("BLOB"), TypeCategory::Binary);
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
        assert_eq!(categorize_type("ENUM"), TypeCategory::Text);
    }

    #[test]
    fn test_temporal_patterns() {
        let day = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        assert_eq!(day.render(), "2019-06-01");
        assert_eq!(day.and_hms_opt(8, 5, 0).unwrap().render(), "2019-06-01 08:05:00");
        assert_eq!(NaiveTime::from_hms_opt(23, 59, 1).unwrap().render(), "23:59:01");
    }

    #[test]
    fn test_decode_binary_value() {
        assert_eq!(
            decode_binary_value(b"hello world"),
            JsonValue::String("hello world".to_string())
        );
        let bytes: &[u8] = &[0xFF, 0xFE, 0x00, 0x01];
        assert_eq!(
            decode_binary_value(bytes),
            JsonValue::String("//4AAQ==".to_string())
        );
        assert_eq!(decode_binary_value(&[]), JsonValue::String(String::new()));
    }
}
