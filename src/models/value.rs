//! Values that can be rendered into SQL text.
//!
//! [`Value`] covers every type the escaper understands. [`Literal`] is the
//! escape hatch: its text is written into the statement verbatim, so it must
//! only ever hold trusted expressions such as `now()`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value as JsonValue;

/// Raw SQL fragment that bypasses escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(String);

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The server-side current timestamp, `now()`.
pub fn now() -> Literal {
    Literal::new("now()")
}

/// A value bound into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Rendered as a comma-separated list; nested lists become `(..)` groups.
    List(Vec<Value>),
    /// Rendered as `'YYYY-MM-DD HH:MM:SS'`.
    DateTime(NaiveDateTime),
    Literal(Literal),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this value for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::DateTime(_) => "datetime",
            Self::Literal(_) => "literal",
        }
    }
}

macro_rules! impl_from_value {
    ($variant:ident as $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_value!(Int as i64: i8, i16, i32, i64);
impl_from_value!(UInt as u64: u8, u16, u32, u64);
impl_from_value!(Float as f64: f32, f64);
impl_from_value!(Bool as bool: bool);
impl_from_value!(String as String: String, &str, &String);
// `Vec<u8>` goes through the list conversion; pass a slice for binary data.
impl_from_value!(Bytes as Vec<u8>: &[u8]);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<Literal> for Value {
    fn from(v: Literal) -> Self {
        Value::Literal(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

/// Zoned timestamps are rendered in their own offset.
impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_local())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            // Objects are stored as their JSON text, as MySQL JSON columns expect.
            obj @ JsonValue::Object(_) => Value::String(obj.to_string()),
        }
    }
}

/// Explicit positional argument list for templates with many placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }
}

/// Conversion into the positional arguments of a `?` template.
///
/// A single value is one argument; tuples supply one argument per element.
/// A `Vec` is a *single* list argument (for `IN (?)`), use [`Args`] to pass
/// an arbitrary number of separate arguments.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl IntoArgs for Args {
    fn into_args(self) -> Vec<Value> {
        self.0
    }
}

macro_rules! impl_into_args_single {
    ($($t:ty),+ $(,)?) => {
        $(
            impl IntoArgs for $t {
                fn into_args(self) -> Vec<Value> {
                    vec![Value::from(self)]
                }
            }
        )+
    };
}

impl_into_args_single!(
    Value, Literal, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String,
    &str, &String, NaiveDateTime, NaiveDate, JsonValue,
);

impl<T: Into<Value>> IntoArgs for Vec<T> {
    fn into_args(self) -> Vec<Value> {
        vec![Value::from(self)]
    }
}

impl<T: Into<Value>> IntoArgs for Option<T> {
    fn into_args(self) -> Vec<Value> {
        vec![Value::from(self)]
    }
}

impl<Tz: TimeZone> IntoArgs for DateTime<Tz> {
    fn into_args(self) -> Vec<Value> {
        vec![Value::from(self)]
    }
}

macro_rules! impl_into_args_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
