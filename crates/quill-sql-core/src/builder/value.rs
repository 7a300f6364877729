//! SQL values and parameter handling.
//!
//! Every literal that reaches a query goes through [`SqlValue`] and is bound
//! as a parameter; only raw fragments are spliced into the SQL text.

use serde::{Deserialize, Serialize};

/// A SQL value that can be used as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Structured (JSON) value.
    Json(serde_json::Value),
}

/// A hashable projection of a [`SqlValue`], used to match join keys.
///
/// Drivers are free to hand back `"7"` for an integer column, so canonical
/// decimal text collapses to [`KeyValue::Int`]. `"007"` and `"+7"` stay
/// text keys distinct from `7`. NULL has no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// Integer key.
    Int(i64),
    /// Text key.
    Text(String),
    /// Binary key.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Json(v) => quote_text(&v.to_string()),
        }
    }

    /// Returns whether this value is NULL (including a JSON `null`).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(serde_json::Value::Null))
    }

    /// Returns the value as an integer when it has an exact integer reading.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.as_key()? {
            KeyValue::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the value as text, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Projects the value onto a hashable join key.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_key(&self) -> Option<KeyValue> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(KeyValue::Int(i64::from(*b))),
            Self::Int(n) => Some(KeyValue::Int(*n)),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(KeyValue::Int(*f as i64)),
            Self::Float(f) => Some(KeyValue::Text(f.to_string())),
            Self::Text(s) => Some(
                s.parse::<i64>()
                    .ok()
                    .filter(|n| n.to_string() == *s)
                    .map_or_else(|| KeyValue::Text(s.clone()), KeyValue::Int),
            ),
            Self::Blob(b) => Some(KeyValue::Bytes(b.clone())),
            Self::Json(v) => match v {
                serde_json::Value::Null => None,
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .map(KeyValue::Int)
                    .or_else(|| Some(KeyValue::Text(n.to_string()))),
                serde_json::Value::String(s) => Self::Text(s.clone()).as_key(),
                other => Some(KeyValue::Text(other.to_string())),
            },
        }
    }
}

fn quote_text(s: &str) -> String {
    // Escape single quotes by doubling them
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

impl From<KeyValue> for SqlValue {
    fn from(key: KeyValue) -> Self {
        match key {
            KeyValue::Int(n) => Self::Int(n),
            KeyValue::Text(s) => Self::Text(s),
            KeyValue::Bytes(b) => Self::Blob(b),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

macro_rules! widening_int {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

widening_int!(i8, i16, i32, u8, u16, u32);

impl ToSqlValue for u64 {
    fn to_sql_value(self) -> SqlValue {
        i64::try_from(self).map_or_else(|_| SqlValue::Text(self.to_string()), SqlValue::Int)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Json(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for KeyValue {
    fn to_sql_value(self) -> SqlValue {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_sql_value_inline_blob() {
        assert_eq!(
            SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]).to_sql_inline(),
            "X'48454C4C4F'"
        );
    }

    #[test]
    fn test_sql_value_inline_json() {
        let value = SqlValue::Json(serde_json::json!({"name": "it's"}));
        assert_eq!(value.to_sql_inline(), r#"'{"name":"it''s"}'"#);
    }

    #[test]
    fn test_numeric_text_keys_match_integers() {
        assert_eq!(SqlValue::Int(7).as_key(), SqlValue::Text("7".into()).as_key());
        assert_eq!(SqlValue::Float(7.0).as_key(), Some(KeyValue::Int(7)));
        assert_eq!(
            SqlValue::Text("abc".into()).as_key(),
            Some(KeyValue::Text("abc".into()))
        );
    }

    #[test]
    fn test_padded_numeric_text_keeps_text_key() {
        assert_eq!(
            SqlValue::Text("007".into()).as_key(),
            Some(KeyValue::Text("007".into()))
        );
        assert_eq!(
            SqlValue::Text("+7".into()).as_key(),
            Some(KeyValue::Text("+7".into()))
        );
        assert_ne!(SqlValue::Text("007".into()).as_key(), SqlValue::Int(7).as_key());
        assert_eq!(SqlValue::Text("-7".into()).as_key(), Some(KeyValue::Int(-7)));
        assert_eq!(SqlValue::Text("007".into()).as_i64(), None);
    }

    #[test]
    fn test_null_has_no_key() {
        assert_eq!(SqlValue::Null.as_key(), None);
        assert_eq!(SqlValue::Json(serde_json::Value::Null).as_key(), None);
        assert!(SqlValue::Null.is_null());
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(u64::MAX.to_sql_value(), SqlValue::Text(u64::MAX.to_string()));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }
}
