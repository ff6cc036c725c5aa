//! SQL argument values.
//!
//! Values are never interpolated into rendered SQL; they travel next to it as
//! positional arguments. [`SqlValue::to_sql_inline`] exists only for log
//! output.

use std::fmt;

/// A positional argument bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
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
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns an escaped literal for explain/log output.
    ///
    /// **Warning**: never send this to a database, bind the value instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_inline())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for SqlValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(value: &[u8]) -> Self {
        Self::Blob(value.to_vec())
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_doubles_quotes() {
        assert_eq!(SqlValue::from("O'Brien").to_sql_inline(), "'O''Brien'");
        assert_eq!(
            SqlValue::from("'; DROP TABLE users; --").to_sql_inline(),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn inline_scalars() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
        assert_eq!(SqlValue::from(true).to_sql_inline(), "TRUE");
        assert_eq!(SqlValue::from(-100_i64).to_sql_inline(), "-100");
        assert_eq!(SqlValue::from(vec![0x48_u8, 0x49]).to_sql_inline(), "X'4849'");
    }

    #[test]
    fn conversions() {
        assert_eq!(SqlValue::from(42_u16), SqlValue::Int(42));
        assert_eq!(SqlValue::from(2.5_f64), SqlValue::Float(2.5));
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
        assert!(SqlValue::from(None::<bool>).is_null());
    }
}
