//! Parameter value types
//!
//! Query parameters are a closed set of tagged variants. Values that fit none
//! of the built-in shapes travel as [`ParamValue::Custom`] and need a
//! registered rule to be serialized.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::fmt;

/// A query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Plain string
    String(String),
    /// Ordered sequence, serialized as `name[]=...` per element
    Sequence(Vec<ParamValue>),
    /// Point in time, serialized as a calendar date
    DateTime(DateTime<Utc>),
    /// String-valued named type, e.g. an enum like `EnrollmentState`
    Named {
        /// Name of the string-like type
        type_name: &'static str,
        /// String form of the value
        value: String,
    },
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// Application-defined value with no built-in encoding
    Custom {
        /// Name used to select an encoding rule
        type_name: &'static str,
        /// Payload the encoder reads
        value: Value,
    },
}

impl ParamValue {
    /// Create a string-like value of a named type
    pub fn named(type_name: &'static str, value: impl Into<String>) -> Self {
        Self::Named {
            type_name,
            value: value.into(),
        }
    }

    /// Create an application-defined value
    pub fn custom(type_name: &'static str, value: Value) -> Self {
        Self::Custom { type_name, value }
    }

    /// The value's type descriptor
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::String(_) => ParamKind::String,
            Self::Sequence(_) => ParamKind::Sequence,
            Self::DateTime(_) => ParamKind::DateTime,
            Self::Named { type_name, .. } => ParamKind::Named(type_name),
            Self::Integer(_) => ParamKind::Integer,
            Self::Float(_) => ParamKind::Float,
            Self::Bool(_) => ParamKind::Bool,
            Self::Custom { type_name, .. } => ParamKind::Custom(type_name),
        }
    }

    /// Borrow the string content of `String` and `Named` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Named { value: s, .. } => Some(s),
            _ => None,
        }
    }
}

/// Type descriptor that rule predicates match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    String,
    Sequence,
    DateTime,
    Named(&'static str),
    Integer,
    Float,
    Bool,
    Custom(&'static str),
}

impl ParamKind {
    /// Whether values of this kind carry a string underneath
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Named(_))
    }

    /// Whether this is a numeric kind
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Sequence => f.write_str("Sequence"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Named(name) => write!(f, "Named({name})"),
            Self::Integer => f.write_str("Integer"),
            Self::Float => f.write_str("Float"),
            Self::Bool => f.write_str("Bool"),
            Self::Custom(name) => write!(f, "Custom({name})"),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        Self::DateTime(value.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue> + Clone> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        Self::Sequence(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}
