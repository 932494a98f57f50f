//! Attribute values and the unknown sentinel.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Placeholder stored in place of any value a provider could not determine.
pub const UNKNOWN: &str = "unknown";

pub(crate) static UNKNOWN_VALUE: AttributeValue = AttributeValue::Text(Cow::Borrowed(UNKNOWN));

/// A single attribute value as extracted from a provider.
///
/// `Null` only exists on the way in: [`AttributeRecord`](super::AttributeRecord) replaces it
/// (and every other falsy value) with [`UNKNOWN`] at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(Cow<'static, str>),
    Null,
}

impl AttributeValue {
    /// The unknown sentinel as a value.
    pub fn unknown() -> Self {
        UNKNOWN_VALUE.clone()
    }

    /// Empty text, `"0"`, `false`, numeric zero and `Null` are falsy.
    ///
    /// Zero is falsy even where it is a legitimate measurement (a zero confidence or
    /// population density), so such values end up stored as unknown. NaN and the infinities
    /// count as falsy too: JSON has no encoding for them.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Integer(n) => *n == 0,
            Self::Float(f) => *f == 0.0 || !f.is_finite(),
            Self::Text(s) => Self::is_falsy_text(s),
        }
    }

    /// The falsy rule for raw text: empty or `"0"`.
    pub fn is_falsy_text(text: &str) -> bool {
        text.is_empty() || text == "0"
    }

    /// Returns the value unchanged, or the unknown sentinel when falsy.
    pub fn normalized(self) -> Self {
        if self.is_falsy() {
            Self::unknown()
        } else {
            self
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Text(s) if s == UNKNOWN)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl PartialEq<str> for AttributeValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for AttributeValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(Cow::Owned(value.to_owned()))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

impl From<&String> for AttributeValue {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Cow<'static, str>> for AttributeValue {
    fn from(value: Cow<'static, str>) -> Self {
        Self::Text(value)
    }
}

macro_rules! integer_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttributeValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_from!(u8, u16, u32, i8, i16, i32, i64);

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Integer)
            .unwrap_or(Self::Float(value as f64))
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
