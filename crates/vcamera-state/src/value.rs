use std::fmt;

use serde::{Deserialize, Serialize};

/// A single stored preference value.
///
/// Every entry carries its type, so reading a key with the wrong accessor is detected instead of
/// reinterpreting the stored bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PrefValue {
    #[allow(missing_docs)]
    String(String),
    #[allow(missing_docs)]
    Int(i32),
    #[allow(missing_docs)]
    Long(i64),
    #[allow(missing_docs)]
    Boolean(bool),
    /// Encoded as a JSON number when finite, and as `"inf"`, `"-inf"` or `"NaN"` otherwise.
    Float(#[serde(with = "float_repr")] f32),
}

impl PrefValue {
    /// The kind of this value.
    pub fn kind(&self) -> PrefKind {
        match self {
            PrefValue::String(_) => PrefKind::String,
            PrefValue::Int(_) => PrefKind::Int,
            PrefValue::Long(_) => PrefKind::Long,
            PrefValue::Boolean(_) => PrefKind::Boolean,
            PrefValue::Float(_) => PrefKind::Float,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::String(v) => f.write_str(v),
            PrefValue::Int(v) => write!(f, "{v}"),
            PrefValue::Long(v) => write!(f, "{v}"),
            PrefValue::Boolean(v) => write!(f, "{v}"),
            PrefValue::Float(v) => write!(f, "{v}"),
        }
    }
}

// JSON has no literal for infinities or NaN, so they are stored as text.
mod float_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else {
            serializer.collect_str(value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Text(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Discriminant of [`PrefValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PrefKind {
    String,
    Int,
    Long,
    Boolean,
    Float,
}

impl fmt::Display for PrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrefKind::String => "string",
            PrefKind::Int => "int",
            PrefKind::Long => "long",
            PrefKind::Boolean => "boolean",
            PrefKind::Float => "float",
        };
        f.write_str(name)
    }
}

/// Rust types that can be stored as a preference.
///
/// Implemented for `String`, `i32`, `i64`, `bool` and `f32`.
pub trait PrefType: Sized {
    /// The variant this type is stored as.
    const KIND: PrefKind;

    /// Wrap the value.
    fn into_value(self) -> PrefValue;

    /// Extract the value, returning `None` if `value` holds a different kind.
    fn from_value(value: &PrefValue) -> Option<Self>;
}

macro_rules! impl_pref_type {
    ($ty:ty, $variant:ident) => {
        impl PrefType for $ty {
            const KIND: PrefKind = PrefKind::$variant;

            fn into_value(self) -> PrefValue {
                PrefValue::$variant(self)
            }

            fn from_value(value: &PrefValue) -> Option<Self> {
                match value {
                    PrefValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for PrefValue {
            fn from(value: $ty) -> Self {
                PrefValue::$variant(value)
            }
        }
    };
}

impl_pref_type!(String, String);
impl_pref_type!(i32, Int);
impl_pref_type!(i64, Long);
impl_pref_type!(bool, Boolean);
impl_pref_type!(f32, Float);

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_owned())
    }
}
