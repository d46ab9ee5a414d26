//! Typed property values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type a schema field declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// `true` / `false`.
    Bool,
    /// A finite floating-point number.
    Number,
    /// Free text.
    String,
    /// A URL (kept as text).
    Url,
    /// A geographic coordinate.
    LatLng,
    /// A reference to another entity by id.
    Ref,
}

impl ValueType {
    /// The lowercase name used in manifests.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Url => "url",
            Self::LatLng => "latlng",
            Self::Ref => "ref",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// A value stored in a property field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text.
    String(String),
    /// A URL.
    Url(String),
    /// A coordinate.
    LatLng(LatLng),
    /// An entity reference.
    Ref(String),
}

impl Value {
    /// The type of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Number(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
            Self::Url(_) => ValueType::Url,
            Self::LatLng(_) => ValueType::LatLng,
            Self::Ref(_) => ValueType::Ref,
        }
    }

    /// Converts this value to another type, returning `None` when no
    /// sensible conversion exists.
    #[must_use]
    pub fn cast(&self, to: ValueType) -> Option<Self> {
        if self.value_type() == to {
            return Some(self.clone());
        }
        match (self, to) {
            (Self::Bool(b), ValueType::String) => Some(Self::String(b.to_string())),
            (Self::Number(n), ValueType::String) => Some(Self::String(n.to_string())),
            (Self::Url(s) | Self::Ref(s), ValueType::String) => Some(Self::String(s.clone())),
            (Self::String(s), ValueType::Number) => {
                s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(Self::Number)
            }
            (Self::String(s), ValueType::Bool) => s.trim().parse::<bool>().ok().map(Self::Bool),
            (Self::String(s), ValueType::Url) if looks_like_url(s) => Some(Self::Url(s.clone())),
            (Self::String(s), ValueType::Ref) if !s.is_empty() => Some(Self::Ref(s.clone())),
            _ => None,
        }
    }
}

fn looks_like_url(s: &str) -> bool {
    s.split_once("://")
        .is_some_and(|(scheme, rest)| !scheme.is_empty() && !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_number_to_string_and_back() {
        let v = Value::Number(1.5);

        let s = v.cast(ValueType::String).unwrap();
        assert_eq!(s, Value::String("1.5".to_owned()));
        assert_eq!(s.cast(ValueType::Number), Some(Value::Number(1.5)));
    }

    #[test]
    fn test_cast_rejects_unparseable_text() {
        let v = Value::String("abc".to_owned());

        assert_eq!(v.cast(ValueType::Number), None);
        assert_eq!(v.cast(ValueType::Url), None);
        assert_eq!(v.cast(ValueType::LatLng), None);
    }

    #[test]
    fn test_cast_latlng_has_no_conversions() {
        let v = Value::LatLng(LatLng { lat: 1.0, lng: 2.0 });

        assert_eq!(v.cast(ValueType::String), None);
        assert_eq!(v.cast(ValueType::LatLng), Some(v.clone()));
    }

    #[test]
    fn test_value_serializes_with_type_tag() {
        let json = serde_json::to_value(Value::Url("https://a.b".to_owned())).unwrap();

        assert_eq!(json, serde_json::json!({"type": "url", "value": "https://a.b"}));
    }
}
