//! The resolved property values handed over by the upstream cascade.
//!
//! Upstream style processing resolves the cascade down to absolute lengths,
//! percentages, keywords and colors before the tree reaches this system, so
//! a value here never needs unit conversion, only interpretation.

use folio_types::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::BTreeMap;

/// A cascade-resolved computed value for a single CSS property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// An absolute length in points.
    Length(f32),
    /// A percentage, stored as the raw number (50% → 50.0).
    Percent(f32),
    /// A keyword such as `auto`, `block` or `hidden`.
    Keyword(String),
    Color(Color),
    /// An integer count (orphans, widows).
    Int(i64),
}

impl PropertyValue {
    pub fn as_length(&self) -> Option<f32> {
        match self {
            PropertyValue::Length(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            PropertyValue::Keyword(k) => Some(k.as_str()),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            PropertyValue::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            // Upstream serializers sometimes hand counts over as lengths.
            PropertyValue::Length(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }
}

/// Ordered property-name → value mapping for one styled element.
///
/// A `BTreeMap` keeps iteration order stable, which keeps diagnostics and
/// debug output deterministic across runs.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

impl Serialize for PropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PropertyValue::Length(v) => serializer.serialize_f32(*v),
            PropertyValue::Percent(v) => serializer.serialize_str(&format!("{}%", v)),
            PropertyValue::Keyword(k) => serializer.serialize_str(k),
            PropertyValue::Color(c) => c.serialize(serializer),
            PropertyValue::Int(v) => serializer.serialize_i64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = PropertyValue;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number, a keyword string, '<n>%' or '#rrggbb'")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<PropertyValue, E> {
                Ok(PropertyValue::Length(v as f32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<PropertyValue, E> {
                Ok(PropertyValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<PropertyValue, E> {
                Ok(PropertyValue::Int(v as i64))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<PropertyValue, E> {
                if let Some(num) = s.strip_suffix('%') {
                    let value = num
                        .trim()
                        .parse::<f32>()
                        .map_err(|_| E::custom(format!("invalid percentage: '{}'", s)))?;
                    return Ok(PropertyValue::Percent(value));
                }
                if s.starts_with('#') {
                    let color = Color::parse_hex(s).map_err(E::custom)?;
                    return Ok(PropertyValue::Color(color));
                }
                if let Some(num) = s.strip_suffix("pt") {
                    let value = num
                        .trim()
                        .parse::<f32>()
                        .map_err(|_| E::custom(format!("invalid length: '{}'", s)))?;
                    return Ok(PropertyValue::Length(value));
                }
                Ok(PropertyValue::Keyword(s.to_string()))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
