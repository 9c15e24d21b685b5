use std::collections::HashMap;
use std::fmt;

use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize};

/// Subject or action attributes, keyed by attribute name.
pub type Attributes = HashMap<String, AttributeValue>;

/// A single attribute value.
///
/// Unlike [`crate::ufc::Value`], this type distinguishes integers from floating-point numbers,
/// since rule evaluation coerces them differently (e.g., `MATCHES` renders an integer without a
/// decimal point).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Null,
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Coerce to `f64`, the way numeric rule comparisons do.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::String(s) => s.parse::<f64>().ok(),
            AttributeValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Null => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AttributeValueVisitor;

        impl<'de> Visitor<'de> for AttributeValueVisitor {
            type Value = AttributeValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number, boolean, or null")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(AttributeValue::Boolean(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(AttributeValue::Integer(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                match i64::try_from(v) {
                    Ok(v) => Ok(AttributeValue::Integer(v)),
                    Err(_) => Ok(AttributeValue::Number(v as f64)),
                }
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(AttributeValue::Number(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(AttributeValue::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(AttributeValue::String(v))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(AttributeValue::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(AttributeValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }
        }

        deserializer.deserialize_any(AttributeValueVisitor)
    }
}

/// Subject or action attributes split into numeric and categorical buckets, the representation
/// bandit scoring operates on. Booleans coerce to the categorical strings `"true"`/`"false"`;
/// nulls are dropped (treated as missing, so the coefficient's missing-value fallback applies).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextAttributes {
    pub numeric: HashMap<String, f64>,
    pub categorical: HashMap<String, String>,
}

impl From<&Attributes> for ContextAttributes {
    fn from(attributes: &Attributes) -> Self {
        let mut numeric = HashMap::new();
        let mut categorical = HashMap::new();
        for (key, value) in attributes {
            match value {
                AttributeValue::Number(n) => {
                    numeric.insert(key.clone(), *n);
                }
                AttributeValue::Integer(i) => {
                    numeric.insert(key.clone(), *i as f64);
                }
                AttributeValue::String(s) => {
                    categorical.insert(key.clone(), s.clone());
                }
                AttributeValue::Boolean(b) => {
                    categorical.insert(key.clone(), if *b { "true" } else { "false" }.to_owned());
                }
                AttributeValue::Null => {}
            }
        }
        ContextAttributes { numeric, categorical }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_integer_distinct_from_float() {
        let v: AttributeValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, AttributeValue::Integer(3));

        let v: AttributeValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, AttributeValue::Number(3.5));
    }

    #[test]
    fn deserializes_null() {
        let v: AttributeValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, AttributeValue::Null);
    }

    #[test]
    fn coerces_to_f64() {
        assert_eq!(AttributeValue::Integer(2).as_f64(), Some(2.0));
        assert_eq!(AttributeValue::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(AttributeValue::Null.as_f64(), None);
    }
}
