//! Scalar values carried in cursor tokens and bind lists.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::Error;

/// A dynamically typed scalar: a sort-column value or a bind value.
///
/// Serializes as the bare scalar (no enum tag), so a token payload is a plain
/// tuple of scalars and each value keeps its type across encode/decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   /// SQL NULL
   Null,
   /// Boolean
   Bool(bool),
   /// Signed 64-bit integer
   Int(i64),
   /// 64-bit float
   Float(f64),
   /// UTF-8 text
   Text(String),
}

impl Value {
   /// Return the integer payload, if this is an integer.
   pub fn as_i64(&self) -> Option<i64> {
      match self {
         Value::Int(v) => Some(*v),
         _ => None,
      }
   }

   /// Return the text payload, if this is text.
   pub fn as_str(&self) -> Option<&str> {
      match self {
         Value::Text(v) => Some(v),
         _ => None,
      }
   }

   /// Whether this is SQL `NULL`.
   pub fn is_null(&self) -> bool {
      matches!(self, Value::Null)
   }
}

impl fmt::Display for Value {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Value::Null => f.write_str("NULL"),
         Value::Bool(v) => write!(f, "{v}"),
         Value::Int(v) => write!(f, "{v}"),
         Value::Float(v) => write!(f, "{v}"),
         Value::Text(v) => write!(f, "{v:?}"),
      }
   }
}

impl Serialize for Value {
   fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
      match self {
         Value::Null => serializer.serialize_unit(),
         Value::Bool(v) => serializer.serialize_bool(*v),
         Value::Int(v) => serializer.serialize_i64(*v),
         Value::Float(v) => serializer.serialize_f64(*v),
         Value::Text(v) => serializer.serialize_str(v),
      }
   }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
   type Value = Value;

   fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str("a null, boolean, integer, float or string scalar")
   }

   fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
      Ok(Value::Null)
   }

   fn visit_none<E: de::Error>(self) -> Result<Value, E> {
      Ok(Value::Null)
   }

   fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
      Ok(Value::Bool(v))
   }

   fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
      Ok(Value::Int(v))
   }

   fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
      i64::try_from(v)
         .map(Value::Int)
         .map_err(|_| E::custom(format!("integer {v} does not fit in i64")))
   }

   fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
      Ok(Value::Float(v))
   }

   fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
      Ok(Value::Text(v.to_owned()))
   }

   fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
      Ok(Value::Text(v))
   }
}

impl<'de> Deserialize<'de> for Value {
   fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
      deserializer.deserialize_any(ValueVisitor)
   }
}

impl From<bool> for Value {
   fn from(v: bool) -> Self {
      Value::Bool(v)
   }
}

impl From<i32> for Value {
   fn from(v: i32) -> Self {
      Value::Int(i64::from(v))
   }
}

impl From<u32> for Value {
   fn from(v: u32) -> Self {
      Value::Int(i64::from(v))
   }
}

impl From<i64> for Value {
   fn from(v: i64) -> Self {
      Value::Int(v)
   }
}

impl From<f64> for Value {
   fn from(v: f64) -> Self {
      Value::Float(v)
   }
}

impl From<&str> for Value {
   fn from(v: &str) -> Self {
      Value::Text(v.to_owned())
   }
}

impl From<String> for Value {
   fn from(v: String) -> Self {
      Value::Text(v)
   }
}

impl<T: Into<Value>> From<Option<T>> for Value {
   fn from(v: Option<T>) -> Self {
      v.map_or(Value::Null, Into::into)
   }
}

impl From<Value> for JsonValue {
   fn from(v: Value) -> Self {
      match v {
         Value::Null => JsonValue::Null,
         Value::Bool(b) => JsonValue::Bool(b),
         Value::Int(i) => JsonValue::from(i),
         // Non-finite floats have no JSON form
         Value::Float(f) => {
            serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
         }
         Value::Text(s) => JsonValue::String(s),
      }
   }
}

impl TryFrom<JsonValue> for Value {
   type Error = Error;

   fn try_from(v: JsonValue) -> Result<Self, Self::Error> {
      match v {
         JsonValue::Null => Ok(Value::Null),
         JsonValue::Bool(b) => Ok(Value::Bool(b)),
         JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
               Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
               Ok(Value::Float(f))
            } else {
               Err(Error::UnsupportedValue(n.to_string()))
            }
         }
         JsonValue::String(s) => Ok(Value::Text(s)),
         JsonValue::Array(_) => Err(Error::UnsupportedValue("array".to_string())),
         JsonValue::Object(_) => Err(Error::UnsupportedValue("object".to_string())),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn json_conversion_keeps_scalar_types() {
      assert_eq!(Value::try_from(json!(42)).unwrap(), Value::Int(42));
      assert_eq!(Value::try_from(json!(1.5)).unwrap(), Value::Float(1.5));
      assert_eq!(Value::try_from(json!("a4")).unwrap(), Value::from("a4"));
      assert_eq!(Value::try_from(json!(true)).unwrap(), Value::Bool(true));
      assert_eq!(Value::try_from(json!(null)).unwrap(), Value::Null);
   }

   #[test]
   fn json_conversion_rejects_containers() {
      let err = Value::try_from(json!([1, 2])).unwrap_err();
      assert!(matches!(err, Error::UnsupportedValue(_)));
      assert!(Value::try_from(json!({"a": 1})).is_err());
   }

   #[test]
   fn serializes_as_bare_scalar() {
      assert_eq!(serde_json::to_string(&Value::Int(7)).unwrap(), "7");
      assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
      assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
   }

   #[test]
   fn deserializes_from_bare_scalar() {
      let values: Vec<Value> = serde_json::from_str(r#"[1, -2, 2.5, "s", false, null]"#).unwrap();
      assert_eq!(
         values,
         vec![
            Value::Int(1),
            Value::Int(-2),
            Value::Float(2.5),
            Value::from("s"),
            Value::Bool(false),
            Value::Null,
         ]
      );
   }

   #[test]
   fn rejects_u64_beyond_i64() {
      let result: Result<Value, _> = serde_json::from_str("18446744073709551615");
      assert!(result.is_err());
   }

   #[test]
   fn option_maps_none_to_null() {
      assert_eq!(Value::from(None::<i64>), Value::Null);
      assert_eq!(Value::from(Some(3)), Value::Int(3));
   }
}
