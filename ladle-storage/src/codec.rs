//! Self-describing value codec.
//!
//! Cache payloads are stored as JSON bytes. Typed callers go through
//! [`encode`] and [`decode`]; callers that do not know the shape ahead of
//! time decode into a [`CacheValue`] tree with [`decode_value`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decode failure reason when bytes match none of the supported shapes.
pub const UNRECOGNIZED_SHAPE: &str = "unrecognized shape";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to encode value: {reason}")]
    Encode { reason: String },

    #[error("Failed to decode value: {reason}")]
    Decode { reason: String },
}

impl From<CodecError> for ladle_core::CacheError {
    fn from(err: CodecError) -> Self {
        ladle_core::CacheError::Codec {
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// VALUE TREE
// ============================================================================

/// A decoded value of unknown static type.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<CacheValue>),
    Mapping(BTreeMap<String, CacheValue>),
}

impl CacheValue {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheValue::Null => "null",
            CacheValue::Bool(_) => "bool",
            CacheValue::Int(_) => "int",
            CacheValue::Float(_) => "float",
            CacheValue::String(_) => "string",
            CacheValue::Sequence(_) => "sequence",
            CacheValue::Mapping(_) => "mapping",
        }
    }

    /// Looks up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&CacheValue> {
        match self {
            CacheValue::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Converts a typed value into its tree form.
    pub fn from_typed<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        decode_value(&encode(value)?)
    }

    /// Reads this tree back as a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        decode(&encode(self)?)
    }
}

impl Serialize for CacheValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CacheValue::Null => serializer.serialize_unit(),
            CacheValue::Bool(b) => serializer.serialize_bool(*b),
            CacheValue::Int(n) => serializer.serialize_i64(*n),
            CacheValue::Float(f) => {
                if !f.is_finite() {
                    return Err(ser::Error::custom(format!("non-finite float {f}")));
                }
                serializer.serialize_f64(*f)
            }
            CacheValue::String(s) => serializer.serialize_str(s),
            CacheValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CacheValue::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Shapes are tried narrowest first: null, bool, int, float, string,
/// sequence, mapping. Integers beyond `i64` fall through to float.
struct CacheValueVisitor;

impl<'de> Visitor<'de> for CacheValueVisitor {
    type Value = CacheValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, bool, number, string, sequence or mapping")
    }

    fn visit_unit<E: de::Error>(self) -> Result<CacheValue, E> {
        Ok(CacheValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<CacheValue, E> {
        Ok(CacheValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<CacheValue, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<CacheValue, E> {
        Ok(CacheValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CacheValue, E> {
        Ok(CacheValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CacheValue, E> {
        match i64::try_from(v) {
            Ok(n) => Ok(CacheValue::Int(n)),
            Err(_) => Ok(CacheValue::Float(v as f64)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<CacheValue, E> {
        Ok(CacheValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CacheValue, E> {
        Ok(CacheValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<CacheValue, E> {
        Ok(CacheValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<CacheValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(CacheValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CacheValue, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, CacheValue>()? {
            entries.insert(key, value);
        }
        Ok(CacheValue::Mapping(entries))
    }
}

impl<'de> Deserialize<'de> for CacheValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CacheValueVisitor)
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Encodes any serializable value. Non-finite floats are rejected.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Encode {
        reason: e.to_string(),
    })
}

/// Decodes bytes into a caller-chosen type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        reason: e.to_string(),
    })
}

/// Decodes bytes without a static type.
pub fn decode_value(bytes: &[u8]) -> Result<CacheValue, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "value decode failed");
        CodecError::Decode {
            reason: UNRECOGNIZED_SHAPE.to_string(),
        }
    })
}

// ============================================================================
// TESTS
// ============================================================================
