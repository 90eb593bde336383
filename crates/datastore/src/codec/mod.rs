//! Codec Registry - per-type conversion between typed values and storage scalars
//!
//! Every semantic [`PropertyType`] maps to a [`PropertyCodec`]. Types without a
//! registered codec fall back to [`BestGuessCodec`], which infers the typed
//! value from the runtime shape of the stored scalar.

pub mod parsers;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::backends::DatabaseValue;
use crate::error::DatastoreResult;
use crate::model::PropertyType;

pub use parsers::{
    BestGuessCodec, BooleanCodec, DateCodec, IntegerCodec, JsonCodec, NumberCodec, StringCodec,
};

/// Encode/decode pair for one semantic type
pub trait PropertyCodec: Send + Sync + fmt::Debug {
    /// Convert a typed value into a storage scalar
    fn encode(&self, value: &JsonValue) -> DatabaseValue {
        encode_default(value)
    }

    /// Convert a storage scalar back into a typed value. Null is always null.
    fn decode(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }
        self.decode_present(value)
    }

    /// Decode a non-null storage scalar
    fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue>;
}

/// Default encoding: null stays null, arrays and objects become JSON text and
/// scalars pass through.
pub fn encode_default(value: &JsonValue) -> DatabaseValue {
    match value {
        JsonValue::Null => DatabaseValue::Null,
        JsonValue::Bool(b) => DatabaseValue::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => DatabaseValue::Int64(i),
            None => DatabaseValue::Float64(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => DatabaseValue::String(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => DatabaseValue::String(value.to_string()),
    }
}

/// Mapping from semantic type to codec, with a best-guess fallback
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<PropertyType, Arc<dyn PropertyCodec>>,
    fallback: Arc<dyn PropertyCodec>,
}

impl CodecRegistry {
    /// Registry with no codecs; every type uses the fallback
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
            fallback: Arc::new(BestGuessCodec),
        }
    }

    /// Register (or replace) the codec for a type
    pub fn register<C>(&mut self, property_type: PropertyType, codec: C) -> &mut Self
    where
        C: PropertyCodec + 'static,
    {
        self.codecs.insert(property_type, Arc::new(codec));
        self
    }

    /// Consuming variant of [`register`](Self::register)
    pub fn with_codec<C>(mut self, property_type: PropertyType, codec: C) -> Self
    where
        C: PropertyCodec + 'static,
    {
        self.register(property_type, codec);
        self
    }

    /// Replace the fallback used for unregistered types
    pub fn with_fallback<C>(mut self, codec: C) -> Self
    where
        C: PropertyCodec + 'static,
    {
        self.fallback = Arc::new(codec);
        self
    }

    pub fn is_registered(&self, property_type: &PropertyType) -> bool {
        self.codecs.contains_key(property_type)
    }

    /// Codec for a type, or the fallback
    pub fn codec_for(&self, property_type: &PropertyType) -> &dyn PropertyCodec {
        self.codecs
            .get(property_type)
            .map(|codec| &**codec)
            .unwrap_or(&*self.fallback)
    }

    pub fn encode(&self, property_type: &PropertyType, value: &JsonValue) -> DatabaseValue {
        self.codec_for(property_type).encode(value)
    }

    pub fn decode(&self, property_type: &PropertyType, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
        self.codec_for(property_type).decode(value)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(PropertyType::UniqueId, StringCodec)
            .register(PropertyType::ModelReference, StringCodec)
            .register(PropertyType::Text, StringCodec)
            .register(PropertyType::BigText, StringCodec)
            .register(PropertyType::Email, StringCodec)
            .register(PropertyType::Integer, IntegerCodec)
            .register(PropertyType::Number, NumberCodec)
            .register(PropertyType::Boolean, BooleanCodec)
            .register(PropertyType::Date, DateCodec)
            .register(PropertyType::Datetime, DateCodec)
            .register(PropertyType::Object, JsonCodec)
            .register(PropertyType::Array, JsonCodec);
        registry
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.codecs.keys().map(|t| t.to_string()).collect();
        types.sort();
        f.debug_struct("CodecRegistry")
            .field("types", &types)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct UpperCaseCodec;

    impl PropertyCodec for UpperCaseCodec {
        fn decode_present(&self, value: &DatabaseValue) -> DatastoreResult<JsonValue> {
            let text = value.to_json().as_str().unwrap_or_default().to_uppercase();
            Ok(JsonValue::String(text))
        }
    }

    #[test]
    fn test_encode_default() {
        assert_eq!(encode_default(&JsonValue::Null), DatabaseValue::Null);
        assert_eq!(encode_default(&json!(true)), DatabaseValue::Bool(true));
        assert_eq!(encode_default(&json!(42)), DatabaseValue::Int64(42));
        assert_eq!(encode_default(&json!(1.5)), DatabaseValue::Float64(1.5));
        assert_eq!(encode_default(&json!("abc")), DatabaseValue::String("abc".into()));
        assert_eq!(
            encode_default(&json!([1, 2, 3])),
            DatabaseValue::String("[1,2,3]".into())
        );
        assert_eq!(
            encode_default(&json!({"my": "object"})),
            DatabaseValue::String("{\"my\":\"object\"}".into())
        );
    }

    #[test]
    fn test_null_short_circuits_every_codec() {
        let registry = CodecRegistry::default();
        for property_type in [
            PropertyType::UniqueId,
            PropertyType::Integer,
            PropertyType::Date,
            PropertyType::Object,
            PropertyType::Custom("Constant".into()),
        ] {
            assert_eq!(
                registry.decode(&property_type, &DatabaseValue::Null).unwrap(),
                JsonValue::Null
            );
        }
    }

    #[test]
    fn test_unregistered_type_uses_fallback() {
        let registry = CodecRegistry::default();
        let custom = PropertyType::Custom("ConstantValue".into());
        assert!(!registry.is_registered(&custom));
        assert_eq!(
            registry.decode(&custom, &DatabaseValue::Int64(7)).unwrap(),
            json!(7)
        );
    }

    #[test]
    fn test_registered_codec_overrides_builtin() {
        let registry = CodecRegistry::default().with_codec(PropertyType::Text, UpperCaseCodec);
        assert_eq!(
            registry
                .decode(&PropertyType::Text, &DatabaseValue::String("abc".into()))
                .unwrap(),
            json!("ABC")
        );
        assert_eq!(
            registry.decode(&PropertyType::Text, &DatabaseValue::Null).unwrap(),
            JsonValue::Null
        );
    }
}
