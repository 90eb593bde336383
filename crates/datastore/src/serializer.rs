//! Value Serializer - applies the codec registry across a whole record

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::backends::{DatabaseValue, StorageRow};
use crate::codec::{encode_default, CodecRegistry};
use crate::error::DatastoreResult;
use crate::model::{ModelDefinition, PropertyDefinition, Record};

/// Converts typed records to storage rows and back, property by property
#[derive(Debug, Clone)]
pub struct ValueSerializer {
    registry: Arc<CodecRegistry>,
}

impl ValueSerializer {
    pub fn new(registry: CodecRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Encode every declared property of `record`. A missing record yields an
    /// empty row; missing properties encode as null.
    pub fn to_storage_row(&self, definition: &ModelDefinition, record: Option<&Record>) -> StorageRow {
        let Some(record) = record else {
            return StorageRow::new();
        };

        definition
            .properties()
            .iter()
            .map(|property| {
                let value = record.get(&property.name).unwrap_or(&JsonValue::Null);
                (property.name.clone(), self.encode(property, value))
            })
            .collect()
    }

    /// Encode `record` as a list of values in declaration order
    pub fn to_storage_values(&self, definition: &ModelDefinition, record: &Record) -> Vec<DatabaseValue> {
        definition
            .properties()
            .iter()
            .map(|property| {
                let value = record.get(&property.name).unwrap_or(&JsonValue::Null);
                self.encode(property, value)
            })
            .collect()
    }

    /// Decode every declared property of `row`. A missing row yields an empty
    /// record; missing columns decode as null.
    pub fn to_typed_record(&self, definition: &ModelDefinition, row: Option<&StorageRow>) -> DatastoreResult<Record> {
        let mut record = Record::new();
        let Some(row) = row else {
            return Ok(record);
        };

        for property in definition.properties() {
            let value = row.get(&property.name).unwrap_or(&DatabaseValue::Null);
            let decoded = self.registry.decode(&property.property_type, value)?;
            record.insert(property.name.clone(), decoded);
        }
        Ok(record)
    }

    /// Encode a primary key value with the primary key property's codec
    pub fn encode_primary_key(&self, definition: &ModelDefinition, key: &JsonValue) -> DatabaseValue {
        self.encode(definition.primary_key_property(), key)
    }

    /// Encode a query value for the column `key`. Keys the model does not
    /// declare use the default encoding.
    pub fn encode_property(&self, definition: &ModelDefinition, key: &str, value: &JsonValue) -> DatabaseValue {
        match definition.property(key) {
            Some(property) => self.encode(property, value),
            None => encode_default(value),
        }
    }

    fn encode(&self, property: &PropertyDefinition, value: &JsonValue) -> DatabaseValue {
        self.registry.encode(&property.property_type, value)
    }
}

impl Default for ValueSerializer {
    fn default() -> Self {
        Self::new(CodecRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyType;
    use serde_json::json;

    fn test_model() -> ModelDefinition {
        ModelDefinition::builder("TestModel")
            .primary_key("id", PropertyType::UniqueId)
            .required("aString", PropertyType::Text)
            .required("anObject", PropertyType::Object)
            .required("anArray", PropertyType::Array)
            .required("aBool", PropertyType::Boolean)
            .optional("aNullableInt", PropertyType::Integer)
            .optional("aDate", PropertyType::Date)
            .build()
            .unwrap()
    }

    fn test_record() -> Record {
        json!({
            "id": "0c39b83b-b311-43c7-9b00-c78c07a11cc9",
            "aString": "hello",
            "anObject": {"my": "object"},
            "anArray": [1, 2, 3],
            "aBool": true,
            "aNullableInt": null,
            "aDate": "2022-04-03T00:00:00.000Z"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_to_storage_row_encodes_nested_values_as_json_text() {
        let serializer = ValueSerializer::default();
        let row = serializer.to_storage_row(&test_model(), Some(&test_record()));

        assert_eq!(row.len(), 7);
        assert_eq!(
            row["anObject"],
            DatabaseValue::String("{\"my\":\"object\"}".into())
        );
        assert_eq!(row["anArray"], DatabaseValue::String("[1,2,3]".into()));
        assert_eq!(row["aNullableInt"], DatabaseValue::Null);
        assert!(matches!(row["aDate"], DatabaseValue::DateTime(_)));
    }

    #[test]
    fn test_round_trip_restores_record() {
        let serializer = ValueSerializer::default();
        let definition = test_model();
        let record = test_record();

        let row = serializer.to_storage_row(&definition, Some(&record));
        let decoded = serializer.to_typed_record(&definition, Some(&row)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_missing_inputs_yield_empty_outputs() {
        let serializer = ValueSerializer::default();
        let definition = test_model();

        assert!(serializer.to_storage_row(&definition, None).is_empty());
        assert!(serializer.to_typed_record(&definition, None).unwrap().is_empty());
    }

    #[test]
    fn test_undeclared_properties_are_ignored_and_missing_are_null() {
        let serializer = ValueSerializer::default();
        let definition = test_model();
        let mut record = Record::new();
        record.insert("id".into(), json!("abc"));
        record.insert("extra".into(), json!("ignored"));

        let row = serializer.to_storage_row(&definition, Some(&record));
        assert!(!row.contains_key("extra"));
        assert_eq!(row["aString"], DatabaseValue::Null);

        let values = serializer.to_storage_values(&definition, &record);
        assert_eq!(values.len(), definition.properties().len());
        assert_eq!(values[0], DatabaseValue::String("abc".into()));
    }

    #[test]
    fn test_encode_property_uses_the_declared_type() {
        use chrono::{TimeZone, Utc};

        let serializer = ValueSerializer::default();
        let definition = test_model();
        let timestamp = json!("2022-04-03T00:00:00Z");

        assert_eq!(
            serializer.encode_property(&definition, "aString", &timestamp),
            DatabaseValue::String("2022-04-03T00:00:00Z".into())
        );
        assert_eq!(
            serializer.encode_property(&definition, "aDate", &json!("2022-04-03")),
            DatabaseValue::DateTime(Utc.with_ymd_and_hms(2022, 4, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(
            serializer.encode_property(&definition, "undeclared", &json!(7)),
            DatabaseValue::Int64(7)
        );
    }
}
