//! Core Model Traits - the contract the adapter consumes
//!
//! A [`Model`] describes a record type by its [`ModelDefinition`]. A
//! [`ModelInstance`] carries one record of a model and produces its plain
//! typed representation on demand.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::definition::ModelDefinition;
use crate::error::{DatastoreError, DatastoreResult};

/// Plain typed representation of a record: property name to JSON value
pub type Record = serde_json::Map<String, JsonValue>;

/// A model type known to the datastore
pub trait Model: Send + Sync + Debug {
    /// Property descriptors for this model
    fn definition(&self) -> &ModelDefinition;

    /// Model name, used for table naming and batch homogeneity checks
    fn name(&self) -> &str {
        self.definition().name()
    }

    /// Primary key property name
    fn primary_key_name(&self) -> &str {
        self.definition().primary_key_name()
    }
}

impl Model for ModelDefinition {
    fn definition(&self) -> &ModelDefinition {
        self
    }
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn definition(&self) -> &ModelDefinition {
        (**self).definition()
    }
}

/// A single record of some model
#[async_trait]
pub trait ModelInstance: Send + Sync {
    /// Model this instance belongs to
    fn model(&self) -> &dyn Model;

    /// Produce the plain typed record. May be asynchronous.
    async fn to_record(&self) -> DatastoreResult<Record>;

    /// Primary key value of this instance
    async fn primary_key(&self) -> DatastoreResult<JsonValue> {
        let key = self.model().primary_key_name().to_string();
        let record = self.to_record().await?;
        match record.get(&key) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(DatastoreError::MissingPrimaryKey(key)),
        }
    }
}

/// Record-backed model instance
#[derive(Debug, Clone)]
pub struct Instance {
    model: Arc<ModelDefinition>,
    data: Record,
}

impl Instance {
    pub fn new(model: Arc<ModelDefinition>, data: Record) -> Self {
        Self { model, data }
    }

    /// Build an instance from any serializable struct whose fields match the
    /// model's property names.
    pub fn from_serializable<T: Serialize>(
        model: Arc<ModelDefinition>,
        value: &T,
    ) -> DatastoreResult<Self> {
        match serde_json::to_value(value)? {
            JsonValue::Object(data) => Ok(Self { model, data }),
            other => Err(DatastoreError::InvalidDefinition(format!(
                "Instance of '{}' must serialize to an object, got {}",
                model.name(),
                other
            ))),
        }
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn into_data(self) -> Record {
        self.data
    }
}

#[async_trait]
impl ModelInstance for Instance {
    fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    async fn to_record(&self) -> DatastoreResult<Record> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::definition::PropertyType;
    use serde_json::json;

    fn simple_model() -> Arc<ModelDefinition> {
        Arc::new(
            ModelDefinition::builder("SimpleModel")
                .primary_key("id", PropertyType::UniqueId)
                .required("name", PropertyType::Text)
                .build()
                .unwrap(),
        )
    }

    #[derive(Serialize)]
    struct Simple {
        id: &'static str,
        name: &'static str,
    }

    #[tokio::test]
    async fn test_instance_from_serializable() {
        let instance = Instance::from_serializable(
            simple_model(),
            &Simple { id: "abc", name: "hello" },
        )
        .unwrap();

        assert_eq!(instance.model().name(), "SimpleModel");
        assert_eq!(instance.primary_key().await.unwrap(), json!("abc"));
        assert_eq!(instance.data().get("name"), Some(&json!("hello")));
    }

    #[tokio::test]
    async fn test_null_primary_key_is_missing() {
        let mut data = Record::new();
        data.insert("id".to_string(), JsonValue::Null);
        let instance = Instance::new(simple_model(), data);

        assert!(matches!(
            instance.primary_key().await,
            Err(DatastoreError::MissingPrimaryKey(key)) if key == "id"
        ));
    }

    #[test]
    fn test_non_object_instance_is_rejected() {
        let result = Instance::from_serializable(simple_model(), &vec![1, 2, 3]);
        assert!(matches!(result, Err(DatastoreError::InvalidDefinition(_))));
    }
}
