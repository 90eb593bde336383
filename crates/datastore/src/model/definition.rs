//! Model Definitions - property descriptors and semantic type tags

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DatastoreError, DatastoreResult};

/// Semantic type of a property, independent of how it is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    UniqueId,
    Text,
    BigText,
    Integer,
    Number,
    Boolean,
    Date,
    Datetime,
    Object,
    Array,
    ModelReference,
    Email,
    /// Any type tag the built-in registry does not know about
    Custom(String),
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::UniqueId => write!(f, "UniqueId"),
            PropertyType::Text => write!(f, "Text"),
            PropertyType::BigText => write!(f, "BigText"),
            PropertyType::Integer => write!(f, "Integer"),
            PropertyType::Number => write!(f, "Number"),
            PropertyType::Boolean => write!(f, "Boolean"),
            PropertyType::Date => write!(f, "Date"),
            PropertyType::Datetime => write!(f, "Datetime"),
            PropertyType::Object => write!(f, "Object"),
            PropertyType::Array => write!(f, "Array"),
            PropertyType::ModelReference => write!(f, "ModelReference"),
            PropertyType::Email => write!(f, "Email"),
            PropertyType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A single property descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub property_type: PropertyType,
    pub required: bool,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, property_type: PropertyType, required: bool) -> Self {
        Self {
            name: name.into(),
            property_type,
            required,
        }
    }
}

/// Ordered property map with exactly one primary key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelDefinitionWire", into = "ModelDefinitionWire")]
pub struct ModelDefinition {
    name: String,
    /// Index of the primary key in `properties`
    primary_key: usize,
    properties: Vec<PropertyDefinition>,
}

#[derive(Serialize, Deserialize)]
struct ModelDefinitionWire {
    name: String,
    primary_key: String,
    properties: Vec<PropertyDefinition>,
}

impl TryFrom<ModelDefinitionWire> for ModelDefinition {
    type Error = DatastoreError;

    fn try_from(wire: ModelDefinitionWire) -> DatastoreResult<Self> {
        ModelDefinition::new(wire.name, wire.primary_key, wire.properties)
    }
}

impl From<ModelDefinition> for ModelDefinitionWire {
    fn from(definition: ModelDefinition) -> Self {
        Self {
            primary_key: definition.primary_key_name().to_string(),
            name: definition.name,
            properties: definition.properties,
        }
    }
}

impl ModelDefinition {
    /// Create a definition, checking that property names are unique and the
    /// primary key is one of them.
    pub fn new(
        name: impl Into<String>,
        primary_key: impl Into<String>,
        properties: Vec<PropertyDefinition>,
    ) -> DatastoreResult<Self> {
        let name = name.into();
        let primary_key = primary_key.into();

        if name.is_empty() {
            return Err(DatastoreError::InvalidDefinition(
                "Model name cannot be empty".to_string(),
            ));
        }

        for (i, property) in properties.iter().enumerate() {
            if properties[..i].iter().any(|p| p.name == property.name) {
                return Err(DatastoreError::InvalidDefinition(format!(
                    "Property '{}' is declared more than once on '{}'",
                    property.name, name
                )));
            }
        }

        let Some(primary_key) = properties.iter().position(|p| p.name == primary_key) else {
            return Err(DatastoreError::InvalidDefinition(format!(
                "Primary key '{}' is not a property of '{}'",
                primary_key, name
            )));
        };

        Ok(Self {
            name,
            primary_key,
            properties,
        })
    }

    /// Start building a definition
    pub fn builder(name: impl Into<String>) -> ModelDefinitionBuilder {
        ModelDefinitionBuilder {
            name: name.into(),
            primary_key: None,
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key_property().name
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[PropertyDefinition] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Descriptor of the primary key property
    pub fn primary_key_property(&self) -> &PropertyDefinition {
        &self.properties[self.primary_key]
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }
}

/// Fluent builder for [`ModelDefinition`]
#[derive(Debug, Clone)]
pub struct ModelDefinitionBuilder {
    name: String,
    primary_key: Option<String>,
    properties: Vec<PropertyDefinition>,
}

impl ModelDefinitionBuilder {
    /// Declare the primary key property
    pub fn primary_key(mut self, name: &str, property_type: PropertyType) -> Self {
        self.primary_key = Some(name.to_string());
        self.properties
            .push(PropertyDefinition::new(name, property_type, true));
        self
    }

    /// Declare a required property
    pub fn required(mut self, name: &str, property_type: PropertyType) -> Self {
        self.properties
            .push(PropertyDefinition::new(name, property_type, true));
        self
    }

    /// Declare an optional property
    pub fn optional(mut self, name: &str, property_type: PropertyType) -> Self {
        self.properties
            .push(PropertyDefinition::new(name, property_type, false));
        self
    }

    pub fn build(self) -> DatastoreResult<ModelDefinition> {
        let primary_key = self.primary_key.ok_or_else(|| {
            DatastoreError::InvalidDefinition(format!(
                "Model '{}' has no primary key",
                self.name
            ))
        })?;
        ModelDefinition::new(self.name, primary_key, self.properties)
    }
}
