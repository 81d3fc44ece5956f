//! Field classification of indexed documents.
//!
//! The compiler asks a [`DocumentMapping`] which fields are directly queryable
//! at the current scope, which of them hold multiple values, and which nested
//! mapping applies below a nested field. [`MappingSchema`] is a declarative
//! implementation that can be built in code or loaded from JSON:
//!
//! ```
//! use docquery::mapping::{DocumentMapping, MappingSchema};
//!
//! let members = MappingSchema::builder("Member")
//!     .add_field("referencedComponentId")
//!     .build();
//! let concept = MappingSchema::builder("Concept")
//!     .add_field("id")
//!     .add_collection_field("ancestors")
//!     .add_nested_field("members", members)
//!     .build();
//!
//! assert!(concept.is_selectable("id"));
//! assert!(concept.is_collection("ancestors"));
//! assert!(!concept.is_selectable("members"));
//! assert_eq!(concept.nested_mapping("members").unwrap().type_as_string(), "Member");
//! ```

use std::fmt::Debug;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Field-classification view of one document type at one nesting scope.
pub trait DocumentMapping: Send + Sync + Debug {
    /// Fields directly queryable at this scope.
    fn selectable_fields(&self) -> Vec<&str>;

    /// Whether `field` is one of [`selectable_fields`](Self::selectable_fields).
    fn is_selectable(&self, field: &str) -> bool {
        self.selectable_fields().contains(&field)
    }

    /// Whether `field` may hold several independent values per document.
    fn is_collection(&self, field: &str) -> bool;

    /// The mapping of the nested documents stored under `field`.
    fn nested_mapping(&self, field: &str) -> Result<&dyn DocumentMapping>;

    /// Name of the mapped type, for diagnostics.
    fn type_as_string(&self) -> String;
}

/// Mapping of a single field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldMapping {
    /// The field holds an array of values.
    #[serde(default)]
    pub collection: bool,
    /// Mapping of the nested documents held by this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<MappingSchema>>,
}

/// Declarative [`DocumentMapping`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSchema {
    /// Name of the mapped document type.
    pub type_name: String,
    /// Field mappings in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldMapping>,
}

impl MappingSchema {
    pub fn new(type_name: impl Into<String>) -> Self {
        MappingSchema {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn builder(type_name: impl Into<String>) -> MappingSchemaBuilder {
        MappingSchemaBuilder {
            schema: MappingSchema::new(type_name),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }
}

impl DocumentMapping for MappingSchema {
    fn selectable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, mapping)| mapping.nested.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn is_selectable(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .is_some_and(|mapping| mapping.nested.is_none())
    }

    fn is_collection(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .is_some_and(|mapping| mapping.collection || mapping.nested.is_some())
    }

    fn nested_mapping(&self, field: &str) -> Result<&dyn DocumentMapping> {
        match self.fields.get(field).and_then(|mapping| mapping.nested.as_deref()) {
            Some(nested) => Ok(nested),
            None => Err(QueryError::unknown_nested_field(&self.type_name, field)),
        }
    }

    fn type_as_string(&self) -> String {
        self.type_name.clone()
    }
}

/// Builder for [`MappingSchema`].
#[derive(Debug)]
pub struct MappingSchemaBuilder {
    schema: MappingSchema,
}

impl MappingSchemaBuilder {
    /// Add a single-valued field.
    pub fn add_field(mut self, name: impl Into<String>) -> Self {
        self.schema.fields.insert(name.into(), FieldMapping::default());
        self
    }

    /// Add a multi-valued field.
    pub fn add_collection_field(mut self, name: impl Into<String>) -> Self {
        self.schema.fields.insert(
            name.into(),
            FieldMapping {
                collection: true,
                nested: None,
            },
        );
        self
    }

    /// Add a field holding nested documents described by `mapping`.
    pub fn add_nested_field(mut self, name: impl Into<String>, mapping: MappingSchema) -> Self {
        self.schema.fields.insert(
            name.into(),
            FieldMapping {
                collection: true,
                nested: Some(Box::new(mapping)),
            },
        );
        self
    }

    pub fn build(self) -> MappingSchema {
        self.schema
    }
}
