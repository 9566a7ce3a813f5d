//! Item records stored in the catalog

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single catalog record.
///
/// Only `id` is typed. Everything else, including `name` and `price`, is kept
/// as the JSON it arrived as, so records are written back exactly as read and
/// a create payload is stored without any schema check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Create an item with just a name and a price
    pub fn new(id: i64, name: impl Into<String>, price: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("price".to_string(), price.into());
        Self { id, fields }
    }

    /// The name, or `""` when it is missing or not a string
    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or("")
    }

    /// Price used for aggregates. Missing or non-numeric prices count as zero.
    pub fn price_or_zero(&self) -> f64 {
        self.fields
            .get("price")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Case-insensitive substring match on the name. A name that is not a
    /// string never matches.
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        match self.fields.get("name") {
            Some(Value::String(name)) => name.to_lowercase().contains(needle_lower),
            _ => false,
        }
    }

    /// Front-end route for this item's detail view
    pub fn link(&self) -> String {
        format!("/items/{}", self.id)
    }
}

/// Payload accepted when creating an item: any JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewItem {
    pub fields: Map<String, Value>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.into()));
        fields.insert("price".to_string(), price.into());
        Self { fields }
    }

    /// Set an arbitrary field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach the generated id. A client-supplied `id` is discarded.
    pub fn into_item(mut self, id: i64) -> Item {
        self.fields.remove("id");
        Item {
            id,
            fields: self.fields,
        }
    }
}
