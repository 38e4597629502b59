//! Product record and its `Products` sub-collection mapping.

use crate::codec::{DocumentCodec, FieldReader};
use crate::store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FIELD_NAME: &str = "name";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_PRICE: &str = "price";

/// Item sold by one vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    /// Whole currency units.
    pub price: i64,
}

impl DocumentCodec for Product {
    fn encode(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(FIELD_NAME.into(), Value::from(self.name.as_str()));
        doc.insert(FIELD_CATEGORY.into(), Value::from(self.category.as_str()));
        doc.insert(FIELD_DESCRIPTION.into(), Value::from(self.description.as_str()));
        doc.insert(FIELD_IMAGE.into(), Value::from(self.image.as_str()));
        doc.insert(FIELD_PRICE.into(), Value::from(self.price));
        doc
    }

    fn decode_lenient(fields: &FieldReader<'_>) -> Self {
        Self {
            name: fields.string(FIELD_NAME),
            category: fields.string(FIELD_CATEGORY),
            description: fields.string(FIELD_DESCRIPTION),
            image: fields.string(FIELD_IMAGE),
            price: fields.require_integer(FIELD_PRICE).unwrap_or_default(),
        }
    }

    fn decode_strict(fields: &FieldReader<'_>) -> Option<Self> {
        Some(Self {
            name: fields.require_string(FIELD_NAME)?,
            category: fields.require_string(FIELD_CATEGORY)?,
            description: fields.require_string(FIELD_DESCRIPTION)?,
            image: fields.require_string(FIELD_IMAGE)?,
            price: fields.require_integer(FIELD_PRICE)?,
        })
    }
}
