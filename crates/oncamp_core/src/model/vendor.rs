//! Vendor record and its `Vendors` document mapping.

use crate::codec::{DocumentCodec, FieldReader};
use crate::store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_SCHOOLS: &str = "schools";
pub const FIELD_NAME: &str = "name";
pub const FIELD_HEADER_IMAGE: &str = "headerImage";
/// Header image key written by older clients when creating a vendor.
/// Read only as a fallback; never written.
pub const FIELD_LEGACY_HEADER_IMAGE: &str = "image";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_RATING: &str = "rating";
pub const FIELD_FEATURED: &str = "featured";
pub const FIELD_PFP_URL: &str = "pfpUrl";

/// Marketplace vendor profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub description: String,
    /// School names the vendor serves.
    pub schools: Vec<String>,
    pub name: String,
    pub header_image: String,
    pub category: String,
    pub rating: f64,
    /// Store-managed; upserts never write it.
    pub featured: bool,
    pub pfp_url: String,
}

impl Vendor {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    fn header_image_from(fields: &FieldReader<'_>) -> Option<String> {
        fields
            .require_string(FIELD_HEADER_IMAGE)
            .or_else(|| fields.require_string(FIELD_LEGACY_HEADER_IMAGE))
    }
}

impl DocumentCodec for Vendor {
    fn encode(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(FIELD_DESCRIPTION.into(), Value::from(self.description.as_str()));
        doc.insert(FIELD_SCHOOLS.into(), Value::from(self.schools.clone()));
        doc.insert(FIELD_NAME.into(), Value::from(self.name.as_str()));
        doc.insert(FIELD_HEADER_IMAGE.into(), Value::from(self.header_image.as_str()));
        doc.insert(FIELD_CATEGORY.into(), Value::from(self.category.as_str()));
        doc.insert(FIELD_RATING.into(), Value::from(self.rating));
        doc.insert(FIELD_PFP_URL.into(), Value::from(self.pfp_url.as_str()));
        doc
    }

    fn decode_lenient(fields: &FieldReader<'_>) -> Self {
        Self {
            description: fields.string(FIELD_DESCRIPTION),
            schools: fields.string_list(FIELD_SCHOOLS),
            name: fields.string(FIELD_NAME),
            header_image: Self::header_image_from(fields).unwrap_or_default(),
            category: fields.string(FIELD_CATEGORY),
            rating: fields.number(FIELD_RATING),
            featured: fields.flag(FIELD_FEATURED),
            pfp_url: fields.string(FIELD_PFP_URL),
        }
    }

    /// `featured` stays optional because upserts do not write it.
    fn decode_strict(fields: &FieldReader<'_>) -> Option<Self> {
        Some(Self {
            description: fields.require_string(FIELD_DESCRIPTION)?,
            schools: fields.require_string_list(FIELD_SCHOOLS)?,
            name: fields.require_string(FIELD_NAME)?,
            header_image: Self::header_image_from(fields)?,
            category: fields.require_string(FIELD_CATEGORY)?,
            rating: fields.require_number(FIELD_RATING)?,
            featured: fields.flag(FIELD_FEATURED),
            pfp_url: fields.require_string(FIELD_PFP_URL)?,
        })
    }

    /// JSON has no NaN or infinity; such a rating would be stored as null.
    fn validate(&self) -> Result<(), String> {
        if !self.rating.is_finite() {
            return Err(format!("rating must be a finite number, got {}", self.rating));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Vendor, FIELD_FEATURED, FIELD_HEADER_IMAGE};
    use crate::codec::{DocumentCodec, FieldReader};
    use crate::store::Document;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn encode_writes_header_image_and_skips_featured() {
        let mut vendor = Vendor::new("Cafe", "Food");
        vendor.header_image = "https://img/header.png".to_string();
        vendor.featured = true;

        let encoded = vendor.encode();
        assert_eq!(encoded[FIELD_HEADER_IMAGE], "https://img/header.png");
        assert!(!encoded.contains_key("image"));
        assert!(!encoded.contains_key(FIELD_FEATURED));
    }

    #[test]
    fn lenient_decode_reads_legacy_image_key() {
        let data = doc(json!({"name": "Cafe", "image": "legacy.png"}));
        let vendor = Vendor::decode_lenient(&FieldReader::new(&data));
        assert_eq!(vendor.header_image, "legacy.png");

        let data = doc(json!({"headerImage": "new.png", "image": "legacy.png"}));
        let vendor = Vendor::decode_lenient(&FieldReader::new(&data));
        assert_eq!(vendor.header_image, "new.png");
    }

    #[test]
    fn strict_decode_requires_all_written_fields() {
        let data = doc(json!({
            "description": "d",
            "schools": ["MIT"],
            "name": "Cafe",
            "headerImage": "h",
            "category": "Food",
            "rating": 4.5,
            "pfpUrl": "p"
        }));
        let vendor = Vendor::decode_strict(&FieldReader::new(&data)).unwrap();
        assert!(!vendor.featured);

        let data = doc(json!({"name": "Cafe"}));
        assert_eq!(Vendor::decode_strict(&FieldReader::new(&data)), None);
    }

    #[test]
    fn validate_rejects_non_finite_rating() {
        let mut vendor = Vendor::new("Cafe", "Food");
        vendor.rating = 4.5;
        assert_eq!(vendor.validate(), Ok(()));

        for rating in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            vendor.rating = rating;
            assert!(vendor.validate().unwrap_err().contains("finite"));
        }
    }

    #[test]
    fn serialization_uses_camel_case_wire_names() {
        let json = serde_json::to_value(Vendor::new("Cafe", "Food")).unwrap();
        assert_eq!(json["name"], "Cafe");
        assert_eq!(json["headerImage"], "");
        assert_eq!(json["pfpUrl"], "");
    }
}
