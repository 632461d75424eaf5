//! Product listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    apply_patch, blank_as_none, check_contact_fields, clearable, patch_value, trimmed, trimmed_opt,
    Listing, ListingKind, Patch,
};
use crate::validation::{Validate, ValidationErrors, Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Numeric string, e.g. "12.500" (KWD)
    pub price: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_whatsapp: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing for Product {
    const KIND: ListingKind = ListingKind::Products;

    fn id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> Option<Uuid> {
        self.user_id
    }
    fn is_approved(&self) -> bool {
        self.is_approved
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Request DTO for creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub category: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub price: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_whatsapp: Option<String>,
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 2, MAX_NAME_LEN)
            .text("description", &self.description, 10, MAX_TEXT_LEN)
            .text("category", &self.category, 2, MAX_NAME_LEN)
            .numeric("price", &self.price);
        check_contact_fields(
            &mut v,
            self.location.as_deref(),
            self.image_url.as_deref(),
            self.contact_phone.as_deref(),
            None,
        );
        if let Some(whatsapp) = &self.contact_whatsapp {
            v.phone("contact_whatsapp", whatsapp);
        }
        v.finish()
    }
}

/// Request DTO for updating a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub image_url: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_phone: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_whatsapp: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.optional_text("name", self.name.as_deref(), 2, MAX_NAME_LEN)
            .optional_text("description", self.description.as_deref(), 10, MAX_TEXT_LEN)
            .optional_text("category", self.category.as_deref(), 2, MAX_NAME_LEN);
        if let Some(price) = &self.price {
            v.numeric("price", price);
        }
        check_contact_fields(
            &mut v,
            patch_value(&self.location),
            patch_value(&self.image_url),
            patch_value(&self.contact_phone),
            None,
        );
        if let Some(whatsapp) = patch_value(&self.contact_whatsapp) {
            v.phone("contact_whatsapp", whatsapp);
        }
        v.finish()
    }
}

impl UpdateProductRequest {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        apply_patch(&mut product.location, self.location);
        apply_patch(&mut product.image_url, self.image_url);
        apply_patch(&mut product.contact_phone, self.contact_phone);
        apply_patch(&mut product.contact_whatsapp, self.contact_whatsapp);
        if let Some(active) = self.is_active {
            product.is_active = active;
        }
        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> CreateProductRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn valid_product_passes() {
        let req = request(json!({
            "name": "Sudanese coffee (jebena)",
            "description": "Traditional clay pot with four cups",
            "category": "home",
            "price": "7.500",
            "contact_phone": "+965 5555 1234",
            "image_url": ""
        }));
        assert!(req.validate().is_ok());
        assert_eq!(req.image_url, None);
    }

    #[test]
    fn short_fields_and_bad_price_are_reported() {
        let req = request(json!({
            "name": "x",
            "description": "short",
            "category": "home",
            "price": "cheap"
        }));
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["name", "description", "price"]);
    }

    #[test]
    fn update_rejects_blank_name_but_allows_absent() {
        let absent = UpdateProductRequest::default();
        assert!(absent.validate().is_ok());

        let blank = UpdateProductRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.validate().unwrap_err().fields(), vec!["name"]);
    }
}
