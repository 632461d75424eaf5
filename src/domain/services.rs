//! Service listings (tradespeople, tutoring, transport, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    apply_patch, blank_as_none, check_contact_fields, clearable, patch_value, trimmed, trimmed_opt,
    Listing, ListingKind, Patch,
};
use crate::validation::{Validate, ValidationErrors, Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Optional numeric string; many services are "price on request"
    pub price: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing for Service {
    const KIND: ListingKind = ListingKind::Services;

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

#[derive(Debug, Clone, Deserialize)]
pub struct CreateServiceRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub category: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_email: Option<String>,
}

impl Validate for CreateServiceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 2, MAX_NAME_LEN)
            .text("description", &self.description, 10, MAX_TEXT_LEN)
            .text("category", &self.category, 2, MAX_NAME_LEN);
        if let Some(price) = &self.price {
            v.numeric("price", price);
        }
        check_contact_fields(
            &mut v,
            self.location.as_deref(),
            self.image_url.as_deref(),
            self.contact_phone.as_deref(),
            self.contact_email.as_deref(),
        );
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServiceRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub price: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub image_url: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_phone: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_email: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateServiceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.optional_text("name", self.name.as_deref(), 2, MAX_NAME_LEN)
            .optional_text("description", self.description.as_deref(), 10, MAX_TEXT_LEN)
            .optional_text("category", self.category.as_deref(), 2, MAX_NAME_LEN);
        if let Some(price) = patch_value(&self.price) {
            v.numeric("price", price);
        }
        check_contact_fields(
            &mut v,
            patch_value(&self.location),
            patch_value(&self.image_url),
            patch_value(&self.contact_phone),
            patch_value(&self.contact_email),
        );
        v.finish()
    }
}

impl UpdateServiceRequest {
    pub fn apply(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        apply_patch(&mut service.price, self.price);
        apply_patch(&mut service.location, self.location);
        apply_patch(&mut service.image_url, self.image_url);
        apply_patch(&mut service.contact_phone, self.contact_phone);
        apply_patch(&mut service.contact_email, self.contact_email);
        if let Some(active) = self.is_active {
            service.is_active = active;
        }
        service.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn price_is_optional_but_must_be_numeric_when_given() {
        let ok: CreateServiceRequest = serde_json::from_value(json!({
            "name": "Home tutoring",
            "description": "Maths and Arabic for secondary school students",
            "category": "education",
            "price": ""
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: CreateServiceRequest = serde_json::from_value(json!({
            "name": "Home tutoring",
            "description": "Maths and Arabic for secondary school students",
            "category": "education",
            "price": "negotiable",
            "contact_email": "not-an-email"
        }))
        .unwrap();
        assert_eq!(bad.validate().unwrap_err().fields(), vec!["price", "contact_email"]);
    }
}
