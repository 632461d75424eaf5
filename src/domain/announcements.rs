//! Classified announcements (community notices, events, lost & found)

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
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub contact_phone: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing for Announcement {
    const KIND: ListingKind = ListingKind::Announcements;

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
pub struct CreateAnnouncementRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub title: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub content: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub category: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_phone: Option<String>,
}

impl Validate for CreateAnnouncementRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 3, MAX_NAME_LEN)
            .text("content", &self.content, 10, MAX_TEXT_LEN)
            .text("category", &self.category, 2, MAX_NAME_LEN);
        check_contact_fields(
            &mut v,
            self.location.as_deref(),
            self.image_url.as_deref(),
            self.contact_phone.as_deref(),
            None,
        );
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnouncementRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub image_url: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_phone: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateAnnouncementRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.optional_text("title", self.title.as_deref(), 3, MAX_NAME_LEN)
            .optional_text("content", self.content.as_deref(), 10, MAX_TEXT_LEN)
            .optional_text("category", self.category.as_deref(), 2, MAX_NAME_LEN);
        check_contact_fields(
            &mut v,
            patch_value(&self.location),
            patch_value(&self.image_url),
            patch_value(&self.contact_phone),
            None,
        );
        v.finish()
    }
}

impl UpdateAnnouncementRequest {
    pub fn apply(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(category) = self.category {
            announcement.category = category;
        }
        apply_patch(&mut announcement.location, self.location);
        apply_patch(&mut announcement.image_url, self.image_url);
        apply_patch(&mut announcement.contact_phone, self.contact_phone);
        if let Some(active) = self.is_active {
            announcement.is_active = active;
        }
        announcement.updated_at = Utc::now();
    }
}
