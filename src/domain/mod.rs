//! Domain types and DTOs
//!
//! Record shapes for users and the four listing kinds, their request DTOs
//! and validation rules.

pub mod admin;
pub mod announcements;
pub mod jobs;
pub mod products;
pub mod services;
pub mod users;

pub use announcements::*;
pub use jobs::*;
pub use products::*;
pub use services::*;
pub use users::*;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::validation::{Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

/// The moderated entity kinds: products, services, jobs and announcements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Products,
    Services,
    Jobs,
    Announcements,
}

impl ListingKind {
    pub const ALL: [ListingKind; 4] = [
        ListingKind::Products,
        ListingKind::Services,
        ListingKind::Jobs,
        ListingKind::Announcements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Services => "services",
            Self::Jobs => "jobs",
            Self::Announcements => "announcements",
        }
    }

    /// Singular noun used in messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Products => "Product",
            Self::Services => "Service",
            Self::Jobs => "Job",
            Self::Announcements => "Announcement",
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation fields shared by every listing.
pub trait Listing {
    const KIND: ListingKind;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Option<Uuid>;
    fn is_approved(&self) -> bool;
    fn is_active(&self) -> bool;

    /// Visible to anonymous visitors.
    fn is_public(&self) -> bool {
        self.is_approved() && self.is_active()
    }
}

/// Server-side fields attached to a listing at creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingMeta {
    pub user_id: Option<Uuid>,
    pub is_approved: bool,
}

/// Filter for listing queries. `job_type` only applies to jobs.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<Uuid>,
    pub approved: Option<bool>,
    pub include_inactive: bool,
    pub job_type: Option<JobType>,
}

impl ListingFilter {
    /// Filter that only sees what anonymous visitors may see.
    pub fn public() -> Self {
        Self {
            approved: Some(true),
            ..Self::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            approved: Some(false),
            include_inactive: true,
            ..Self::default()
        }
    }

    /// In-memory evaluation; the SQL backend expresses the same predicate in its WHERE clause.
    pub fn matches(
        &self,
        category: &str,
        searchable: &[Option<&str>],
        owner: Option<Uuid>,
        approved: bool,
        active: bool,
    ) -> bool {
        if let Some(wanted) = self.approved {
            if wanted != approved {
                return false;
            }
        }
        if !self.include_inactive && !active {
            return false;
        }
        if let Some(user_id) = self.user_id {
            if owner != Some(user_id) {
                return false;
            }
        }
        if let Some(cat) = self.category.as_deref() {
            if !category.eq_ignore_ascii_case(cat) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                searchable
                    .iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// A nullable column in a partial update. `None` leaves the stored value
/// alone; `Some(None)` clears it.
pub type Patch<T> = Option<Option<T>>;

/// Required text fields are stored without surrounding whitespace.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Like [`trimmed`] for fields that may be omitted from a partial update.
pub(crate) fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

/// Forms submit `""` for untouched optional inputs; treat those as absent.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Present in an update body: `null` or `""` clears the field.
/// Only called when the key is present; absent keys fall back to `None`.
pub(crate) fn clearable<'de, D>(deserializer: D) -> Result<Patch<String>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer).map(Some)
}

/// The new value carried by a patch, if it sets one.
pub(crate) fn patch_value(patch: &Patch<String>) -> Option<&str> {
    patch.as_ref().and_then(|value| value.as_deref())
}

pub(crate) fn apply_patch<T>(target: &mut Option<T>, patch: Patch<T>) {
    if let Some(value) = patch {
        *target = value;
    }
}

/// Checks shared by listing create requests: optional contact and image fields.
pub(crate) fn check_contact_fields(
    v: &mut Validator,
    location: Option<&str>,
    image_url: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) {
    v.optional_text("location", location, 2, MAX_NAME_LEN);
    if let Some(url) = image_url {
        v.url("image_url", url).max_len("image_url", url, MAX_TEXT_LEN);
    }
    if let Some(phone) = phone {
        v.phone("contact_phone", phone);
    }
    if let Some(email) = email {
        v.email("contact_email", email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_kind_round_trips_through_path_segments() {
        let kind: ListingKind = serde_json::from_str("\"announcements\"").unwrap();
        assert_eq!(kind, ListingKind::Announcements);
        assert_eq!(kind.to_string(), "announcements");
        assert!(serde_json::from_str::<ListingKind>("\"cars\"").is_err());
    }

    #[test]
    fn public_filter_hides_pending_and_inactive() {
        let filter = ListingFilter::public();
        assert!(filter.matches("food", &[], None, true, true));
        assert!(!filter.matches("food", &[], None, false, true));
        assert!(!filter.matches("food", &[], None, true, false));
    }

    #[test]
    fn search_is_case_insensitive_over_any_field() {
        let filter = ListingFilter {
            search: Some("KISRA".into()),
            ..ListingFilter::default()
        };
        assert!(filter.matches("food", &[Some("Fresh kisra daily"), None], None, true, true));
        assert!(!filter.matches("food", &[Some("Ful medames")], None, true, true));
    }

    #[derive(Debug, Deserialize)]
    struct Edit {
        #[serde(default, deserialize_with = "clearable")]
        location: Patch<String>,
    }

    #[test]
    fn clearable_tells_absent_from_cleared() {
        let parse = |body: serde_json::Value| serde_json::from_value::<Edit>(body).unwrap();
        assert_eq!(parse(serde_json::json!({})).location, None);
        assert_eq!(parse(serde_json::json!({ "location": null })).location, Some(None));
        assert_eq!(parse(serde_json::json!({ "location": " " })).location, Some(None));
        assert_eq!(
            parse(serde_json::json!({ "location": " Salmiya " })).location,
            Some(Some("Salmiya".to_string()))
        );
    }
}
