//! Job postings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    apply_patch, blank_as_none, check_contact_fields, clearable, patch_value, trimmed, trimmed_opt,
    Listing, ListingKind, Patch,
};
use crate::validation::{Validate, ValidationErrors, Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

/// Employment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Temporary,
    Freelance,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::FullTime => write!(f, "full_time"),
            JobType::PartTime => write!(f, "part_time"),
            JobType::Contract => write!(f, "contract"),
            JobType::Temporary => write!(f, "temporary"),
            JobType::Freelance => write!(f, "freelance"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company: String,
    pub category: String,
    pub location: Option<String>,
    pub job_type: JobType,
    /// Optional numeric string (monthly, KWD)
    pub salary: Option<String>,
    pub requirements: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing for Job {
    const KIND: ListingKind = ListingKind::Jobs;

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
pub struct CreateJobRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub title: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub description: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub company: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub category: String,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub requirements: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contact_phone: Option<String>,
}

impl Validate for CreateJobRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 3, MAX_NAME_LEN)
            .text("description", &self.description, 10, MAX_TEXT_LEN)
            .text("company", &self.company, 2, MAX_NAME_LEN)
            .text("category", &self.category, 2, MAX_NAME_LEN)
            .optional_text("requirements", self.requirements.as_deref(), 3, MAX_TEXT_LEN);
        if let Some(salary) = &self.salary {
            v.numeric("salary", salary);
        }
        check_contact_fields(
            &mut v,
            self.location.as_deref(),
            None,
            self.contact_phone.as_deref(),
            self.contact_email.as_deref(),
        );
        if self.contact_email.is_none() && self.contact_phone.is_none() {
            v.error("contact_email", "an email or phone number is required");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub category: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default, deserialize_with = "clearable")]
    pub location: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub salary: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub requirements: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_email: Patch<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub contact_phone: Patch<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateJobRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.optional_text("title", self.title.as_deref(), 3, MAX_NAME_LEN)
            .optional_text("description", self.description.as_deref(), 10, MAX_TEXT_LEN)
            .optional_text("company", self.company.as_deref(), 2, MAX_NAME_LEN)
            .optional_text("category", self.category.as_deref(), 2, MAX_NAME_LEN)
            .optional_text("requirements", patch_value(&self.requirements), 3, MAX_TEXT_LEN);
        if let Some(salary) = patch_value(&self.salary) {
            v.numeric("salary", salary);
        }
        check_contact_fields(
            &mut v,
            patch_value(&self.location),
            None,
            patch_value(&self.contact_phone),
            patch_value(&self.contact_email),
        );
        if self.contact_email == Some(None) && self.contact_phone == Some(None) {
            v.error("contact_email", "an email or phone number is required");
        }
        v.finish()
    }
}

impl UpdateJobRequest {
    /// Checks that need the stored job: at least one contact channel must remain.
    pub fn check_against(&self, job: &Job) -> Result<(), ValidationErrors> {
        let keeps = |patch: &Patch<String>, stored: &Option<String>| match patch {
            Some(value) => value.is_some(),
            None => stored.is_some(),
        };
        if keeps(&self.contact_email, &job.contact_email)
            || keeps(&self.contact_phone, &job.contact_phone)
        {
            return Ok(());
        }
        Err(ValidationErrors::single(
            "contact_email",
            "an email or phone number is required",
        ))
    }

    pub fn apply(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(category) = self.category {
            job.category = category;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        apply_patch(&mut job.location, self.location);
        apply_patch(&mut job.salary, self.salary);
        apply_patch(&mut job.requirements, self.requirements);
        apply_patch(&mut job.contact_email, self.contact_email);
        apply_patch(&mut job.contact_phone, self.contact_phone);
        if let Some(active) = self.is_active {
            job.is_active = active;
        }
        job.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_type_defaults_to_full_time() {
        let req: CreateJobRequest = serde_json::from_value(json!({
            "title": "Accountant",
            "description": "Bookkeeping for a trading company in Hawalli",
            "company": "Nile Trading",
            "category": "finance",
            "contact_phone": "+965 9999 0000"
        }))
        .unwrap();
        assert_eq!(req.job_type, JobType::FullTime);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn a_contact_channel_is_required() {
        let req: CreateJobRequest = serde_json::from_value(json!({
            "title": "Driver",
            "description": "Delivery driver with a valid Kuwaiti licence",
            "company": "Fast Couriers",
            "category": "transport",
            "salary": "250"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err().fields(), vec!["contact_email"]);
    }

    #[test]
    fn unknown_job_type_fails_to_parse() {
        let parsed = serde_json::from_value::<CreateJobRequest>(json!({
            "title": "Driver",
            "description": "Delivery driver with a valid Kuwaiti licence",
            "company": "Fast Couriers",
            "category": "transport",
            "job_type": "forever"
        }));
        assert!(parsed.is_err());
    }
}
