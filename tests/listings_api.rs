mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

use common::{product_body, start_server, start_with, test_settings};
use sudanese_house_backend::storage::MemoryStorage;

#[tokio::test]
async fn health_reports_memory_backend() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["backend"], "memory");
    Ok(())
}

#[tokio::test]
async fn invalid_listing_names_every_failing_field() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .post(app.url("/api/products"))
        .json(&json!({
            "name": "x",
            "description": "short",
            "price": "cheap",
            "image_url": "not a url"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "البيانات المدخلة غير صحيحة");
    let mut fields: Vec<&str> = body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec!["category", "description", "image_url", "name", "price"]
    );
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .post(app.url("/api/jobs"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["errors"][0]["field"], "body");
    Ok(())
}

#[tokio::test]
async fn pending_listing_is_hidden_until_approved() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (seller, _) = app.register("seller").await?;

    let res = app
        .client
        .post(app.url("/api/products"))
        .bearer_auth(&seller)
        .json(&product_body("Homemade kisra"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["data"]["is_approved"], false);
    assert_eq!(created["data"]["price"], "1.500");

    // Anonymous visitors see nothing yet
    let list: Value = app
        .client
        .get(app.url("/api/products"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["pagination"]["total_items"], 0);
    let res = app
        .client
        .get(app.url(&format!("/api/products/{id}")))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The owner still can
    let res = app
        .client
        .get(app.url(&format!("/api/products/{id}")))
        .bearer_auth(&seller)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Moderators see it in the queue and approve it
    let admin = app.admin_token().await?;
    let pending: Value = app
        .client
        .get(app.url("/api/admin/pending"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(pending["data"]["products"][0]["id"], id.as_str());

    let res = app
        .client
        .put(app.url(&format!("/api/admin/products/{id}/approve")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let list: Value = app
        .client
        .get(app.url("/api/products?category=FOOD&search=kisra"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["pagination"]["total_items"], 1);
    assert_eq!(list["data"][0]["name"], "Homemade kisra");
    Ok(())
}

#[tokio::test]
async fn auto_approve_publishes_immediately() -> anyhow::Result<()> {
    let settings = sudanese_house_backend::config::Settings {
        auto_approve_listings: true,
        ..test_settings()
    };
    let app = start_with(settings, Arc::new(MemoryStorage::new())).await?;

    let res = app
        .client
        .post(app.url("/api/announcements"))
        .json(&json!({
            "title": "Community iftar",
            "content": "Everyone is welcome at the community hall on Friday",
            "category": "events"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["data"]["is_approved"], true);
    assert_eq!(created["data"]["user_id"], Value::Null);

    let list: Value = app
        .client
        .get(app.url("/api/announcements"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["data"][0]["title"], "Community iftar");
    Ok(())
}

#[tokio::test]
async fn only_owner_or_moderator_may_change_a_listing() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (owner, _) = app.register("owner").await?;
    let (stranger, _) = app.register("stranger").await?;

    let created: Value = app
        .client
        .post(app.url("/api/services"))
        .bearer_auth(&owner)
        .json(&json!({
            "name": "Tailoring",
            "description": "Jalabiya and toub tailoring in Farwaniya",
            "category": "clothing",
            "contact_email": "tailor@example.com"
        }))
        .send()
        .await?
        .json()
        .await?;
    let path = format!(
        "/api/services/{}",
        created["data"]["id"].as_str().unwrap_or_default()
    );

    let res = app
        .client
        .put(app.url(&path))
        .json(&json!({ "price": "5" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&stranger)
        .json(&json!({ "price": "5" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .client
        .delete(app.url(&path))
        .bearer_auth(&stranger)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&owner)
        .json(&json!({ "price": "7.250", "is_active": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["data"]["price"], "7.250");
    assert_eq!(updated["data"]["is_active"], false);
    assert_eq!(updated["data"]["name"], "Tailoring");

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&owner)
        .json(&json!({ "price": "-1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .client
        .delete(app.url(&path))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app
        .client
        .get(app.url(&path))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn jobs_filter_by_type_and_paginate() -> anyhow::Result<()> {
    let app = start_server().await?;
    let admin = app.admin_token().await?;

    for (i, job_type) in ["full_time", "part_time", "part_time"].iter().enumerate() {
        let res = app
            .client
            .post(app.url("/api/jobs"))
            .bearer_auth(&admin)
            .json(&json!({
                "title": format!("Cashier {i}"),
                "description": "Evening shifts at a grocery in Jleeb Al-Shuyoukh",
                "company": "Blue Nile Grocery",
                "category": "retail",
                "job_type": job_type,
                "salary": "180",
                "contact_phone": "+965 6000 0000"
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let list: Value = app
        .client
        .get(app.url("/api/jobs?job_type=part_time&per_page=1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list["pagination"]["total_items"], 2);
    assert_eq!(list["pagination"]["total_pages"], 2);
    assert_eq!(list["pagination"]["has_next"], true);
    assert_eq!(list["data"][0]["title"], "Cashier 2");

    let res = app
        .client
        .get(app.url("/api/jobs?job_type=forever"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.client.get(app.url("/api/jobs/not-a-uuid")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn register_login_and_me() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (token, id) = app.register("Fatima").await?;

    let me: Value = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(me["data"]["id"], id.as_str());
    assert_eq!(me["data"]["role"], "user");
    assert!(me["data"].get("password_hash").is_none());

    // Usernames are case-insensitive
    let res = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "username": "fatima",
            "email": "other@example.com",
            "full_name": "Someone Else",
            "password": "secret123"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    assert!(app.login("FATIMA", "secret123").await.is_ok());
    let res = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "fatima", "password": "wrong-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth("garbage")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn optional_fields_can_be_cleared() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (seller, _) = app.register("seller").await?;

    let created: Value = app
        .client
        .post(app.url("/api/products"))
        .bearer_auth(&seller)
        .json(&product_body("Bamia powder"))
        .send()
        .await?
        .json()
        .await?;
    let path = format!(
        "/api/products/{}",
        created["data"]["id"].as_str().unwrap_or_default()
    );
    assert_eq!(created["data"]["location"], "Hawalli");

    // Omitted fields are untouched
    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&seller)
        .json(&json!({ "name": "Dried bamia powder" }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["location"], "Hawalli");

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&seller)
        .json(&json!({ "location": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["location"], Value::Null);
    assert_eq!(body["data"]["contact_phone"], "+965 5555 1234");

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&seller)
        .json(&json!({ "contact_phone": null }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["contact_phone"], Value::Null);

    let fetched: Value = app
        .client
        .get(app.url(&path))
        .bearer_auth(&seller)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched["data"]["location"], Value::Null);
    assert_eq!(fetched["data"]["name"], "Dried bamia powder");
    Ok(())
}

#[tokio::test]
async fn jobs_keep_at_least_one_contact_channel() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (employer, _) = app.register("employer").await?;

    let created: Value = app
        .client
        .post(app.url("/api/jobs"))
        .bearer_auth(&employer)
        .json(&json!({
            "title": "Nanny",
            "description": "Live-out nanny for two children in Mishref",
            "company": "Private household",
            "category": "domestic",
            "salary": "200",
            "contact_phone": "+965 6111 2222"
        }))
        .send()
        .await?
        .json()
        .await?;
    let path = format!(
        "/api/jobs/{}",
        created["data"]["id"].as_str().unwrap_or_default()
    );

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&employer)
        .json(&json!({ "contact_phone": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["errors"][0]["field"], "contact_email");

    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&employer)
        .json(&json!({
            "contact_phone": null,
            "contact_email": "family@example.com",
            "salary": ""
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["contact_phone"], Value::Null);
    assert_eq!(body["data"]["contact_email"], "family@example.com");
    assert_eq!(body["data"]["salary"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn text_fields_are_stored_trimmed() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .post(app.url("/api/products"))
        .json(&json!({
            "name": "  Sudanese perfume oil ",
            "description": " Dukhan and khumra sets, locally blended ",
            "category": " beauty ",
            "price": " 99 ",
            "location": "  Farwaniya  "
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Sudanese perfume oil");
    assert_eq!(body["data"]["category"], "beauty");
    assert_eq!(body["data"]["price"], "99");
    assert_eq!(body["data"]["location"], "Farwaniya");

    let path = format!(
        "/api/products/{}",
        body["data"]["id"].as_str().unwrap_or_default()
    );
    let admin = app.admin_token().await?;
    let res = app
        .client
        .put(app.url(&path))
        .bearer_auth(&admin)
        .json(&json!({ "price": " 12.500 " }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["price"], "12.500");
    Ok(())
}
