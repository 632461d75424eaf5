pub mod admin;
pub mod auth;
pub mod health;
pub mod listings;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::{Announcement, Job, Product, Service};

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::get_me))
        // Listings
        .merge(listings::routes::<Product>())
        .merge(listings::routes::<Service>())
        .merge(listings::routes::<Job>())
        .merge(listings::routes::<Announcement>())
        // Users
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Admin
        .route("/api/admin/stats", get(admin::get_admin_stats))
        .route("/api/admin/pending", get(admin::list_pending))
        .route("/api/admin/logs", get(admin::list_audit_logs))
        .route("/api/admin/backup", get(admin::get_backup_info))
        .route("/api/admin/backup/export", get(admin::export_backup))
        .route("/api/admin/users/:id/role", put(admin::change_user_role))
        .route("/api/admin/users/:id/status", put(admin::change_user_status))
        .route("/api/admin/:kind/:id/approve", put(admin::approve_listing))
        .route("/api/admin/:kind/:id/reject", put(admin::reject_listing))
}
