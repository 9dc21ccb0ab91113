//! HTTP API - axum router over the core operations.
//!
//! Handlers stay thin: extract the caller and input, call one core function, and
//! return its result as JSON. Errors become responses through
//! [`IntoResponse`](axum::response::IntoResponse) on [`crate::errors::Error`].

pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod users;

use crate::config::settings::AppConfig;
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool, shared between handlers
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundles a connection and configuration.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the full application router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .merge(menu::router())
        .merge(orders::router())
        .merge(reservations::router())
        .merge(users::router())
        .merge(admin::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::seed, errors::Result, test_utils::*};
    use auth::USER_ID_HEADER;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN: &str = "admin-1";
    const GUEST: &str = "guest-1";

    async fn test_app() -> Result<(Router, Arc<DatabaseConnection>)> {
        let db = Arc::new(setup_test_db().await?);
        seed::bootstrap_admin(&db, ADMIN, "Owner").await?;
        let app = router(AppState::new(Arc::clone(&db), AppConfig::default()));
        Ok((app, db))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a category and one item through the admin API, returning the item id.
    async fn admin_adds_burger(app: &Router) -> i64 {
        let (status, category) = send(
            app,
            "POST",
            "/api/admin/categories",
            Some(ADMIN),
            Some(json!({ "name": "Burgers" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, item) = send(
            app,
            "POST",
            "/api/admin/menu-items",
            Some(ADMIN),
            Some(json!({
                "name": "Classic Burger",
                "price": 12.5,
                "category_id": category["id"],
                "preparation_time": 15
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        item["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let (app, _db) = test_app().await?;
        let (status, body) = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_cloned_state_shares_connection() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let state = AppState::new(Arc::clone(&db), AppConfig::default());
        let copy = state.clone();

        assert!(Arc::ptr_eq(&state.db, &copy.db));
        assert!(Arc::ptr_eq(&state.config, &copy.config));
        copy.db.ping().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_input_gets_json_error_body() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send(&app, "GET", "/api/menu/not-a-number", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");

        let (status, body) = send(&app, "GET", "/api/menu?page=first", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");

        // Well-formed JSON with the wrong shape
        let (status, body) = send(
            &app,
            "POST",
            "/api/reservations",
            Some(GUEST),
            Some(json!({ "guests": "two" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");
        assert!(body["message"].as_str().unwrap().starts_with("Invalid argument"));

        // Not JSON at all
        let request = Request::builder()
            .method("POST")
            .uri("/api/cart/items")
            .header(USER_ID_HEADER, GUEST)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid_argument");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() -> Result<()> {
        let (app, _db) = test_app().await?;
        let (status, body) = send(&app, "GET", "/api/orders/draft", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, body) = send(&app, "GET", "/api/admin/users", Some(GUEST), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let (status, _) = send(&app, "GET", "/api/admin/reservations", Some(GUEST), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, users) = send(&app, "GET", "/api/admin/users", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users[0]["id"], ADMIN);
        assert_eq!(users[0]["roles"], json!(["Admin"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_staff_can_list_reservations_after_grant() -> Result<()> {
        let (app, db) = test_app().await?;
        create_test_user(&db, "waiter").await?;

        let (status, _) = send(
            &app,
            "POST",
            "/api/admin/users/waiter/roles",
            Some(ADMIN),
            Some(json!({ "role": "Staff" })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/api/admin/reservations", Some("waiter"), None).await;
        assert_eq!(status, StatusCode::OK);

        // Still not an admin
        let (status, _) = send(&app, "GET", "/api/admin/tables", Some("waiter"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            "DELETE",
            "/api/admin/users/waiter/roles/staff",
            Some(ADMIN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/api/admin/reservations", Some("waiter"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_menu_item_is_not_found() -> Result<()> {
        let (app, _db) = test_app().await?;
        let (status, body) = send(&app, "GET", "/api/menu/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_reservation_date_is_bad_request() -> Result<()> {
        let (app, _db) = test_app().await?;
        let (status, body) = send(
            &app,
            "POST",
            "/api/reservations",
            Some(GUEST),
            Some(json!({ "date": "2025-03-15 19:30", "guests": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_date");
        Ok(())
    }

    #[tokio::test]
    async fn test_reservation_roundtrip_and_privacy() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, created) = send(
            &app,
            "POST",
            "/api/reservations",
            Some(GUEST),
            Some(json!({ "date": "15-03-2025 19:30", "guests": 2, "is_outdoor": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["date"], "15-03-2025 19:30");
        let uri = format!("/api/reservations/{}", created["id"]);

        // Other guests cannot see it, the admin can
        let (status, _) = send(&app, "GET", &uri, Some("guest-2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, canceled) =
            send(&app, "POST", &format!("{uri}/cancel"), Some(GUEST), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(canceled["is_canceled"], true);

        let (_, mine) = send(&app, "GET", "/api/reservations", Some(GUEST), None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_cart_to_checkout_flow() -> Result<()> {
        let (app, _db) = test_app().await?;
        let burger_id = admin_adds_burger(&app).await;

        let (status, menu) = send(&app, "GET", "/api/menu?search=classic", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu["total"], 1);

        let (status, cart) = send(
            &app,
            "POST",
            "/api/cart/items",
            Some(GUEST),
            Some(json!({ "menu_item_id": burger_id, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["total"], 25.0);
        let line_id = cart["items"][0]["id"].as_i64().unwrap();

        let (_, count) = send(&app, "GET", "/api/cart/count", Some(GUEST), None).await;
        assert_eq!(count["count"], 2);

        // Someone else's line looks absent
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/cart/items/{line_id}"),
            Some("guest-2"),
            Some(json!({ "quantity": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, cart) = send(
            &app,
            "PUT",
            &format!("/api/cart/items/{line_id}"),
            Some(GUEST),
            Some(json!({ "quantity": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["total"], 37.5);

        let (status, order) =
            send(&app, "POST", "/api/orders/draft/checkout", Some(GUEST), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "Completed");

        // Completed orders cannot change again
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/orders/{}", order["id"]),
            Some(ADMIN),
            Some(json!({ "status": "Canceled" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_operation");

        let (_, orders) = send(&app, "GET", "/api/orders", Some(GUEST), None).await;
        assert_eq!(orders.as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_deleted_item_leaves_menu_until_restored() -> Result<()> {
        let (app, _db) = test_app().await?;
        let burger_id = admin_adds_burger(&app).await;
        let item_uri = format!("/api/admin/menu-items/{burger_id}");

        let (status, _) = send(&app, "DELETE", &item_uri, Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, menu) = send(&app, "GET", "/api/menu", None, None).await;
        assert_eq!(menu["total"], 0);
        let (_, deleted) = send(&app, "GET", "/api/admin/menu-items/deleted", Some(ADMIN), None).await;
        assert_eq!(deleted.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "POST", &format!("{item_uri}/restore"), Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, menu) = send(&app, "GET", "/api/menu", None, None).await;
        assert_eq!(menu["total"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_update() -> Result<()> {
        let (app, _db) = test_app().await?;

        let (status, _) = send(&app, "GET", "/api/users/me", Some(GUEST), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, me) = send(
            &app,
            "PUT",
            "/api/users/me",
            Some(GUEST),
            Some(json!({ "display_name": "Pat", "email": "pat@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["display_name"], "Pat");
        assert_eq!(me["roles"], json!([]));
        Ok(())
    }
}
