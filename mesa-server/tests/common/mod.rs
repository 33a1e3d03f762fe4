//! Helpers shared by the integration tests
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use mesa_server::{AppState, Config, api};

pub const PASSWORD: &str = "correct-horse-42";

pub async fn app() -> Router {
    app_with(&Config::for_tests()).await
}

pub async fn app_with(config: &Config) -> Router {
    let state = AppState::new(config).await.expect("state");
    api::create_router(state)
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("encode")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

/// POST with a JSON body, asserting 200; returns `data`
pub async fn post_ok(app: &Router, uri: &str, token: &str, body: Value) -> Value {
    let (status, response) = call(app, Method::POST, uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{response}");
    response["data"].clone()
}

pub async fn onboard(app: &Router, slug: &str) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/restaurants",
        None,
        Some(json!({
            "name": "Casa Mesa",
            "slug": slug,
            "admin_email": "admin@casa.test",
            "admin_name": "Ana",
            "admin_password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["restaurant"]["slug"], slug);
}

pub async fn login(app: &Router, slug: &str, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "slug": slug, "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().expect("token").to_string()
}

pub async fn create_staff(app: &Router, admin: &str, email: &str, role: &str) {
    let staff = json!({
        "email": email,
        "name": role,
        "password": PASSWORD,
        "role": role,
        "hourly_rate": 12.5,
    });
    post_ok(app, "/api/users", admin, staff).await;
}

/// One category with an 18.00 steak; returns the menu item id
pub async fn seed_menu(app: &Router, admin: &str) -> i64 {
    let category = post_ok(app, "/api/menu/categories", admin, json!({ "name": "Mains" })).await;
    let category_id = category["id"].as_i64().expect("category id");
    let item = json!({ "category_id": category_id, "name": "Steak", "price": 18.0 });
    let item = post_ok(app, "/api/menu/items", admin, item).await;
    item["id"].as_i64().expect("item id")
}
