//! Shared fixtures for API tests.
//!
//! Every test builds the full router over its own in-memory SQLite database
//! and mints tokens with the same `JwtService` the middleware validates with.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use serde_json::Value;
use tower::ServiceExt;

use cafedesk_api::{AppState, create_router};
use cafedesk_db::entities::{
    cafes, customers, dining_tables, menu_items, order_items, orders, payments,
};
use cafedesk_db::repositories::{CafeRepository, CreateCafeInput};
use cafedesk_shared::config::CorsConfig;
use cafedesk_shared::types::{CafeId, StaffId};
use cafedesk_shared::{JwtService, StaffRole};

pub const TEST_SECRET: &str = "test-secret-for-api-tests";

/// Router plus the handles tests need to seed data and mint tokens.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub jwt: JwtService,
}

impl TestApp {
    /// Builds the router over a fresh in-memory database.
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        let builder = db.get_database_backend();
        let schema = Schema::new(builder);
        let statements = [
            schema.create_table_from_entity(cafes::Entity),
            schema.create_table_from_entity(customers::Entity),
            schema.create_table_from_entity(dining_tables::Entity),
            schema.create_table_from_entity(menu_items::Entity),
            schema.create_table_from_entity(orders::Entity),
            schema.create_table_from_entity(order_items::Entity),
            schema.create_table_from_entity(payments::Entity),
        ];
        for stmt in &statements {
            db.execute(builder.build(stmt))
                .await
                .expect("Failed to create table");
        }

        let jwt = JwtService::new(TEST_SECRET, 3600);
        let state = AppState::new(db.clone(), jwt.clone());
        let router = create_router(state, &CorsConfig::default());

        Self { router, db, jwt }
    }

    /// Registers a café directly through the repository.
    pub async fn cafe(&self, subdomain: &str) -> CafeId {
        let cafe = CafeRepository::new(self.db.clone())
            .create(CreateCafeInput {
                name: format!("Cafe {subdomain}"),
                subdomain: subdomain.to_string(),
            })
            .await
            .expect("Failed to create cafe");
        CafeId::from_uuid(cafe.id)
    }

    /// Mints a token for a staff member of the café.
    pub fn token(&self, cafe_id: CafeId, role: StaffRole) -> String {
        self.jwt
            .generate_access_token(StaffId::new(), cafe_id, role)
            .expect("Failed to mint token")
    }

    /// Sends a request and returns the status with the parsed JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_with_headers(method, uri, token, body, &[]).await
    }

    /// Like `send`, with extra request headers.
    pub async fn send_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// Reads a money field, serialized as a decimal string.
pub fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("Invalid decimal string"),
        Value::Number(n) => n.to_string().parse().expect("Invalid decimal number"),
        other => panic!("Expected a decimal, got {other}"),
    }
}

/// Reads an id field.
pub fn id(value: &Value) -> String {
    value["id"].as_str().expect("Missing id").to_string()
}
