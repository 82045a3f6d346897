//! Shared helpers for the HTTP integration tests. Every app runs over a
//! fresh in-memory store.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use finance_tracker::{build_router, config::Config, state::AppState, store::{MemoryStore, Stores}};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::{str::FromStr, sync::{Arc, Once}, time::Duration};
use tower::util::ServiceExt;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,finance_tracker=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: None,
        database_max_connections: 1,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry_hours: 1,
        bcrypt_cost: 4,
        live_summary_idle_secs: 0,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_stores(Stores::from_backend(Arc::new(MemoryStore::new())))
    }

    pub fn with_stores(stores: Stores) -> Self {
        init_tracing();
        let state = AppState::new(stores, test_config());
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> StatusCode {
        self.request(Method::DELETE, uri, Some(token), None).await.0
    }

    /// Signs up `username` and returns the bearer token.
    pub async fn signup(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                Some(json!({
                    "fullName": "Test User",
                    "username": username,
                    "password": "hunter22"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Polls the live summary until `accept` holds or two seconds pass.
    pub async fn wait_for_live(&self, token: &str, accept: impl Fn(&Value) -> bool) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let (status, body) = self.get("/api/v1/summary/live", token).await;
            assert_eq!(status, StatusCode::OK);
            if accept(&body) {
                return body;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("live summary never matched; last: {}", body);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

/// Reads a decimal that the API serialises as a JSON string.
pub fn amount(value: &Value) -> Option<Decimal> {
    value.as_str().map(|s| Decimal::from_str(s).unwrap())
}

pub fn budget_item(category: &str, item_type: &str, planned: i64) -> Value {
    json!({
        "monthYear": "2025-06",
        "category": category,
        "type": item_type,
        "itemName": format!("{} line", category),
        "plannedAmount": planned
    })
}

pub fn loan(name: &str, monthly: i64) -> Value {
    json!({
        "loanName": name,
        "totalLoanAmount": 500000,
        "interestRate": 9.5,
        "loanTermMonths": 60,
        "monthlyPaymentCalculated": monthly
    })
}
