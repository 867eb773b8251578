// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared helpers for the client integration tests.

use std::sync::Once;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonekit::client::{ClientConfig, ControlClient};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cret-confidant-password";
pub const TOKEN: &str = "test-bearer-token";

static TRACING: Once = Once::new();

/// Install a subscriber once per test binary so `RUST_LOG` surfaces the
/// client's request/response logging during test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .compact()
            .init();
    });
}

/// Start a mock control plane serving login, service discovery and the API
/// on one server.
pub async fn mock_control_plane() -> MockServer {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "api_endpoint": server.uri() })),
        )
        .mount(&server)
        .await;

    server
}

/// A client wired to the mock control plane, API endpoint via discovery.
pub fn client_for(server: &MockServer) -> ControlClient {
    ControlClient::new(ClientConfig::new(USERNAME, PASSWORD, &server.uri()))
}

/// A success response envelope with the given data field.
pub fn success_body(data: serde_json::Value) -> serde_json::Value {
    json!({ "type": "success", "message": "ok", "time": 1.0, "data": data })
}

/// An error response envelope.
pub fn error_body(message: &str) -> serde_json::Value {
    json!({ "type": "error", "message": message, "time": 1.0 })
}
