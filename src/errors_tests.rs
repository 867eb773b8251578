// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

use crate::errors::{AuthError, Error, ProtocolError, ValidationError};

#[test]
fn test_validation_error_display() {
    let err = ValidationError::InvalidNumber {
        token: "notanumber".to_string(),
    };
    assert_eq!(err.to_string(), "'notanumber' is not a valid 32-bit TTL value");

    let err = ValidationError::EmptyRrSet {
        name: "www.example.com.".to_string(),
        rr_type: "A".to_string(),
    };
    assert!(err.to_string().contains("www.example.com."));
    assert!(err.to_string().contains("empty rr_set"));
}

#[test]
fn test_protocol_error_display_carries_method_and_body() {
    let err = ProtocolError::Api {
        method: "set",
        body: r#"{"confidant_password":"<redacted>"}"#.to_string(),
        response: r#"{"type":"error","message":"no"}"#.to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("'set'"));
    assert!(text.contains("<redacted>"));
    assert!(text.contains(r#""message":"no""#));
}

#[test]
fn test_auth_error_display() {
    let err = AuthError::LoginRejected {
        status: 403,
        response: "permission denied".to_string(),
    };
    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("permission denied"));
}

#[test]
fn test_composite_error_is_transparent() {
    let err: Error = ValidationError::MissingSoa.into();
    assert_eq!(err.to_string(), "Zone file contains no SOA record");

    let err: Error = AuthError::NotInitialized.into();
    assert!(err.to_string().contains("init()"));
}
