// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the zonekit client library.
//!
//! This module provides specialized error types for:
//! - Record and zone-file validation (malformed names, payloads, TTL tokens)
//! - Protocol failures against the remote store (transport, bad JSON,
//!   error-typed API responses)
//! - Authentication failures (login exchange, missing endpoint resolution)
//!
//! Validation errors are always surfaced synchronously before any network
//! call; protocol and auth errors propagate to the immediate caller with no
//! local recovery or retry, because the remote store is the sole source of
//! truth for ordering and idempotency.

use thiserror::Error;

/// Errors raised while validating record data or converting zone-file text.
///
/// These are always produced before any network effect: a multi-record write
/// either fully validates or is rejected locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Domain name is empty or otherwise unusable
    #[error("Invalid domain name '{name}': {reason}")]
    InvalidName {
        /// The offending name (may be empty)
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A record submitted for a write carries no values
    #[error("Record '{name}' ({rr_type}) has an empty rr_set")]
    EmptyRrSet {
        /// Owner name of the offending record
        name: String,
        /// Record type token (e.g. "A")
        rr_type: String,
    },

    /// A per-kind payload field is absent or out of its declared range
    #[error("Invalid {rr_type} record payload: {reason}")]
    InvalidRecordPayload {
        /// Record type token
        rr_type: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Attempted to merge rr_sets of two different record kinds
    #[error("Cannot merge a {right} rr_set into a {left} rr_set")]
    RecordKindMismatch {
        /// Kind of the receiving rr_set
        left: String,
        /// Kind of the incoming rr_set
        right: String,
    },

    /// A required numeric component of a zone-file value could not be parsed
    #[error("Failed to parse {rr_type} field '{field}' from token '{token}'")]
    ParseError {
        /// Record type token
        rr_type: String,
        /// Name of the positional field
        field: &'static str,
        /// The token that failed to parse
        token: String,
    },

    /// A TTL-like token does not survive an integer round-trip
    ///
    /// Guards against non-numeric and malformed numeric tokens: parsing the
    /// token and printing the result must reproduce the original text.
    #[error("'{token}' is not a valid 32-bit TTL value")]
    InvalidNumber {
        /// The offending token
        token: String,
    },

    /// Zone-file text has no `$ORIGIN` and the caller supplied no zone name
    #[error("Zone file has no $ORIGIN directive and no zone name was supplied")]
    MissingOrigin,

    /// Zone-file text contains no SOA record
    #[error("Zone file contains no SOA record")]
    MissingSoa,

    /// Raw key material has the wrong length for P-256
    #[error("Expected {expected} bytes of key material, got {actual}")]
    InvalidKeyLength {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },

    /// Key material is not valid base64
    #[error("Key material is not valid base64: {reason}")]
    InvalidKeyEncoding {
        /// Decoder error text
        reason: String,
    },
}

/// Errors raised by the request/response protocol against the remote store.
///
/// Request bodies embedded in these errors have their credentials replaced
/// with a redaction marker before the error is constructed, so the raw
/// password never reaches logs or error text.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The HTTP transport failed before a response was produced
    #[error("Transport failure calling '{method}': {source}")]
    Transport {
        /// The API method being called
        method: &'static str,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The response body is not valid JSON
    #[error("Response from '{method}' is not valid JSON; request body {body}, response: {response}")]
    InvalidJson {
        /// The API method being called
        method: &'static str,
        /// Redacted JSON request body
        body: String,
        /// Raw response text
        response: String,
    },

    /// The remote store answered with an error-typed response
    #[error("API error from '{method}'; request body {body}, response: {response}")]
    Api {
        /// The API method being called
        method: &'static str,
        /// Redacted JSON request body
        body: String,
        /// Raw response text
        response: String,
    },
}

/// Errors raised while acquiring or using credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login exchange was rejected by the remote store
    #[error("Login rejected by the authentication service (HTTP {status}): {response}")]
    LoginRejected {
        /// HTTP status code of the rejection
        status: u16,
        /// Raw response text
        response: String,
    },

    /// A privileged call was attempted before the endpoint was resolved
    #[error("API endpoint not resolved; init() has not completed")]
    NotInitialized,
}

/// Composite error type for all zonekit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Record or zone-file validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Protocol failure against the remote store
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Authentication failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Filesystem failure while reading zone-file text
    #[error("I/O failure reading zone file: {0}")]
    Io(#[from] std::io::Error),

    /// A configured or discovered endpoint is not a valid URL
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
