// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed request/response client for the remote authoritative store.
//!
//! The store exposes exactly six operations - `get`, `set`, `delete`,
//! `search`, `health` and `get-zone-records` - each a single POST of a JSON
//! body to `{endpoint}/{method}`. Every body carries the client username and
//! the confidant password; an optional perimeter HTTP Basic-Auth credential
//! rides on every request as an independent network-level boundary.
//!
//! # Lifecycle
//!
//! A [`ControlClient`] lazily runs `Uninitialized -> TokenAcquired ->
//! ConfigResolved` on first use: it exchanges its password for a short-lived
//! bearer token, fetches the service-discovery config unless the API
//! endpoint was overridden, and derives the API endpoint. Each step is
//! idempotent and the whole sequence is guarded by a mutex so concurrent
//! first calls single-flight. The token is cached for the client's lifetime;
//! there is no refresh-on-expiry, an expired token simply surfaces as an
//! authentication error from the store on the next call.
//!
//! # Failure policy
//!
//! There are no retries and no client-side timeouts; the remote store is the
//! sole source of truth for ordering and idempotency, so failures propagate
//! to the caller immediately. With `throw_errors` disabled, error-typed
//! responses and decode failures are returned as data instead of raised, so
//! batch callers can record per-domain failures and continue.
//!
//! Request bodies embedded in errors or logs have their credentials replaced
//! with a redaction marker first.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::try_join_all;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

use crate::constants::{CONFIG_PATH, LOGIN_PATH, REDACTION_MARKER};
use crate::errors::{AuthError, Error, ProtocolError, ValidationError};
use crate::names::absolute_name;
use crate::records::{ApiRecord, KeysRemoved, RecordGlob, RecordIdentifier, RrSet};

/// The six methods of the store's API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Set,
    Delete,
    Search,
    Health,
    GetZoneRecords,
}

impl ApiMethod {
    /// URL path segment of this method.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Health => "health",
            Self::GetZoneRecords => "get-zone-records",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Success/error discriminator of every store response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Success,
    Error,
}

/// The envelope every store response arrives in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Success/error discriminator
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Human-readable outcome description
    pub message: String,
    /// Server-side processing time
    #[serde(default)]
    pub time: f64,
    /// Method-specific payload; absent on errors and for `set`/`health`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// True when the store reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::Success
    }
}

/// Perimeter HTTP Basic-Auth credential, independent of the
/// application-level credential embedded in request bodies.
#[derive(Clone, Debug)]
pub struct PerimeterAuth {
    /// Basic-Auth username
    pub username: String,
    /// Basic-Auth password
    pub password: String,
}

/// Service-discovery document fetched from the config store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the store's API
    pub api_endpoint: String,
}

/// Configuration of a [`ControlClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Application-level username sent in every request body
    pub username: String,
    /// Application-level password; exchanged for a bearer token at init and
    /// sent in every request body
    pub confidant_password: String,
    /// Base URL of the config/service-discovery store (also serves login)
    pub config_endpoint: String,
    /// API endpoint override; skips service discovery when set
    pub api_endpoint: Option<String>,
    /// Optional perimeter Basic-Auth credential
    pub perimeter_auth: Option<PerimeterAuth>,
    /// Raise error-typed responses and decode failures as errors (default
    /// true); when false they are returned as structured error responses
    pub throw_errors: bool,
}

impl ClientConfig {
    /// Build a config with the mandatory fields and defaults for the rest.
    #[must_use]
    pub fn new(username: &str, confidant_password: &str, config_endpoint: &str) -> Self {
        Self {
            username: username.to_string(),
            confidant_password: confidant_password.to_string(),
            config_endpoint: build_api_url(config_endpoint),
            api_endpoint: None,
            perimeter_auth: None,
            throw_errors: true,
        }
    }

    /// Skip service discovery and talk to `endpoint` directly.
    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: &str) -> Self {
        self.api_endpoint = Some(build_api_url(endpoint));
        self
    }

    /// Attach a perimeter Basic-Auth credential to every request.
    #[must_use]
    pub fn with_perimeter_auth(mut self, username: &str, password: &str) -> Self {
        self.perimeter_auth = Some(PerimeterAuth {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Return error-typed responses as data instead of raising them.
    #[must_use]
    pub fn with_throw_errors(mut self, throw_errors: bool) -> Self {
        self.throw_errors = throw_errors;
        self
    }
}

/// Cached mutable client state, filled in by [`ControlClient::init`].
#[derive(Debug, Default)]
struct ClientState {
    token: Option<String>,
    service_config: Option<ServiceConfig>,
    endpoint: Option<String>,
}

/// Client for the remote authoritative store.
pub struct ControlClient {
    http: HttpClient,
    config: ClientConfig,
    state: Mutex<ClientState>,
}

/// Auth envelope wrapped around every request body.
#[derive(Serialize)]
struct RequestEnvelope<'a, T: Serialize> {
    client_username: &'a str,
    confidant_password: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct IdentifiersRequest<'a> {
    records: &'a [RecordIdentifier],
}

#[derive(Serialize)]
struct SetRequest<'a> {
    records: &'a [ApiRecord],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    globs: &'a [RecordGlob],
}

#[derive(Serialize)]
struct HealthRequest {}

#[derive(Serialize)]
struct GetZoneRecordsRequest {
    names: Vec<String>,
}

impl ControlClient {
    /// Build a client; no network traffic happens until the first call.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: HttpClient::new(),
            config,
            state: Mutex::new(ClientState::default()),
        }
    }

    /// Run the init sequence to completion: acquire a bearer token, resolve
    /// the service-discovery config unless the endpoint is overridden, and
    /// derive the API endpoint.
    ///
    /// Idempotent per step; already-satisfied steps are no-ops. Guarded so
    /// concurrent callers single-flight rather than each re-fetching.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LoginRejected`] when the store rejects the
    /// password exchange, and protocol errors for unreachable or malformed
    /// config responses.
    pub async fn init(&self) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        if state.token.is_none() {
            state.token = Some(self.login().await?);
        }

        if state.service_config.is_none() && self.config.api_endpoint.is_none() {
            let token = state.token.as_deref().ok_or(AuthError::NotInitialized)?;
            state.service_config = Some(self.fetch_service_config(token).await?);
        }

        if state.endpoint.is_none() {
            let endpoint = match &self.config.api_endpoint {
                Some(endpoint) => endpoint.clone(),
                None => {
                    let config = state
                        .service_config
                        .as_ref()
                        .ok_or(AuthError::NotInitialized)?;
                    build_api_url(&config.api_endpoint)
                }
            };
            // Reject malformed endpoints here instead of on every call.
            Url::parse(&endpoint)?;
            info!(endpoint = %endpoint, "resolved API endpoint");
            state.endpoint = Some(endpoint);
        }

        Ok(())
    }

    /// Read records by `(name, rr_type)` key.
    ///
    /// # Errors
    ///
    /// Protocol errors per the crate failure policy.
    pub async fn get(
        &self,
        records: &[RecordIdentifier],
    ) -> Result<ApiResponse<Vec<ApiRecord>>, Error> {
        self.request(ApiMethod::Get, &IdentifiersRequest { records })
            .await
    }

    /// Write records. The whole batch is validated locally first; a failing
    /// record rejects the batch before any network effect.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for invalid records, protocol errors otherwise.
    pub async fn set(&self, records: &[ApiRecord]) -> Result<ApiResponse<()>, Error> {
        for record in records {
            record.validate_for_write()?;
        }
        self.request(ApiMethod::Set, &SetRequest { records }).await
    }

    /// Delete records by `(name, rr_type)` key; the response reports how
    /// many keys the store removed.
    ///
    /// # Errors
    ///
    /// Protocol errors per the crate failure policy.
    pub async fn delete(
        &self,
        records: &[RecordIdentifier],
    ) -> Result<ApiResponse<KeysRemoved>, Error> {
        self.request(ApiMethod::Delete, &IdentifiersRequest { records })
            .await
    }

    /// Search records by name and type globs.
    ///
    /// # Errors
    ///
    /// Protocol errors per the crate failure policy.
    pub async fn search(
        &self,
        globs: &[RecordGlob],
    ) -> Result<ApiResponse<Vec<ApiRecord>>, Error> {
        self.request(ApiMethod::Search, &SearchRequest { globs })
            .await
    }

    /// Probe the store's health.
    ///
    /// # Errors
    ///
    /// Protocol errors per the crate failure policy.
    pub async fn health(&self) -> Result<ApiResponse<()>, Error> {
        self.request(ApiMethod::Health, &HealthRequest {}).await
    }

    /// Read all records of the named zones, keyed by zone name. Names are
    /// absolutized before the request is built.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidName`] for empty names, protocol errors
    /// otherwise.
    pub async fn get_zone_records(
        &self,
        names: &[&str],
    ) -> Result<ApiResponse<BTreeMap<String, Vec<ApiRecord>>>, Error> {
        let names = names
            .iter()
            .map(|name| absolute_name(name))
            .collect::<Result<Vec<_>, ValidationError>>()?;
        self.request(ApiMethod::GetZoneRecords, &GetZoneRecordsRequest { names })
            .await
    }

    /// Write a whole zone: the SOA record first (the store rejects other
    /// records for a zone without authority), then the remaining records
    /// fanned out concurrently, failing if any write fails.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingSoa`] when `records` holds no SOA,
    /// validation errors for invalid records, protocol errors otherwise.
    /// Error-typed responses fail this helper even with `throw_errors`
    /// disabled.
    pub async fn set_zone(&self, records: Vec<ApiRecord>) -> Result<(), Error> {
        for record in &records {
            record.validate_for_write()?;
        }
        let (soa, rest): (Vec<ApiRecord>, Vec<ApiRecord>) = records
            .into_iter()
            .partition(|record| matches!(record.rr_set, RrSet::Soa(_)));
        if soa.is_empty() {
            return Err(ValidationError::MissingSoa.into());
        }

        ensure_success(ApiMethod::Set, self.set(&soa).await?)?;
        let responses = try_join_all(
            rest.iter()
                .map(|record| self.set(std::slice::from_ref(record))),
        )
        .await?;
        for response in responses {
            ensure_success(ApiMethod::Set, response)?;
        }
        Ok(())
    }

    /// Exchange the stored password for a bearer token.
    async fn login(&self) -> Result<String, Error> {
        let url = format!("{}/{}", self.config.config_endpoint, LOGIN_PATH);
        debug!(url = %url, username = %self.config.username, "exchanging password for token");

        let body = LoginRequest {
            username: &self.config.username,
            password: &self.config.confidant_password,
        };
        let mut request = self.http.post(&url).json(&body);
        if let Some(perimeter) = &self.config.perimeter_auth {
            request = request.basic_auth(&perimeter.username, Some(&perimeter.password));
        }
        let response = request
            .send()
            .await
            .map_err(|source| ProtocolError::Transport {
                method: LOGIN_PATH,
                source,
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|source| ProtocolError::Transport {
                method: LOGIN_PATH,
                source,
            })?;
        if !status.is_success() {
            error!(url = %url, status = %status, "login exchange rejected");
            return Err(AuthError::LoginRejected {
                status: status.as_u16(),
                response: raw,
            }
            .into());
        }

        let login: LoginResponse =
            serde_json::from_str(&raw).map_err(|_| ProtocolError::InvalidJson {
                method: LOGIN_PATH,
                body: redacted_body(&body),
                response: raw.clone(),
            })?;
        Ok(login.token)
    }

    /// Fetch the service-discovery config with the bearer token.
    async fn fetch_service_config(&self, token: &str) -> Result<ServiceConfig, Error> {
        let url = format!("{}/{}", self.config.config_endpoint, CONFIG_PATH);
        debug!(url = %url, "fetching service-discovery config");

        let mut request = self.http.get(&url).bearer_auth(token);
        if let Some(perimeter) = &self.config.perimeter_auth {
            request = request.basic_auth(&perimeter.username, Some(&perimeter.password));
        }
        let response = request
            .send()
            .await
            .map_err(|source| ProtocolError::Transport {
                method: CONFIG_PATH,
                source,
            })?;
        let raw = response
            .text()
            .await
            .map_err(|source| ProtocolError::Transport {
                method: CONFIG_PATH,
                source,
            })?;

        serde_json::from_str(&raw).map_err(|_| {
            ProtocolError::InvalidJson {
                method: CONFIG_PATH,
                body: "{}".to_string(),
                response: raw,
            }
            .into()
        })
    }

    /// The resolved API endpoint, running [`ControlClient::init`] on demand.
    async fn api_endpoint(&self) -> Result<String, Error> {
        self.init().await?;
        let state = self.state.lock().await;
        state.endpoint.clone().ok_or_else(|| AuthError::NotInitialized.into())
    }

    /// One POST of `body` to `{endpoint}/{method}` with the auth envelope.
    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: ApiMethod,
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        let endpoint = self.api_endpoint().await?;
        let url = format!("{}/{}", endpoint, method.path());
        let envelope = RequestEnvelope {
            client_username: &self.config.username,
            confidant_password: &self.config.confidant_password,
            body,
        };
        debug!(method = %method, url = %url, "API request");

        let mut request = self.http.post(&url).json(&envelope);
        if let Some(perimeter) = &self.config.perimeter_auth {
            request = request.basic_auth(&perimeter.username, Some(&perimeter.password));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                error!(method = %method, url = %url, error = %source, "transport failure");
                if self.config.throw_errors {
                    return Err(ProtocolError::Transport {
                        method: method.path(),
                        source,
                    }
                    .into());
                }
                return Ok(error_response(format!("transport failure: {source}")));
            }
        };

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(source) => {
                if self.config.throw_errors {
                    return Err(ProtocolError::Transport {
                        method: method.path(),
                        source,
                    }
                    .into());
                }
                return Ok(error_response(format!("transport failure: {source}")));
            }
        };

        // Parse the envelope with an untyped data field first, so error
        // responses with method-foreign data shapes still decode.
        let parsed: ApiResponse<Value> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(_) => {
                error!(method = %method, url = %url, response = %raw, "response is not valid JSON");
                if self.config.throw_errors {
                    return Err(ProtocolError::InvalidJson {
                        method: method.path(),
                        body: redacted_body(&envelope),
                        response: raw,
                    }
                    .into());
                }
                return Ok(error_response(raw));
            }
        };

        if parsed.response_type == ResponseType::Error {
            error!(method = %method, url = %url, message = %parsed.message, "API error response");
            if self.config.throw_errors {
                return Err(ProtocolError::Api {
                    method: method.path(),
                    body: redacted_body(&envelope),
                    response: raw,
                }
                .into());
            }
            return Ok(ApiResponse {
                response_type: ResponseType::Error,
                message: parsed.message,
                time: parsed.time,
                data: None,
            });
        }

        let data = match parsed.data {
            Some(Value::Null) | None => None,
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => Some(data),
                Err(_) => {
                    error!(method = %method, url = %url, response = %raw, "response data has the wrong shape");
                    if self.config.throw_errors {
                        return Err(ProtocolError::InvalidJson {
                            method: method.path(),
                            body: redacted_body(&envelope),
                            response: raw,
                        }
                        .into());
                    }
                    return Ok(error_response(raw));
                }
            },
        };
        debug!(method = %method, url = %url, "API success response");
        Ok(ApiResponse {
            response_type: parsed.response_type,
            message: parsed.message,
            time: parsed.time,
            data,
        })
    }
}

/// Normalize a configured server address into a base URL without a trailing
/// slash, defaulting to `http://` when no scheme is present.
#[must_use]
pub fn build_api_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", server.trim_end_matches('/'))
    }
}

/// Serialize a request envelope with its credentials replaced by the
/// redaction marker, for embedding in error text and logs.
fn redacted_body<T: Serialize>(envelope: &T) -> String {
    let mut value = serde_json::to_value(envelope).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
        for key in ["confidant_password", "password"] {
            if map.contains_key(key) {
                map.insert(key.to_string(), Value::String(REDACTION_MARKER.to_string()));
            }
        }
    }
    value.to_string()
}

/// Structured error response synthesized when `throw_errors` is disabled.
fn error_response<T>(message: String) -> ApiResponse<T> {
    ApiResponse {
        response_type: ResponseType::Error,
        message,
        time: 0.0,
        data: None,
    }
}

/// Turn an error-typed response into an error regardless of `throw_errors`.
fn ensure_success<T>(method: ApiMethod, response: ApiResponse<T>) -> Result<ApiResponse<T>, Error> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ProtocolError::Api {
            method: method.path(),
            body: REDACTION_MARKER.to_string(),
            response: response.message,
        }
        .into())
    }
}
