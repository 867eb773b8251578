// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Zonekit - client-side data and protocol layer for a DNS control plane
//!
//! Zonekit represents DNS zone data as a strongly-typed canonical record
//! model, converts between that model and zone-file text, derives DNSSEC key
//! material from a raw public key, and drives a typed request/response
//! protocol against a remote authoritative store over authenticated HTTP.
//!
//! ## Modules
//!
//! - [`names`] - absolute/relative domain-name helpers
//! - [`records`] - the canonical typed record and zone model
//! - [`zonefile`] - zone-file text to model conversion and merging
//! - [`dnssec`] - DNSKEY wire encoding, DS digests and key tags
//! - [`client`] - the six-operation API client with auth layering
//! - [`errors`] - the validation/protocol/auth error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use zonekit::client::{ClientConfig, ControlClient};
//! use zonekit::records::{RecordIdentifier, RecordKind};
//!
//! # async fn example() -> Result<(), zonekit::errors::Error> {
//! let client = ControlClient::new(ClientConfig::new(
//!     "admin",
//!     "s3cret",
//!     "https://config.example.org",
//! ));
//!
//! let www = RecordIdentifier::new("www.example.org", RecordKind::A)?;
//! let response = client.get(&[www]).await?;
//! println!("{}", response.message);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure policy
//!
//! Validation failures surface before any network call; protocol and auth
//! failures propagate immediately with no retry, because the remote store
//! owns ordering and idempotency.

pub mod client;
pub mod constants;
pub mod dnssec;
pub mod errors;
pub mod names;
pub mod records;
pub mod zonefile;

#[cfg(test)]
mod dnssec_tests;
#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod zonefile_tests;
