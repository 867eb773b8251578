// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the zonekit client library.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Default TTL for records that carry no TTL of their own and whose zone file
/// has no `$TTL` directive, in seconds (1 hour)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 3600;

/// DNSKEY flags field for a Key Signing Key: Zone Key (bit 7) plus
/// Secure Entry Point (bit 15)
pub const DNSKEY_FLAGS_KSK: u16 = 257;

/// DNSKEY protocol field; always 3 per RFC 4034
pub const DNSKEY_PROTOCOL: u8 = 3;

/// DNSSEC algorithm number for ECDSA P-256 with SHA-256
pub const ALGORITHM_ECDSA_P256_SHA256: u8 = 13;

/// Length of the raw uncompressed P-256 point (x || y), in bytes
pub const P256_RAW_KEY_LEN: usize = 64;

/// Length of the fixed DER prefix of a P-256 SubjectPublicKeyInfo, up to and
/// including the uncompressed-point marker byte (0x04).
///
/// This is a constant of the one curve/encoding combination this crate
/// supports; it is deliberately not generic ASN.1 parsing.
pub const P256_SPKI_PREFIX_LEN: usize = 27;

/// Base64 encoding of the 27-byte P-256 SubjectPublicKeyInfo DER prefix.
///
/// 27 bytes encode to exactly 36 base64 characters with no padding, so a PEM
/// body can be produced by plain string concatenation with the base64 of the
/// 64-byte raw key.
pub const P256_SPKI_PREFIX_B64: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE";

// ============================================================================
// API Constants
// ============================================================================

/// Path segment of the login exchange on the config/service-discovery store
pub const LOGIN_PATH: &str = "login";

/// Path segment of the service-discovery config document
pub const CONFIG_PATH: &str = "config";

/// Marker substituted for credentials before a request body is embedded in
/// any error text or log line
pub const REDACTION_MARKER: &str = "<redacted>";
