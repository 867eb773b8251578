// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNSSEC key derivation for P-256 signing keys.
//!
//! The remote store owns the signing key; this module converts its PEM/SPKI
//! public half into DNS wire form and computes the values needed to publish
//! a secure-delegation chain:
//!
//! - [`pem_to_dnskey`] / [`dnskey_to_pem`] - PEM SubjectPublicKeyInfo to the
//!   raw 64-byte point and back
//! - [`calculate_delegation_signer`] - the byte string whose hash is the DS
//!   digest field
//! - [`calculate_key_tag`] - the RFC 4034 Appendix B key-tag checksum
//! - [`derive_key_material`] - everything above bundled as
//!   [`DnsKeyMaterial`]
//!
//! The PEM conversion works on the fixed DER prefix of the one
//! curve/encoding combination this crate supports (uncompressed P-256
//! SubjectPublicKeyInfo); it is deliberately not generic ASN.1 parsing.
//!
//! DS records are published with algorithm 13 (ECDSA P-256 SHA-256), flags
//! 257 (Zone Key + Secure Entry Point) and protocol 3. SHA-256 and SHA-384
//! digests match digest types 2 and 4; the SHA-512 digest is non-standard
//! and exposed for operator convenience.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::constants::{
    ALGORITHM_ECDSA_P256_SHA256, DNSKEY_FLAGS_KSK, DNSKEY_PROTOCOL, P256_RAW_KEY_LEN,
    P256_SPKI_PREFIX_B64, P256_SPKI_PREFIX_LEN,
};
use crate::errors::ValidationError;
use crate::names::absolute_name;

/// The raw public key split into its two curve coordinates.
///
/// Each coordinate is a 256-bit big-endian unsigned integer kept as a fixed
/// 32-byte array; nothing in this crate does arithmetic on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCoordinates {
    /// The x coordinate, big-endian
    pub x: [u8; 32],
    /// The y coordinate, big-endian
    pub y: [u8; 32],
}

impl KeyCoordinates {
    /// Lower-case hex rendering of the x coordinate.
    #[must_use]
    pub fn x_hex(&self) -> String {
        hex(&self.x)
    }

    /// Lower-case hex rendering of the y coordinate.
    #[must_use]
    pub fn y_hex(&self) -> String {
        hex(&self.y)
    }
}

/// DS digests of one key over one owner name, hex-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsDigests {
    /// SHA-256 digest (digest type 2)
    pub sha256: String,
    /// SHA-384 digest (digest type 4)
    pub sha384: String,
    /// SHA-512 digest (non-standard, operator convenience)
    pub sha512: String,
}

/// Everything derived from one public key and owner name.
///
/// Computed transiently; nothing here is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct DnsKeyMaterial {
    /// The raw 64-byte (x || y) point
    pub raw_public_key: Vec<u8>,
    /// The point split into coordinates
    pub coordinates: KeyCoordinates,
    /// RFC 4034 key tag
    pub key_tag: u16,
    /// Delegation-Signer digests
    pub digests: DsDigests,
}

/// Convert a PEM-encoded P-256 SubjectPublicKeyInfo into the base64 of the
/// raw 64-byte (x || y) point as carried by a DNSKEY record.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidKeyEncoding`] when the PEM body is not
/// valid base64 and [`ValidationError::InvalidKeyLength`] when the decoded
/// DER is not a 91-byte P-256 SubjectPublicKeyInfo.
pub fn pem_to_dnskey(pem: &str) -> Result<String, ValidationError> {
    let body: String = pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .map(str::trim)
        .collect();
    let der = BASE64
        .decode(body.as_bytes())
        .map_err(|e| ValidationError::InvalidKeyEncoding {
            reason: e.to_string(),
        })?;
    if der.len() != P256_SPKI_PREFIX_LEN + P256_RAW_KEY_LEN {
        return Err(ValidationError::InvalidKeyLength {
            expected: P256_SPKI_PREFIX_LEN + P256_RAW_KEY_LEN,
            actual: der.len(),
        });
    }
    Ok(BASE64.encode(&der[P256_SPKI_PREFIX_LEN..]))
}

/// Inverse of [`pem_to_dnskey`]: wrap the base64 raw key back into a PEM
/// SubjectPublicKeyInfo.
///
/// 27 prefix bytes encode to exactly 36 base64 characters with no padding,
/// so the PEM body is the prefix string concatenated with the key string.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidKeyEncoding`] /
/// [`ValidationError::InvalidKeyLength`] when `dnskey` is not the base64 of
/// a 64-byte raw key.
pub fn dnskey_to_pem(dnskey: &str) -> Result<String, ValidationError> {
    decode_raw_key(dnskey)?;
    Ok(format!(
        "-----BEGIN PUBLIC KEY-----\n{P256_SPKI_PREFIX_B64}{dnskey}\n-----END PUBLIC KEY-----\n"
    ))
}

/// Split the base64 raw key into its two 32-byte big-endian coordinates.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidKeyEncoding`] /
/// [`ValidationError::InvalidKeyLength`] when `dnskey` is not the base64 of
/// a 64-byte raw key.
pub fn coordinates_from_dnskey(dnskey: &str) -> Result<KeyCoordinates, ValidationError> {
    let raw = decode_raw_key(dnskey)?;
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(&raw[..32]);
    y.copy_from_slice(&raw[32..]);
    Ok(KeyCoordinates { x, y })
}

/// DNS label-sequence wire encoding of a name: one length byte per
/// dot-separated label followed by the label's bytes.
///
/// No terminating root byte is appended; the store consuming these digests
/// builds its DS input the same way.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] when a label is longer than the
/// length prefix can represent.
pub fn to_dns_wire_name(name: &str) -> Result<Vec<u8>, ValidationError> {
    let mut wire = Vec::with_capacity(name.len() + 1);
    for label in name.split('.').filter(|label| !label.is_empty()) {
        let len = u8::try_from(label.len()).map_err(|_| ValidationError::InvalidName {
            name: name.to_string(),
            reason: format!("label '{label}' is longer than 255 bytes"),
        })?;
        wire.push(len);
        wire.extend_from_slice(label.as_bytes());
    }
    Ok(wire)
}

/// Build the byte string the DS digest field is the hash of:
/// `wire(owner) || flags(0x0101) || protocol(0x03) || algorithm || raw key`.
///
/// The owner name is absolutized first. Hash the result with
/// [`ds_digests`] to obtain the publishable digest fields.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] for an empty owner name and the
/// key-decoding errors of [`pem_to_dnskey`].
pub fn calculate_delegation_signer(
    owner_name: &str,
    public_key_base64: &str,
    algorithm: u8,
) -> Result<Vec<u8>, ValidationError> {
    let owner = absolute_name(owner_name)?;
    let raw_key = decode_raw_key(public_key_base64)?;

    let mut input = to_dns_wire_name(&owner)?;
    input.extend_from_slice(&DNSKEY_FLAGS_KSK.to_be_bytes());
    input.extend_from_slice(&[DNSKEY_PROTOCOL, algorithm]);
    input.extend_from_slice(&raw_key);
    Ok(input)
}

/// Hash a DS input with the three published digest algorithms.
#[must_use]
pub fn ds_digests(ds_input: &[u8]) -> DsDigests {
    DsDigests {
        sha256: hex(&Sha256::digest(ds_input)),
        sha384: hex(&Sha384::digest(ds_input)),
        sha512: hex(&Sha512::digest(ds_input)),
    }
}

/// RFC 4034 Appendix B key-tag checksum over
/// `flags(0x0101) || protocol(0x03) || algorithm || raw key`.
///
/// Bytes at even indexes (0-based) accumulate shifted left by 8 bits, bytes
/// at odd indexes accumulate as-is; the upper 16 bits fold into the lower
/// 16 once at the end.
///
/// # Errors
///
/// Returns the key-decoding errors of [`pem_to_dnskey`].
pub fn calculate_key_tag(public_key_base64: &str, algorithm: u8) -> Result<u16, ValidationError> {
    let raw_key = decode_raw_key(public_key_base64)?;
    let mut rdata = DNSKEY_FLAGS_KSK.to_be_bytes().to_vec();
    rdata.extend_from_slice(&[DNSKEY_PROTOCOL, algorithm]);
    rdata.extend_from_slice(&raw_key);

    let mut sum: u32 = 0;
    for (i, byte) in rdata.iter().enumerate() {
        if i % 2 == 0 {
            sum += u32::from(*byte) << 8;
        } else {
            sum += u32::from(*byte);
        }
    }
    sum += (sum >> 16) & 0xffff;
    #[allow(clippy::cast_possible_truncation)]
    Ok((sum & 0xffff) as u16)
}

/// Derive the full [`DnsKeyMaterial`] for one PEM public key and owner name,
/// using algorithm 13.
///
/// # Errors
///
/// Returns the errors of [`pem_to_dnskey`] and
/// [`calculate_delegation_signer`].
pub fn derive_key_material(pem: &str, owner_name: &str) -> Result<DnsKeyMaterial, ValidationError> {
    let dnskey = pem_to_dnskey(pem)?;
    let ds_input =
        calculate_delegation_signer(owner_name, &dnskey, ALGORITHM_ECDSA_P256_SHA256)?;
    Ok(DnsKeyMaterial {
        raw_public_key: decode_raw_key(&dnskey)?,
        coordinates: coordinates_from_dnskey(&dnskey)?,
        key_tag: calculate_key_tag(&dnskey, ALGORITHM_ECDSA_P256_SHA256)?,
        digests: ds_digests(&ds_input),
    })
}

/// Decode a base64 raw key and enforce the 64-byte P-256 point length.
fn decode_raw_key(dnskey: &str) -> Result<Vec<u8>, ValidationError> {
    let raw = BASE64
        .decode(dnskey.as_bytes())
        .map_err(|e| ValidationError::InvalidKeyEncoding {
            reason: e.to_string(),
        })?;
    if raw.len() != P256_RAW_KEY_LEN {
        return Err(ValidationError::InvalidKeyLength {
            expected: P256_RAW_KEY_LEN,
            actual: raw.len(),
        });
    }
    Ok(raw)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
