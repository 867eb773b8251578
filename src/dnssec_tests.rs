// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dnssec.rs`

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::constants::{ALGORITHM_ECDSA_P256_SHA256, P256_RAW_KEY_LEN};
use crate::dnssec::{
    calculate_delegation_signer, calculate_key_tag, coordinates_from_dnskey, derive_key_material,
    dnskey_to_pem, ds_digests, pem_to_dnskey, to_dns_wire_name,
};
use crate::errors::ValidationError;

/// A fixed but arbitrary 64-byte raw key: bytes 0, 1, ..., 63.
fn sequential_key() -> Vec<u8> {
    #[allow(clippy::cast_possible_truncation)]
    (0..P256_RAW_KEY_LEN as u8).collect()
}

#[test]
fn test_key_tag_zero_key() {
    // DNSKEY rdata is 01 01 03 0d followed by 64 zero bytes. The running
    // sum is (0x01 << 8) + 0x01 + (0x03 << 8) + 0x0d = 1038, and the fold
    // adds nothing.
    let dnskey = BASE64.encode(vec![0u8; P256_RAW_KEY_LEN]);
    let tag = calculate_key_tag(&dnskey, ALGORITHM_ECDSA_P256_SHA256).unwrap();
    assert_eq!(tag, 1038);
}

#[test]
fn test_key_tag_sequential_key() {
    // Key bytes 0..=63 land at rdata indexes 4..=67, so even key bytes are
    // shifted: 1038 + 256 * (0 + 2 + ... + 62) + (1 + 3 + ... + 63)
    // = 256014; one fold of the upper 16 bits gives 59409.
    let dnskey = BASE64.encode(sequential_key());
    let tag = calculate_key_tag(&dnskey, ALGORITHM_ECDSA_P256_SHA256).unwrap();
    assert_eq!(tag, 59409);
}

#[test]
fn test_key_tag_rejects_short_key() {
    let dnskey = BASE64.encode(vec![0u8; 32]);
    assert!(matches!(
        calculate_key_tag(&dnskey, ALGORITHM_ECDSA_P256_SHA256),
        Err(ValidationError::InvalidKeyLength {
            expected: 64,
            actual: 32,
        })
    ));
}

#[test]
fn test_pem_round_trip() {
    let dnskey = BASE64.encode(sequential_key());
    let pem = dnskey_to_pem(&dnskey).unwrap();
    assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----\n"));
    assert!(pem.ends_with("-----END PUBLIC KEY-----\n"));
    assert_eq!(pem_to_dnskey(&pem).unwrap(), dnskey);
}

#[test]
fn test_pem_to_dnskey_rejects_wrong_der_length() {
    let pem = format!(
        "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
        BASE64.encode(vec![0u8; 40])
    );
    assert!(matches!(
        pem_to_dnskey(&pem),
        Err(ValidationError::InvalidKeyLength { expected: 91, .. })
    ));
}

#[test]
fn test_dnskey_to_pem_rejects_bad_base64() {
    assert!(matches!(
        dnskey_to_pem("not!base64"),
        Err(ValidationError::InvalidKeyEncoding { .. })
    ));
}

#[test]
fn test_to_dns_wire_name() {
    assert_eq!(
        to_dns_wire_name("example.com.").unwrap(),
        [&[7u8][..], b"example", &[3u8][..], b"com"].concat()
    );
}

#[test]
fn test_to_dns_wire_name_appends_no_root_byte() {
    let wire = to_dns_wire_name("example.com.").unwrap();
    assert_eq!(wire.last(), Some(&b'm'));
}

#[test]
fn test_to_dns_wire_name_rejects_over_long_label() {
    let label = "a".repeat(256);
    assert!(matches!(
        to_dns_wire_name(&format!("{label}.example.com.")),
        Err(ValidationError::InvalidName { .. })
    ));
}

#[test]
fn test_delegation_signer_layout() {
    let key = sequential_key();
    let dnskey = BASE64.encode(&key);
    let input =
        calculate_delegation_signer("example.com", &dnskey, ALGORITHM_ECDSA_P256_SHA256).unwrap();

    // Owner name is absolutized, then wire-encoded
    let wire_name = to_dns_wire_name("example.com.").unwrap();
    assert_eq!(&input[..wire_name.len()], &wire_name);
    // flags 257 big-endian, protocol 3, algorithm 13
    assert_eq!(&input[wire_name.len()..wire_name.len() + 4], &[0x01, 0x01, 0x03, 0x0d]);
    assert_eq!(&input[wire_name.len() + 4..], &key);
}

#[test]
fn test_delegation_signer_rejects_empty_owner() {
    let dnskey = BASE64.encode(sequential_key());
    assert!(matches!(
        calculate_delegation_signer("", &dnskey, ALGORITHM_ECDSA_P256_SHA256),
        Err(ValidationError::InvalidName { .. })
    ));
}

#[test]
fn test_ds_digest_lengths() {
    let digests = ds_digests(b"anything");
    assert_eq!(digests.sha256.len(), 64);
    assert_eq!(digests.sha384.len(), 96);
    assert_eq!(digests.sha512.len(), 128);
    assert!(digests.sha256.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_ds_digest_known_sha256() {
    // SHA-256 of the empty input, as published in FIPS 180 test vectors
    let digests = ds_digests(b"");
    assert_eq!(
        digests.sha256,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_coordinates_split() {
    let key = sequential_key();
    let dnskey = BASE64.encode(&key);
    let coordinates = coordinates_from_dnskey(&dnskey).unwrap();
    assert_eq!(&coordinates.x[..], &key[..32]);
    assert_eq!(&coordinates.y[..], &key[32..]);
    assert_eq!(coordinates.x_hex().len(), 64);
    assert!(coordinates.x_hex().starts_with("000102"));
}

#[test]
fn test_derive_key_material() {
    let dnskey = BASE64.encode(sequential_key());
    let pem = dnskey_to_pem(&dnskey).unwrap();
    let material = derive_key_material(&pem, "example.com").unwrap();

    assert_eq!(material.raw_public_key, sequential_key());
    assert_eq!(material.key_tag, 59409);
    assert_eq!(&material.coordinates.y[..], &sequential_key()[32..]);

    let ds_input =
        calculate_delegation_signer("example.com", &dnskey, ALGORITHM_ECDSA_P256_SHA256).unwrap();
    assert_eq!(material.digests, ds_digests(&ds_input));
}
