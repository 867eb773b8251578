// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zonefile.rs`

use crate::errors::{Error, ValidationError};
use crate::records::{RecordKind, RrSet};
use crate::zonefile::{parse_zone, resolve_ttl};

const ZONE: &str = r#"
$ORIGIN example.com.
$TTL 3600
@   IN SOA ns1.example.com. hostmaster.example.com. (
        2024010101 ; serial
        86400      ; refresh
        7200       ; retry
        3600000    ; expire
        172800 )   ; minimum
@       IN NS   ns1.example.com.
@       IN NS   ns2.example.com.
www 300 IN A    192.0.2.1
www     IN A    192.0.2.2
mail    IN MX   10 mail.example.com.
@       IN CAA  0 issue "letsencrypt.org"
"#;

#[test]
fn test_parse_zone_returns_single_origin_entry() {
    let zone = parse_zone(ZONE, None).unwrap();
    assert_eq!(zone.len(), 1);
    assert!(zone.contains_key("example.com."));
}

#[test]
fn test_parse_zone_merges_same_name_and_type() {
    let zone = parse_zone(ZONE, None).unwrap();
    let records = &zone["example.com."];

    let www = records
        .iter()
        .find(|r| r.name == "www.example.com." && r.kind() == RecordKind::A)
        .unwrap();
    match &www.rr_set {
        RrSet::A(values) => {
            // Two A lines for the same name fold into one record, input
            // order preserved
            assert_eq!(values.len(), 2);
            assert_eq!(values[0].value, "192.0.2.1");
            assert_eq!(values[0].ttl, 300);
            assert_eq!(values[1].value, "192.0.2.2");
            assert_eq!(values[1].ttl, 3600);
        }
        other => panic!("expected A rr_set, got {other:?}"),
    }

    // No other record shares a (name, rr_type) pair
    let ns = records
        .iter()
        .find(|r| r.name == "example.com." && r.kind() == RecordKind::Ns)
        .unwrap();
    assert_eq!(ns.rr_set.len(), 2);
}

#[test]
fn test_parse_zone_does_not_deduplicate_identical_values() {
    let zone_text = "$ORIGIN example.com.\n\
        @ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n\
        www 300 IN A 192.0.2.1\n\
        www 300 IN A 192.0.2.1\n";
    let zone = parse_zone(zone_text, None).unwrap();
    let www = zone["example.com."]
        .iter()
        .find(|r| r.kind() == RecordKind::A)
        .unwrap();
    // Source redundancy survives conversion
    assert_eq!(www.rr_set.len(), 2);
}

#[test]
fn test_parse_zone_soa_comes_first() {
    let zone = parse_zone(ZONE, None).unwrap();
    assert_eq!(zone["example.com."][0].kind(), RecordKind::Soa);
}

#[test]
fn test_parse_zone_parses_soa_continuation() {
    let zone = parse_zone(ZONE, None).unwrap();
    let soa = &zone["example.com."][0];
    match &soa.rr_set {
        RrSet::Soa(values) => {
            assert_eq!(values.len(), 1);
            assert_eq!(values[0].serial, 2_024_010_101);
            assert_eq!(values[0].minimum, 172_800);
        }
        other => panic!("expected SOA rr_set, got {other:?}"),
    }
}

#[test]
fn test_parse_zone_resolves_names_against_origin() {
    let zone = parse_zone(ZONE, None).unwrap();
    let names: Vec<&str> = zone["example.com."]
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert!(names.contains(&"example.com."));
    assert!(names.contains(&"www.example.com."));
    assert!(names.contains(&"mail.example.com."));
}

#[test]
fn test_parse_zone_uses_caller_zone_name_without_origin() {
    let zone_text = "@ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n";
    let zone = parse_zone(zone_text, Some("example.org")).unwrap();
    assert!(zone.contains_key("example.org."));
    assert_eq!(zone["example.org."][0].name, "example.org.");
}

#[test]
fn test_parse_zone_origin_directive_wins_over_caller() {
    let zone_text = "$ORIGIN example.com.\n\
        @ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n";
    let zone = parse_zone(zone_text, Some("example.org")).unwrap();
    assert!(zone.contains_key("example.com."));
}

#[test]
fn test_parse_zone_requires_origin() {
    let zone_text = "@ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n";
    assert!(matches!(
        parse_zone(zone_text, None),
        Err(Error::Validation(ValidationError::MissingOrigin))
    ));
}

#[test]
fn test_parse_zone_requires_soa() {
    let zone_text = "$ORIGIN example.com.\nwww IN A 192.0.2.1\n";
    assert!(matches!(
        parse_zone(zone_text, None),
        Err(Error::Validation(ValidationError::MissingSoa))
    ));
}

#[test]
fn test_parse_zone_skips_unsupported_types() {
    let zone_text = "$ORIGIN example.com.\n\
        @ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n\
        @ IN DNSKEY 257 3 13 q8AIviCqwDab\n\
        www IN A 192.0.2.1\n";
    let zone = parse_zone(zone_text, None).unwrap();
    assert_eq!(zone["example.com."].len(), 2);
}

#[test]
fn test_parse_zone_rejects_malformed_ttl_directive() {
    let zone_text = "$ORIGIN example.com.\n$TTL notanumber\n\
        @ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n";
    assert!(matches!(
        parse_zone(zone_text, None),
        Err(Error::Validation(ValidationError::InvalidNumber { .. }))
    ));
}

#[test]
fn test_parse_zone_inherits_owner_name() {
    let zone_text = "$ORIGIN example.com.\n\
        @ IN SOA ns1.example.com. hostmaster.example.com. 1 2 3 4 5\n\
        www IN A 192.0.2.1\n\
        \tIN A 192.0.2.2\n";
    let zone = parse_zone(zone_text, None).unwrap();
    let www = zone["example.com."]
        .iter()
        .find(|r| r.kind() == RecordKind::A)
        .unwrap();
    assert_eq!(www.name, "www.example.com.");
    assert_eq!(www.rr_set.len(), 2);
}

#[test]
fn test_resolve_ttl_defaults_to_3600() {
    assert_eq!(resolve_ttl(None, None).unwrap(), 3600);
}

#[test]
fn test_resolve_ttl_falls_back_to_zone_ttl() {
    assert_eq!(resolve_ttl(None, Some("7200")).unwrap(), 7200);
}

#[test]
fn test_resolve_ttl_prefers_record_ttl() {
    assert_eq!(resolve_ttl(Some("120"), Some("7200")).unwrap(), 120);
}

#[test]
fn test_resolve_ttl_rejects_non_numeric() {
    assert!(matches!(
        resolve_ttl(Some("notanumber"), Some("3600")),
        Err(ValidationError::InvalidNumber { .. })
    ));
}

#[test]
fn test_resolve_ttl_rejects_leading_zero() {
    // "0120" parses but does not round-trip back to the original token
    assert!(matches!(
        resolve_ttl(Some("0120"), None),
        Err(ValidationError::InvalidNumber { .. })
    ));
}

#[tokio::test]
async fn test_parse_zone_file_reads_from_disk() {
    use std::io::Write as _;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ZONE.as_bytes()).unwrap();

    let zone = crate::zonefile::parse_zone_file(file.path(), None)
        .await
        .unwrap();
    assert!(zone.contains_key("example.com."));
}
