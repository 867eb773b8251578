// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical typed representation of DNS resource records and zones.
//!
//! This module defines the closed set of record kinds the control plane
//! understands and validates per-kind payload shape at construction time, not
//! merely at the type-system level, since untrusted zone-file and network
//! input must be re-checked at runtime.
//!
//! # Types
//!
//! - [`RecordKind`] - the closed set of supported record types
//! - [`RrSet`] - tagged union of per-kind value lists
//! - [`ApiRecord`] - one owner name plus its rr_set, the unit exchanged with
//!   the remote store
//! - [`RecordIdentifier`] - `(name, rr_type)` addressing for reads and deletes
//! - [`ZoneData`] - zone origin mapped to its records
//!
//! # Wire shape
//!
//! An [`ApiRecord`] serializes to the JSON the remote store expects:
//!
//! ```json
//! { "name": "www.example.com.", "rr_type": "A",
//!   "rr_set": [ { "ttl": 300, "value": "192.0.2.1" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::ValidationError;
use crate::names;

/// Mapping from zone origin (absolute name) to the records of that zone.
pub type ZoneData = BTreeMap<String, Vec<ApiRecord>>;

/// The closed set of record kinds supported by the control plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    Soa,
    Ns,
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Srv,
    Caa,
    Tlsa,
    Openpgpkey,
}

/// All supported kinds, in the order zone-file conversion iterates them.
/// SOA leads so converted zones list their apex authority record first.
pub const ALL_KINDS: [RecordKind; 11] = [
    RecordKind::Soa,
    RecordKind::Ns,
    RecordKind::A,
    RecordKind::Aaaa,
    RecordKind::Cname,
    RecordKind::Mx,
    RecordKind::Txt,
    RecordKind::Srv,
    RecordKind::Caa,
    RecordKind::Tlsa,
    RecordKind::Openpgpkey,
];

impl RecordKind {
    /// Canonical upper-case token for this kind (e.g. `"AAAA"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soa => "SOA",
            Self::Ns => "NS",
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Tlsa => "TLSA",
            Self::Openpgpkey => "OPENPGPKEY",
        }
    }

    /// Parse a type token (any case) into a kind; `None` for unsupported types.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "SOA" => Some(Self::Soa),
            "NS" => Some(Self::Ns),
            "A" => Some(Self::A),
            "AAAA" => Some(Self::Aaaa),
            "CNAME" => Some(Self::Cname),
            "MX" => Some(Self::Mx),
            "TXT" => Some(Self::Txt),
            "SRV" => Some(Self::Srv),
            "CAA" => Some(Self::Caa),
            "TLSA" => Some(Self::Tlsa),
            "OPENPGPKEY" => Some(Self::Openpgpkey),
            _ => None,
        }
    }

    /// Map one whitespace-delimited zone-file value string into a
    /// single-element [`RrSet`] of this kind.
    ///
    /// SOA splits into 7 positional fields, MX into 2, SRV into 4, CAA into
    /// 3 (surrounding quotes stripped from the value), TLSA into 4; every
    /// other kind takes the raw text as its value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ParseError`] when a required numeric
    /// component cannot be parsed, and [`ValidationError::InvalidRecordPayload`]
    /// when a field is absent or outside its declared range.
    pub fn value_from_text(&self, text: &str, ttl: u32) -> Result<RrSet, ValidationError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        match self {
            Self::Soa => {
                let [mname, rname, serial, refresh, retry, expire, minimum] =
                    positional(*self, &fields)?;
                Ok(RrSet::Soa(vec![SoaValue {
                    ttl,
                    mname: mname.to_string(),
                    rname: rname.to_string(),
                    serial: parse_field(*self, "serial", serial)?,
                    refresh: parse_field(*self, "refresh", refresh)?,
                    retry: parse_field(*self, "retry", retry)?,
                    expire: parse_field(*self, "expire", expire)?,
                    minimum: parse_field(*self, "minimum", minimum)?,
                }]))
            }
            Self::Mx => {
                let [preference, exchange] = positional(*self, &fields)?;
                Ok(RrSet::Mx(vec![MxValue {
                    ttl,
                    preference: parse_field(*self, "preference", preference)?,
                    exchange: exchange.to_string(),
                }]))
            }
            Self::Srv => {
                let [priority, weight, port, target] = positional(*self, &fields)?;
                Ok(RrSet::Srv(vec![SrvValue {
                    ttl,
                    priority: parse_field(*self, "priority", priority)?,
                    weight: parse_field(*self, "weight", weight)?,
                    port: parse_field(*self, "port", port)?,
                    target: target.to_string(),
                }]))
            }
            Self::Caa => {
                if fields.len() < 3 {
                    return Err(ValidationError::InvalidRecordPayload {
                        rr_type: self.as_str().to_string(),
                        reason: format!("expected 'flag tag value', got '{text}'"),
                    });
                }
                let flag: u8 = parse_field(*self, "flag", fields[0])?;
                let tag = CaaTag::from_token(fields[1])?;
                let joined = fields[2..].join(" ");
                let value = joined
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(&joined);
                Ok(RrSet::Caa(vec![CaaValue {
                    ttl,
                    issuer_critical: flag & 0x80 != 0,
                    tag,
                    value: value.to_string(),
                }]))
            }
            Self::Tlsa => {
                let [usage, selector, matching, data] = positional(*self, &fields)?;
                let value = TlsaValue {
                    ttl,
                    usage: parse_field(*self, "usage", usage)?,
                    selector: parse_field(*self, "selector", selector)?,
                    matching: parse_field(*self, "matching", matching)?,
                    data: data.to_string(),
                };
                value.validate()?;
                Ok(RrSet::Tlsa(vec![value]))
            }
            Self::A => Ok(RrSet::A(vec![plain(text, ttl)])),
            Self::Aaaa => Ok(RrSet::Aaaa(vec![plain(text, ttl)])),
            Self::Ns => Ok(RrSet::Ns(vec![plain(text, ttl)])),
            Self::Cname => Ok(RrSet::Cname(vec![plain(text, ttl)])),
            Self::Txt => Ok(RrSet::Txt(vec![plain(text, ttl)])),
            Self::Openpgpkey => Ok(RrSet::Openpgpkey(vec![plain(text, ttl)])),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// rr_set entry for the kinds whose zone-file value is a single opaque text
/// field: A, AAAA, NS, CNAME, TXT and OPENPGPKEY.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// The record value as zone-file text (address, target name, text, ...)
    pub value: String,
}

/// SOA rr_set entry. All timing fields have unsigned 32-bit semantics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// Primary nameserver for the zone
    pub mname: String,
    /// Mailbox of the responsible party, in domain-name form
    pub rname: String,
    /// Zone serial number
    pub serial: u32,
    /// Secondary refresh interval in seconds
    pub refresh: u32,
    /// Retry interval after a failed refresh, in seconds
    pub retry: u32,
    /// Time after which secondaries stop serving the zone, in seconds
    pub expire: u32,
    /// Negative-caching TTL in seconds
    pub minimum: u32,
}

/// MX rr_set entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// Preference; lower values are tried first
    pub preference: u16,
    /// Mail exchange host name
    pub exchange: String,
}

/// SRV rr_set entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// Priority; lower values are tried first
    pub priority: u16,
    /// Relative weight among same-priority targets
    pub weight: u16,
    /// Service port
    pub port: u16,
    /// Target host name
    pub target: String,
}

/// The three CAA property tags the model accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaaTag {
    Issue,
    Issuewild,
    Iodef,
}

impl CaaTag {
    /// Parse a zone-file tag token.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRecordPayload`] for any token other
    /// than the three supported literals.
    pub fn from_token(token: &str) -> Result<Self, ValidationError> {
        match token.to_ascii_lowercase().as_str() {
            "issue" => Ok(Self::Issue),
            "issuewild" => Ok(Self::Issuewild),
            "iodef" => Ok(Self::Iodef),
            other => Err(ValidationError::InvalidRecordPayload {
                rr_type: RecordKind::Caa.as_str().to_string(),
                reason: format!("unsupported CAA tag '{other}'"),
            }),
        }
    }

    /// Zone-file token for this tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Issuewild => "issuewild",
            Self::Iodef => "iodef",
        }
    }
}

/// CAA rr_set entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// Issuer-critical bit from the flags field
    pub issuer_critical: bool,
    /// Property tag
    pub tag: CaaTag,
    /// Property value; its shape depends on the tag
    pub value: String,
}

/// TLSA rr_set entry.
///
/// The three small enumerations are kept as raw integers the way the wire
/// carries them; [`TlsaValue::validate`] enforces their declared ranges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsaValue {
    /// Time to live in seconds
    pub ttl: u32,
    /// Certificate usage, 0..=3
    pub usage: u8,
    /// Selector, 0..=1
    pub selector: u8,
    /// Matching type, 0..=2
    pub matching: u8,
    /// Certificate association data, hex-encoded
    pub data: String,
}

impl TlsaValue {
    /// Check the three enumeration fields against their declared ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRecordPayload`] when a field is out
    /// of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let out_of_range = |field: &str, value: u8, max: u8| ValidationError::InvalidRecordPayload {
            rr_type: RecordKind::Tlsa.as_str().to_string(),
            reason: format!("{field} {value} out of range 0..={max}"),
        };
        if self.usage > 3 {
            return Err(out_of_range("cert usage", self.usage, 3));
        }
        if self.selector > 1 {
            return Err(out_of_range("selector", self.selector, 1));
        }
        if self.matching > 2 {
            return Err(out_of_range("matching type", self.matching, 2));
        }
        Ok(())
    }
}

/// Tagged union of per-kind value lists.
///
/// Serializes adjacently tagged so that, flattened into [`ApiRecord`], it
/// produces the `rr_type` / `rr_set` pair of the wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rr_type", content = "rr_set")]
pub enum RrSet {
    #[serde(rename = "SOA")]
    Soa(Vec<SoaValue>),
    #[serde(rename = "NS")]
    Ns(Vec<PlainValue>),
    #[serde(rename = "A")]
    A(Vec<PlainValue>),
    #[serde(rename = "AAAA")]
    Aaaa(Vec<PlainValue>),
    #[serde(rename = "CNAME")]
    Cname(Vec<PlainValue>),
    #[serde(rename = "MX")]
    Mx(Vec<MxValue>),
    #[serde(rename = "TXT")]
    Txt(Vec<PlainValue>),
    #[serde(rename = "SRV")]
    Srv(Vec<SrvValue>),
    #[serde(rename = "CAA")]
    Caa(Vec<CaaValue>),
    #[serde(rename = "TLSA")]
    Tlsa(Vec<TlsaValue>),
    #[serde(rename = "OPENPGPKEY")]
    Openpgpkey(Vec<PlainValue>),
}

impl RrSet {
    /// The record kind of this rr_set.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Soa(_) => RecordKind::Soa,
            Self::Ns(_) => RecordKind::Ns,
            Self::A(_) => RecordKind::A,
            Self::Aaaa(_) => RecordKind::Aaaa,
            Self::Cname(_) => RecordKind::Cname,
            Self::Mx(_) => RecordKind::Mx,
            Self::Txt(_) => RecordKind::Txt,
            Self::Srv(_) => RecordKind::Srv,
            Self::Caa(_) => RecordKind::Caa,
            Self::Tlsa(_) => RecordKind::Tlsa,
            Self::Openpgpkey(_) => RecordKind::Openpgpkey,
        }
    }

    /// Number of values in this rr_set.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Soa(v) => v.len(),
            Self::Mx(v) => v.len(),
            Self::Srv(v) => v.len(),
            Self::Caa(v) => v.len(),
            Self::Tlsa(v) => v.len(),
            Self::Ns(v) | Self::A(v) | Self::Aaaa(v) | Self::Cname(v) | Self::Txt(v)
            | Self::Openpgpkey(v) => v.len(),
        }
    }

    /// True when this rr_set holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append all values of `other` to this rr_set, preserving order.
    ///
    /// Used by the zone-file merge step to fold same-`(name, rr_type)`
    /// records into one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RecordKindMismatch`] when the two rr_sets
    /// are of different kinds.
    pub fn extend(&mut self, other: RrSet) -> Result<(), ValidationError> {
        let mismatch = |left: &RrSet, right: &RrSet| ValidationError::RecordKindMismatch {
            left: left.kind().as_str().to_string(),
            right: right.kind().as_str().to_string(),
        };
        match (self, other) {
            (Self::Soa(a), Self::Soa(b)) => a.extend(b),
            (Self::Mx(a), Self::Mx(b)) => a.extend(b),
            (Self::Srv(a), Self::Srv(b)) => a.extend(b),
            (Self::Caa(a), Self::Caa(b)) => a.extend(b),
            (Self::Tlsa(a), Self::Tlsa(b)) => a.extend(b),
            (Self::Ns(a), Self::Ns(b))
            | (Self::A(a), Self::A(b))
            | (Self::Aaaa(a), Self::Aaaa(b))
            | (Self::Cname(a), Self::Cname(b))
            | (Self::Txt(a), Self::Txt(b))
            | (Self::Openpgpkey(a), Self::Openpgpkey(b)) => a.extend(b),
            (left, right) => return Err(mismatch(left, &right)),
        }
        Ok(())
    }

    /// Validate every value in this rr_set.
    ///
    /// Only TLSA carries ranges the type system cannot express; the other
    /// kinds are fully constrained by their field types.
    ///
    /// # Errors
    ///
    /// Returns the first per-value [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Self::Tlsa(values) = self {
            for value in values {
                value.validate()?;
            }
        }
        Ok(())
    }
}

/// One owner name plus its ordered set of same-kind values; the unit the
/// protocol layer exchanges with the remote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiRecord {
    /// Absolute owner name
    pub name: String,
    /// The record values, tagged with their kind
    #[serde(flatten)]
    pub rr_set: RrSet,
}

impl ApiRecord {
    /// Build a record, absolutizing the owner name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] when `name` is empty.
    pub fn new(name: &str, rr_set: RrSet) -> Result<Self, ValidationError> {
        Ok(Self {
            name: names::absolute_name(name)?,
            rr_set,
        })
    }

    /// The record kind of this record's rr_set.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.rr_set.kind()
    }

    /// Validate this record for submission in a write.
    ///
    /// Checks that the name is absolute, the rr_set is non-empty, an SOA
    /// rr_set holds exactly one value (only one SOA per zone apex is
    /// meaningful), and every value passes payload validation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered; callers must not
    /// issue any network request for a batch containing a failing record.
    pub fn validate_for_write(&self) -> Result<(), ValidationError> {
        if !names::is_absolute(&self.name) {
            return Err(ValidationError::InvalidName {
                name: self.name.clone(),
                reason: "name must be absolute (trailing dot)".to_string(),
            });
        }
        if self.rr_set.is_empty() {
            return Err(ValidationError::EmptyRrSet {
                name: self.name.clone(),
                rr_type: self.kind().as_str().to_string(),
            });
        }
        if matches!(&self.rr_set, RrSet::Soa(values) if values.len() != 1) {
            return Err(ValidationError::InvalidRecordPayload {
                rr_type: RecordKind::Soa.as_str().to_string(),
                reason: format!(
                    "SOA rr_set for '{}' must hold exactly one value, got {}",
                    self.name,
                    self.rr_set.len()
                ),
            });
        }
        self.rr_set.validate()
    }
}

/// Minimal `(name, rr_type)` key addressing one record within a zone.
///
/// No two records in a zone share the same identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordIdentifier {
    /// Absolute owner name
    pub name: String,
    /// Record type
    pub rr_type: RecordKind,
}

impl RecordIdentifier {
    /// Build an identifier, absolutizing the owner name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] when `name` is empty.
    pub fn new(name: &str, rr_type: RecordKind) -> Result<Self, ValidationError> {
        Ok(Self {
            name: names::absolute_name(name)?,
            rr_type,
        })
    }
}

/// One glob pair of a `search` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordGlob {
    /// Glob matched against owner names
    pub name_glob: String,
    /// Glob matched against record type tokens
    pub rr_type_glob: String,
}

/// Data field of a successful `delete` response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysRemoved {
    /// Number of `(name, rr_type)` keys the store removed
    pub keys_removed: u64,
}

/// Split a zone-file value string into exactly `N` positional fields.
fn positional<'a, const N: usize>(
    kind: RecordKind,
    fields: &[&'a str],
) -> Result<[&'a str; N], ValidationError> {
    if fields.len() != N {
        return Err(ValidationError::InvalidRecordPayload {
            rr_type: kind.as_str().to_string(),
            reason: format!("expected {N} value fields, got {}", fields.len()),
        });
    }
    let mut out = [""; N];
    out.copy_from_slice(fields);
    Ok(out)
}

/// rr_set entry for the raw-text kinds.
fn plain(text: &str, ttl: u32) -> PlainValue {
    PlainValue {
        ttl,
        value: text.to_string(),
    }
}

/// Numeric field parser shared by the positional kinds.
fn parse_field<T: std::str::FromStr>(
    kind: RecordKind,
    field: &'static str,
    token: &str,
) -> Result<T, ValidationError> {
    token.parse().map_err(|_| ValidationError::ParseError {
        rr_type: kind.as_str().to_string(),
        field,
        token: token.to_string(),
    })
}
