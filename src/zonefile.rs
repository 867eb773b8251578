// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone-file text to [`ZoneData`] conversion.
//!
//! This module turns master-file text plus an optional explicit zone name
//! into one [`ZoneData`] entry:
//!
//! 1. Tokenize the text into a generic entry list (owner, optional TTL,
//!    type, value text), honoring `$ORIGIN`/`$TTL`, comments, parenthesized
//!    continuations and owner-name inheritance.
//! 2. Determine the origin: `$ORIGIN` if present, else the caller-supplied
//!    zone name, else fail.
//! 3. For every supported kind, construct one single-value record per entry,
//!    resolving names against the origin and TTLs against the zone default.
//! 4. Require an SOA entry.
//! 5. Merge same-`(name, rr_type)` records into one record each, preserving
//!    first-seen order. Textually identical values are NOT deduplicated; two
//!    identical A lines produce a two-element rr_set.
//!
//! Unsupported record types in the input are skipped, not rejected; the
//! remote store only understands the closed kind set of [`crate::records`].

use std::path::Path;

use tracing::{debug, warn};

use crate::constants::DEFAULT_RECORD_TTL_SECS;
use crate::errors::{Error, ValidationError};
use crate::names::{absolute_name, replace_origin};
use crate::records::{ApiRecord, RecordKind, ZoneData, ALL_KINDS};

/// One tokenized zone-file entry before name/TTL resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RawEntry {
    /// Owner name as written, if the line carried one; inherited otherwise
    name: Option<String>,
    /// TTL token as written, unparsed so malformed tokens can be reported
    ttl: Option<String>,
    /// Record kind
    kind: RecordKind,
    /// The remaining value text of the line
    rdata: String,
}

/// Tokenizer output: directives plus the generic entry list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ParsedZone {
    /// `$ORIGIN` directive value, if present
    origin: Option<String>,
    /// `$TTL` directive value, unparsed
    default_ttl: Option<String>,
    /// Entries in file order
    entries: Vec<RawEntry>,
}

/// Convert zone-file text into one [`ZoneData`] entry.
///
/// `zone_name` is the fallback origin used when the text has no `$ORIGIN`
/// directive.
///
/// # Errors
///
/// - [`ValidationError::MissingOrigin`] when neither `$ORIGIN` nor
///   `zone_name` is available
/// - [`ValidationError::MissingSoa`] when the text has no SOA entry
/// - [`ValidationError::InvalidNumber`] when a present TTL token fails the
///   integer round-trip guard
/// - [`ValidationError::ParseError`] / [`ValidationError::InvalidRecordPayload`]
///   for malformed record values
pub fn parse_zone(text: &str, zone_name: Option<&str>) -> Result<ZoneData, Error> {
    let parsed = tokenize(text);

    let origin = match (&parsed.origin, zone_name) {
        (Some(origin), _) => absolute_name(origin)?,
        (None, Some(name)) => absolute_name(name)?,
        (None, None) => return Err(ValidationError::MissingOrigin.into()),
    };
    debug!(origin = %origin, entries = parsed.entries.len(), "converting zone file");

    let mut flat: Vec<ApiRecord> = Vec::with_capacity(parsed.entries.len());
    for kind in ALL_KINDS {
        for entry in parsed.entries.iter().filter(|e| e.kind == kind) {
            let raw_name = entry.name.as_deref().unwrap_or("@");
            let name = replace_origin(raw_name, &origin);
            let ttl = resolve_ttl(entry.ttl.as_deref(), parsed.default_ttl.as_deref())?;
            let rr_set = kind.value_from_text(&entry.rdata, ttl)?;
            flat.push(ApiRecord { name, rr_set });
        }
    }

    if !flat.iter().any(|r| r.kind() == RecordKind::Soa) {
        return Err(ValidationError::MissingSoa.into());
    }

    // Merge by (name, rr_type) in distinct-key discovery order. Identical
    // values are kept; source redundancy survives conversion.
    let mut merged: Vec<ApiRecord> = Vec::with_capacity(flat.len());
    for record in flat {
        match merged
            .iter_mut()
            .find(|m| m.name == record.name && m.kind() == record.kind())
        {
            Some(existing) => existing.rr_set.extend(record.rr_set)?,
            None => merged.push(record),
        }
    }

    let mut zone = ZoneData::new();
    zone.insert(origin, merged);
    Ok(zone)
}

/// Read zone-file text from disk and convert it.
///
/// # Errors
///
/// Returns [`Error::Io`] on read failure, plus everything [`parse_zone`]
/// can return.
pub async fn parse_zone_file(
    path: impl AsRef<Path>,
    zone_name: Option<&str>,
) -> Result<ZoneData, Error> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_zone(&text, zone_name)
}

/// Resolve a record TTL against the zone default.
///
/// Uses `record_ttl` when present, else `zone_ttl` when present, else 3600.
/// A present token must survive an integer round-trip: parsing it and
/// printing the result must reproduce the trimmed original, which rejects
/// non-numeric and malformed numeric tokens such as `"0120"`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidNumber`] when a present token fails the
/// round-trip.
pub fn resolve_ttl(
    record_ttl: Option<&str>,
    zone_ttl: Option<&str>,
) -> Result<u32, ValidationError> {
    if let Some(token) = record_ttl {
        round_trip_u32(token)
    } else if let Some(token) = zone_ttl {
        round_trip_u32(token)
    } else {
        Ok(DEFAULT_RECORD_TTL_SECS)
    }
}

fn round_trip_u32(token: &str) -> Result<u32, ValidationError> {
    let trimmed = token.trim();
    let invalid = || ValidationError::InvalidNumber {
        token: token.to_string(),
    };
    let parsed: u32 = trimmed.parse().map_err(|_| invalid())?;
    if parsed.to_string() != trimmed {
        return Err(invalid());
    }
    Ok(parsed)
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Tokenize master-file text into a generic entry list.
///
/// Handles `;` comments (outside quoted strings), `( ... )` continuations,
/// `$ORIGIN` and `$TTL` directives, optional class tokens (IN/CH/HS) and
/// owner-name inheritance for lines that start with whitespace. Entries of
/// unsupported types are dropped with a warning.
fn tokenize(text: &str) -> ParsedZone {
    let mut parsed = ParsedZone::default();
    let mut last_owner: Option<String> = None;

    for line in logical_lines(text) {
        let inherits_owner = line.starts_with(' ') || line.starts_with('\t');
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(directive) = trimmed.strip_prefix('$') {
            let mut parts = directive.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(value)) if name.eq_ignore_ascii_case("ORIGIN") => {
                    parsed.origin = Some(value.to_string());
                }
                (Some(name), Some(value)) if name.eq_ignore_ascii_case("TTL") => {
                    parsed.default_ttl = Some(value.to_string());
                }
                _ => warn!(line = %trimmed, "skipping unsupported zone-file directive"),
            }
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let (name, rest) = if inherits_owner {
            (last_owner.clone(), &tokens[..])
        } else {
            last_owner = Some(tokens[0].to_string());
            (Some(tokens[0].to_string()), &tokens[1..])
        };

        // Between owner and type come an optional TTL and an optional class,
        // in either order.
        let mut ttl: Option<String> = None;
        let mut kind: Option<RecordKind> = None;
        let mut type_index = 0;
        for (i, token) in rest.iter().enumerate() {
            if token.chars().all(|c| c.is_ascii_digit()) && ttl.is_none() && kind.is_none() {
                ttl = Some((*token).to_string());
            } else if is_class_token(token) && kind.is_none() {
                // class carries no information the model keeps
            } else if let Some(k) = RecordKind::from_token(token) {
                kind = Some(k);
                type_index = i;
                break;
            } else {
                break;
            }
        }

        match kind {
            Some(kind) => parsed.entries.push(RawEntry {
                name,
                ttl,
                kind,
                rdata: rest[type_index + 1..].join(" "),
            }),
            None => debug!(line = %trimmed, "skipping entry of unsupported record type"),
        }
    }

    parsed
}

fn is_class_token(token: &str) -> bool {
    token.eq_ignore_ascii_case("IN")
        || token.eq_ignore_ascii_case("CH")
        || token.eq_ignore_ascii_case("HS")
}

/// Strip comments and join parenthesized continuations into logical lines.
///
/// Leading whitespace of the first physical line of each logical line is
/// preserved; it signals owner-name inheritance.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth: u32 = 0;

    for raw_line in text.lines() {
        let mut stripped = String::with_capacity(raw_line.len());
        let mut in_quotes = false;
        for c in raw_line.chars() {
            match c {
                '"' => {
                    in_quotes = !in_quotes;
                    stripped.push(c);
                }
                ';' if !in_quotes => break,
                '(' if !in_quotes => {
                    depth += 1;
                    stripped.push(' ');
                }
                ')' if !in_quotes => {
                    depth = depth.saturating_sub(1);
                    stripped.push(' ');
                }
                _ => stripped.push(c),
            }
        }

        if current.is_empty() {
            current = stripped;
        } else {
            current.push(' ');
            current.push_str(stripped.trim());
        }

        if depth == 0 {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
