// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain-name normalization helpers.
//!
//! Every name entering the record model or the protocol layer is absolutized
//! (trailing dot) before use; equality and suffix checks throughout the crate
//! assume absolute form. These helpers are pure, total functions with no I/O.
//!
//! `absolute_name` and `de_absolute` are mutual near-inverses:
//! `de_absolute(absolute_name(x)?) == de_absolute(x)` for all non-empty `x`.

use crate::errors::ValidationError;

/// Return `name` in absolute form, appending a trailing `.` unless one is
/// already present.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] when `name` is empty.
pub fn absolute_name(name: &str) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidName {
            name: String::new(),
            reason: "name is empty".to_string(),
        });
    }
    if is_absolute(name) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}."))
    }
}

/// Strip exactly one trailing `.` if present; otherwise return the input
/// unchanged.
#[must_use]
pub fn de_absolute(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// True iff `name` is in absolute (trailing-dot) form.
#[must_use]
pub fn is_absolute(name: &str) -> bool {
    name.ends_with('.')
}

/// Join a subdomain onto a domain.
///
/// Returns `domain` unchanged when `sub_domain` is absent, otherwise
/// `"{sub_domain}.{domain}"`.
#[must_use]
pub fn concat_domain(domain: &str, sub_domain: Option<&str>) -> String {
    match sub_domain {
        Some(sub) => format!("{sub}.{domain}"),
        None => domain.to_string(),
    }
}

/// Resolve a raw zone-file owner name against a zone origin.
///
/// The first literal `@` anywhere in the name is replaced by `origin`; a name
/// that is still relative afterwards is rewritten under `origin`; a name that
/// is already absolute is used as-is. The result is lower-cased.
///
/// The `@` substitution is a plain substring replacement, not anchored to a
/// whole label; a name containing `@` mid-string is substituted in place.
///
/// `origin` must already be absolute.
#[must_use]
pub fn replace_origin(raw_name: &str, origin: &str) -> String {
    let name = if raw_name.contains('@') {
        raw_name.replacen('@', origin, 1)
    } else {
        raw_name.to_string()
    };
    let name = if is_absolute(&name) {
        name
    } else {
        concat_domain(origin, Some(&name))
    };
    name.to_lowercase()
}
