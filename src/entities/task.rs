//! Task - a named line of work reconstructed from scene filenames.
//!
//! Tasks are never stored. They exist only as scan results.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v([0-9]+)$").unwrap());

/// Digits of a version tag without leading zeros (`v012` -> `12`).
///
/// Any width is accepted. Zero versions are rejected: `v0` and `v000` are not
/// scene versions.
pub fn parse_version(tag: &str) -> Option<&str> {
    let digits = VERSION_RE.captures(tag)?.get(1)?.as_str();
    let digits = digits.trim_start_matches('0');
    (!digits.is_empty()).then_some(digits)
}

/// Order two zero-trimmed digit strings numerically
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Decimal `+1` on an ASCII digit string
fn increment(digits: &str) -> String {
    let mut carry = true;
    let mut out: Vec<char> = Vec::with_capacity(digits.len() + 1);
    for c in digits.chars().rev() {
        match (carry, c) {
            (true, '9') => out.push('0'),
            (true, d) => {
                out.push((d as u8 + 1) as char);
                carry = false;
            }
            (false, d) => out.push(d),
        }
    }
    if carry {
        out.push('1');
    }
    out.iter().rev().collect()
}

/// Format a version tag without padding
pub fn version_tag(n: impl std::fmt::Display) -> String {
    format!("v{}", n)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: String,
    /// Version tags in file-enumeration order (not sorted, not deduplicated)
    pub versions: Vec<String>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Digits of the highest version
    pub fn latest(&self) -> Option<&str> {
        self.versions
            .iter()
            .filter_map(|v| parse_version(v))
            .max_by(|a, b| cmp_digits(a, b))
    }

    /// Tag following the highest version (`v1` when empty)
    pub fn next_version(&self) -> String {
        version_tag(increment(self.latest().unwrap_or("0")))
    }
}
