//! Condition matching primitives.
//!
//! Pure predicates that test one attribute value against one stored rule.
//! All matchers are total: a rule whose shape does not fit the attribute,
//! or whose literal fails to parse, is a no-match rather than an error, so
//! evaluation degrades toward "inactive".

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::net::Ipv4Addr;

/// One stored rule inside a condition group.
///
/// Serialized forms: a bare integer (`5`), a two-element `[low, high]`
/// range, or a string literal (a dotted IPv4 address in `ipaddress`
/// groups, a decimal identifier elsewhere).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rule {
    /// Explicit identifier membership
    Id(u64),

    /// Half-open `[low, high)` range over a percentage bucket
    Range(u64, u64),

    /// Literal address or decimal identifier
    Literal(String),
}

/// Map an identifier into its percentage bucket in `[0, 100)`.
///
/// The decimal string form of the identifier is hashed with SHA-256 and
/// the first digest byte `b` is scaled to `b * 100 / 256`. The mapping is
/// deterministic and stable across processes and implementations.
/// `bucket(id) < 50` exactly when `b < 128`, so a `[0, 50)` range covers
/// precisely half the hash space.
pub fn bucket(id: u64) -> u8 {
    let digest = Sha256::digest(id.to_string().as_bytes());
    (digest[0] as u16 * 100 / 256) as u8
}

/// Percentage bucket of an IPv4 address: the 32-bit big-endian integer
/// form reduced modulo 100.
pub fn ip_bucket(ip: Ipv4Addr) -> u8 {
    (u32::from(ip) % 100) as u8
}

/// Half-open scalar range test: `low <= value < high`.
pub fn in_range(value: u64, low: u64, high: u64) -> bool {
    low <= value && value < high
}

/// Test an identifier against one rule.
///
/// Integer and decimal-string rules are set membership on the raw
/// identifier; range rules are matched against [`bucket`].
pub fn matches_identifier(rule: &Rule, id: u64) -> bool {
    match rule {
        Rule::Id(n) => *n == id,
        Rule::Range(low, high) => in_range(u64::from(bucket(id)), *low, *high),
        Rule::Literal(s) => s.parse::<u64>().map(|n| n == id).unwrap_or(false),
    }
}

/// Test an IPv4 address against one rule.
///
/// String rules are literal address equality; range rules are matched
/// against [`ip_bucket`]. An integer rule has no meaning for an address.
pub fn matches_ip(rule: &Rule, ip: Ipv4Addr) -> bool {
    match rule {
        Rule::Literal(s) => s.parse::<Ipv4Addr>().map(|a| a == ip).unwrap_or(false),
        Rule::Range(low, high) => in_range(u64::from(ip_bucket(ip)), *low, *high),
        Rule::Id(_) => false,
    }
}
