//! Switch entity and its stored representation.
//!
//! A [`Switch`] is immutable from the evaluator's point of view: the
//! registry replaces cached copies wholesale, the evaluation path never
//! mutates one in place. Parsing the stored payload fails closed — a
//! payload that cannot be understood yields a switch that is inactive for
//! every query instead of an error at the call site.

use crate::condition::Rule;
use crate::error::{SwitchError, SwitchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Highest stored-payload schema version this crate understands.
pub const SCHEMA_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCHEMA_VERSION
}

fn default_admins() -> bool {
    true
}

/// Parsed stored payload of a switch: boolean flags plus a map from
/// group name to rule list.
///
/// Every field has a serde default, so a sparse payload (down to `{}`)
/// parses as a fully-on switch with admin bypass enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchValue {
    /// Payload schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Kill flag: inactive for everyone, admins included
    #[serde(default)]
    pub disable: bool,

    /// Unconditionally active (subordinate only to `disable`)
    #[serde(default)]
    pub global: bool,

    /// Anonymous subjects are allowed without a matching condition
    #[serde(default)]
    pub anon: bool,

    /// Admin subjects bypass condition matching; on unless explicitly
    /// switched off in the stored payload
    #[serde(default = "default_admins")]
    pub admins: bool,

    /// Condition groups, evaluated independently per subject
    #[serde(default)]
    pub conditions: BTreeMap<String, Vec<Rule>>,
}

impl Default for SwitchValue {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            disable: false,
            global: false,
            anon: false,
            admins: true,
            conditions: BTreeMap::new(),
        }
    }
}

impl SwitchValue {
    /// Create a value with no conditions and no flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tombstone served for unparsable payloads: inactive for every
    /// query, including admin bypass.
    pub fn fail_closed() -> Self {
        Self {
            disable: true,
            admins: false,
            ..Self::default()
        }
    }

    /// Append a rule to the named condition group.
    pub fn with_condition(mut self, group: impl Into<String>, rule: Rule) -> Self {
        self.conditions.entry(group.into()).or_default().push(rule);
        self
    }

    /// Set the kill flag.
    pub fn with_disable(mut self) -> Self {
        self.disable = true;
        self
    }

    /// Set the unconditionally-active flag.
    pub fn with_global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Allow anonymous subjects.
    pub fn with_anon(mut self) -> Self {
        self.anon = true;
        self
    }

    /// Enable or disable admin bypass.
    pub fn with_admins(mut self, admins: bool) -> Self {
        self.admins = admins;
        self
    }

    /// Serialize for the write path.
    pub fn to_raw(&self) -> SwitchResult<String> {
        serde_json::to_string(self).map_err(|e| SwitchError::Serialization(e.to_string()))
    }
}

/// A named feature switch: a key plus its parsed [`SwitchValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    key: String,
    value: SwitchValue,
}

impl Switch {
    /// Build a switch from an in-memory value.
    pub fn new(key: impl Into<String>, value: SwitchValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Parse a switch from its stored representation.
    ///
    /// Fails closed: a payload that does not deserialize, or that carries
    /// a schema version newer than [`SCHEMA_VERSION`], yields the
    /// [`SwitchValue::fail_closed`] tombstone.
    pub fn from_raw(key: impl Into<String>, raw: &str) -> Self {
        let key = key.into();
        let value = match serde_json::from_str::<SwitchValue>(raw) {
            Ok(value) if value.version <= SCHEMA_VERSION => value,
            Ok(value) => {
                warn!(
                    key = %key,
                    version = value.version,
                    "unsupported switch schema version, failing closed"
                );
                SwitchValue::fail_closed()
            }
            Err(err) => {
                warn!(key = %key, error = %err, "malformed switch payload, failing closed");
                SwitchValue::fail_closed()
            }
        };
        Self { key, value }
    }

    /// The unique key of this switch.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Typed view over the stored flags and condition groups.
    pub fn value(&self) -> &SwitchValue {
        &self.value
    }
}
