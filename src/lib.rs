//! Runtime feature switches for Rust services.
//!
//! Decides whether a named feature is active for a given subject (a user,
//! an anonymous visitor, a raw network peer) by evaluating stored
//! condition groups against the subject's attributes. Reads come from a
//! TTL-cached snapshot, so high-volume callers never touch the durable
//! store on the hot path.
//!
//! # Features
//!
//! - 🎚️ **Switches** - named toggles with kill, global, anonymous, and
//!   admin-bypass flags
//! - 🎯 **Condition groups** - identifier sets, IPv4 literals and ranges,
//!   domain-specific attributes
//! - 🎲 **Percentage rollout** - stable SHA-256 bucketing into `[0, 100)`
//!   for gradual rollout
//! - ⚡ **Cached registry** - atomically swapped snapshots with TTL plus
//!   explicit invalidation, single-flight refresh, and stale reads kept
//!   in service while the store is unavailable
//!
//! # Quick Start
//!
//! ```
//! use switchgate::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> SwitchResult<()> {
//! let registry = SwitchRegistry::new(MemoryStore::new(), RegistryConfig::default());
//!
//! // Roll a feature out to half the user base
//! let value = SwitchValue::new().with_condition("users", Rule::Range(0, 50));
//! registry.set("new-dashboard", value).await?;
//!
//! let user = UserSubject::new(93);
//! assert!(registry.is_active("new-dashboard", &[&user]).await);
//! # Ok(())
//! # }
//! ```
//!
//! # Evaluating without a registry
//!
//! Evaluation itself is pure; a parsed [`Switch`] can be checked directly:
//!
//! ```
//! use switchgate::*;
//!
//! let switch = Switch::new("beta", SwitchValue::new().with_anon());
//! assert!(evaluate(&switch, &[&AnonymousSubject::new()]));
//! ```
//!
//! # Invalidation
//!
//! Snapshots go stale by TTL, or immediately via
//! [`SwitchRegistry::mark_stale`] — an idempotent hook for whatever
//! unit-of-work boundary the integration layer has (e.g. one call per
//! inbound request). The next access after either signal reloads the full
//! set from the store in one pass.

pub mod condition;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod store;
pub mod subject;
pub mod switch;

pub use condition::Rule;
pub use config::RegistryConfig;
pub use error::{SwitchError, SwitchResult};
pub use evaluator::{IP_GROUP, USERS_GROUP, evaluate};
pub use registry::SwitchRegistry;
pub use store::{MemoryStore, SwitchStore};
pub use subject::{AnonymousSubject, PeerSubject, Subject, UserSubject};
pub use switch::{SCHEMA_VERSION, Switch, SwitchValue};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::condition::Rule;
    pub use crate::config::RegistryConfig;
    pub use crate::error::{SwitchError, SwitchResult};
    pub use crate::evaluator::evaluate;
    pub use crate::registry::SwitchRegistry;
    pub use crate::store::{MemoryStore, SwitchStore};
    pub use crate::subject::{AnonymousSubject, PeerSubject, Subject, UserSubject};
    pub use crate::switch::{Switch, SwitchValue};
}
