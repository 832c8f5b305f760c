//! Subject capability and built-in adapters.
//!
//! A subject is anything a switch can be evaluated against: an
//! authenticated principal, an anonymous visitor, a raw network peer.
//! Every attribute is optional. A rule that needs an attribute the
//! subject does not expose is a non-match, not a fault.

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Capability interface over a subject's typed attributes.
///
/// Implement this for whatever principal type the calling integration
/// carries; the built-in adapters cover the common cases.
pub trait Subject: Send + Sync {
    /// Stable numeric identifier, if the subject has one.
    fn id(&self) -> Option<u64> {
        None
    }

    /// IPv4 address associated with the subject, if any.
    fn ip(&self) -> Option<Ipv4Addr> {
        None
    }

    /// Whether the subject carries no identity.
    fn is_anonymous(&self) -> bool {
        false
    }

    /// Whether the subject is privileged.
    fn is_admin(&self) -> bool {
        false
    }

    /// Domain-specific numeric attribute, looked up by condition group
    /// name (e.g. `"forums"`).
    fn attribute(&self, _name: &str) -> Option<u64> {
        None
    }
}

/// An authenticated principal with a stable identifier.
#[derive(Debug, Clone, Default)]
pub struct UserSubject {
    id: u64,
    admin: bool,
    ip: Option<Ipv4Addr>,
    attributes: HashMap<String, u64>,
}

impl UserSubject {
    /// Create a subject for the given identifier.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Mark the subject as privileged.
    pub fn with_admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Associate an IPv4 address.
    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Attach a domain-specific attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: u64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

impl Subject for UserSubject {
    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    fn ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn attribute(&self, name: &str) -> Option<u64> {
        self.attributes.get(name).copied()
    }
}

/// A visitor with no identity.
#[derive(Debug, Clone, Default)]
pub struct AnonymousSubject {
    ip: Option<Ipv4Addr>,
}

impl AnonymousSubject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate an IPv4 address.
    pub fn with_ip(mut self, ip: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self
    }
}

impl Subject for AnonymousSubject {
    fn ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

/// A raw network peer, known only by its address.
#[derive(Debug, Clone)]
pub struct PeerSubject {
    addr: Ipv4Addr,
}

impl PeerSubject {
    pub fn new(addr: Ipv4Addr) -> Self {
        Self { addr }
    }
}

impl Subject for PeerSubject {
    fn ip(&self) -> Option<Ipv4Addr> {
        Some(self.addr)
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_subject_attributes() {
        let user = UserSubject::new(5)
            .with_admin()
            .with_ip(Ipv4Addr::new(10, 0, 0, 1))
            .with_attribute("forums", 42);

        assert_eq!(user.id(), Some(5));
        assert_eq!(user.ip(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(user.is_admin());
        assert!(!user.is_anonymous());
        assert_eq!(user.attribute("forums"), Some(42));
        assert_eq!(user.attribute("unknown"), None);
    }

    #[test]
    fn test_anonymous_subject_has_no_identity() {
        let anon = AnonymousSubject::new();
        assert_eq!(anon.id(), None);
        assert!(anon.is_anonymous());
        assert!(!anon.is_admin());
    }

    #[test]
    fn test_peer_subject_exposes_only_address() {
        let peer = PeerSubject::new(Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(peer.ip(), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(peer.id(), None);
        assert!(peer.is_anonymous());
    }
}
