//! Switch evaluation.
//!
//! Turns a (switch, subjects) pair into a single active/inactive
//! decision. The decision order is fixed: the kill flag, then the global
//! flag, then the unconditional default for switches with no conditions,
//! then per-subject condition matching. Any one passing subject activates
//! the switch. Evaluation is pure and lock-free.

use crate::condition::{Rule, matches_identifier, matches_ip};
use crate::subject::Subject;
use crate::switch::{Switch, SwitchValue};

/// Condition group matched against [`Subject::id`].
pub const USERS_GROUP: &str = "users";

/// Condition group matched against [`Subject::ip`].
pub const IP_GROUP: &str = "ipaddress";

/// Evaluate a switch against zero or more subjects.
pub fn evaluate(switch: &Switch, subjects: &[&dyn Subject]) -> bool {
    let value = switch.value();
    if value.disable {
        return false;
    }
    if value.global || value.conditions.is_empty() {
        return true;
    }
    // every supported condition group is subject-scoped: with nobody to
    // test, a conditioned switch is inactive
    subjects.iter().any(|subject| subject_passes(value, *subject))
}

fn subject_passes(value: &SwitchValue, subject: &dyn Subject) -> bool {
    if subject.is_admin() && value.admins {
        return true;
    }
    if subject.is_anonymous() && value.anon {
        return true;
    }
    value
        .conditions
        .iter()
        .any(|(group, rules)| group_matches(group, rules, subject))
}

/// One condition group against one subject. Rules within a group are
/// OR'd; a group whose attribute the subject does not expose never
/// matches.
fn group_matches(group: &str, rules: &[Rule], subject: &dyn Subject) -> bool {
    match group {
        USERS_GROUP => match subject.id() {
            Some(id) => rules.iter().any(|rule| matches_identifier(rule, id)),
            None => false,
        },
        IP_GROUP => match subject.ip() {
            Some(ip) => rules.iter().any(|rule| matches_ip(rule, ip)),
            None => false,
        },
        other => match subject.attribute(other) {
            Some(attr) => rules.iter().any(|rule| matches_identifier(rule, attr)),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{AnonymousSubject, PeerSubject, UserSubject};
    use std::net::Ipv4Addr;

    fn switch(value: SwitchValue) -> Switch {
        Switch::new("feature", value)
    }

    #[test]
    fn test_disable_beats_everything() {
        let s = switch(SwitchValue::new().with_disable().with_global());
        let admin = UserSubject::new(1).with_admin();
        assert!(!evaluate(&s, &[]));
        assert!(!evaluate(&s, &[&admin]));
    }

    #[test]
    fn test_global_flag_is_unconditional() {
        let s = switch(
            SwitchValue::new()
                .with_global()
                .with_condition(USERS_GROUP, Rule::Id(1)),
        );
        assert!(evaluate(&s, &[]));
        assert!(evaluate(&s, &[&UserSubject::new(999)]));
    }

    #[test]
    fn test_no_conditions_defaults_to_active() {
        let s = switch(SwitchValue::new());
        assert!(evaluate(&s, &[]));
        assert!(evaluate(&s, &[&AnonymousSubject::new()]));
    }

    #[test]
    fn test_conditions_without_subject_are_inactive() {
        let s = switch(SwitchValue::new().with_condition(USERS_GROUP, Rule::Id(1)));
        assert!(!evaluate(&s, &[]));
    }

    #[test]
    fn test_admin_bypass_is_on_by_default() {
        let s = switch(SwitchValue::new().with_condition(USERS_GROUP, Rule::Id(1)));
        let admin = UserSubject::new(999).with_admin();
        assert!(evaluate(&s, &[&admin]));
    }

    #[test]
    fn test_admin_bypass_can_be_disabled() {
        let s = switch(
            SwitchValue::new()
                .with_admins(false)
                .with_condition(USERS_GROUP, Rule::Id(1)),
        );
        let admin = UserSubject::new(999).with_admin();
        assert!(!evaluate(&s, &[&admin]));
        // a listed admin still matches through the condition itself
        let listed = UserSubject::new(1).with_admin();
        assert!(evaluate(&s, &[&listed]));
    }

    #[test]
    fn test_user_set_membership() {
        let s = switch(
            SwitchValue::new()
                .with_admins(false)
                .with_condition(USERS_GROUP, Rule::Id(5)),
        );
        assert!(evaluate(&s, &[&UserSubject::new(5)]));
        assert!(!evaluate(&s, &[&UserSubject::new(6)]));
    }

    #[test]
    fn test_percentage_rollout_by_bucket() {
        // id 93 buckets to 42, id 5 to 93
        let s = switch(SwitchValue::new().with_condition(USERS_GROUP, Rule::Range(0, 50)));
        assert!(evaluate(&s, &[&UserSubject::new(93)]));
        assert!(!evaluate(&s, &[&UserSubject::new(5)]));
    }

    #[test]
    fn test_groups_are_independent_any_match_wins() {
        // id 5 buckets to 93: misses the users range, passes via forums
        let s = switch(
            SwitchValue::new()
                .with_condition(USERS_GROUP, Rule::Range(0, 50))
                .with_condition("forums", Rule::Range(0, 5)),
        );
        // attribute 8771 buckets to 0
        let user = UserSubject::new(5).with_attribute("forums", 8771);
        assert!(evaluate(&s, &[&user]));

        // no forums attribute, bucket 93 out of range: inactive
        assert!(!evaluate(&s, &[&UserSubject::new(5)]));
    }

    #[test]
    fn test_anonymous_never_matches_user_sets() {
        let s = switch(
            SwitchValue::new()
                .with_condition(USERS_GROUP, Rule::Id(1))
                .with_condition(USERS_GROUP, Rule::Id(10)),
        );
        assert!(!evaluate(&s, &[&AnonymousSubject::new()]));
    }

    #[test]
    fn test_anon_flag_admits_anonymous_subjects() {
        let s = switch(
            SwitchValue::new()
                .with_anon()
                .with_condition(USERS_GROUP, Rule::Id(1)),
        );
        assert!(evaluate(&s, &[&AnonymousSubject::new()]));
    }

    #[test]
    fn test_anonymous_can_match_identity_free_conditions() {
        // ip-range conditions need no identity, so an anonymous peer can pass
        let s = switch(SwitchValue::new().with_condition(IP_GROUP, Rule::Range(50, 100)));
        let peer = PeerSubject::new(Ipv4Addr::new(192, 168, 1, 1));
        assert!(evaluate(&s, &[&peer]));
        assert!(!evaluate(&s, &[&AnonymousSubject::new()]));
    }

    #[test]
    fn test_any_subject_passing_activates() {
        let s = switch(
            SwitchValue::new()
                .with_admins(false)
                .with_condition(IP_GROUP, Rule::Literal("192.168.1.1".into())),
        );
        let user = UserSubject::new(5);
        let peer = PeerSubject::new(Ipv4Addr::new(192, 168, 1, 1));
        assert!(!evaluate(&s, &[&user]));
        assert!(evaluate(&s, &[&user, &peer]));
    }

    #[test]
    fn test_unknown_group_without_attribute_is_no_match() {
        let s = switch(SwitchValue::new().with_condition("datacenter", Rule::Id(3)));
        assert!(!evaluate(&s, &[&UserSubject::new(3)]));
    }

    #[test]
    fn test_fail_closed_tombstone_is_inactive() {
        let s = Switch::from_raw("feature", "{broken");
        let admin = UserSubject::new(1).with_admin();
        assert!(!evaluate(&s, &[&admin]));
    }
}
