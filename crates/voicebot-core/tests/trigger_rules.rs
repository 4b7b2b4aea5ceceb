//! Trigger rule resolution tests for voicebot-core.
// crates/voicebot-core/tests/trigger_rules.rs
// =============================================================================
// Module: Trigger Rule Tests
// Description: Exact-match resolution and ordered failover targets.
// Purpose: Ensure rule sets stay unambiguous and targets stay priority-sorted.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use voicebot_core::Resolution;
use voicebot_core::RuleError;
use voicebot_core::RuleName;
use voicebot_core::RuleTarget;
use voicebot_core::TopologyBuilder;
use voicebot_core::TriggerRule;
use voicebot_core::TriggerRuleSet;
use voicebot_core::TriggerType;

mod common;

fn target(application: &str, region: &str, priority: u32) -> RuleTarget {
    RuleTarget::new(common::region(region), priority, common::app_id(application))
}

fn phone_rule(name: &str, number: &str, targets: Vec<RuleTarget>) -> TriggerRule {
    TriggerRule::new(RuleName::from(name), TriggerType::ToPhoneNumber, number, targets).unwrap()
}

fn two_region_builder() -> TopologyBuilder {
    TopologyBuilder::new(common::scope())
        .bot(common::bot())
        .handler(common::handler("east-handler"))
        .handler(common::handler("west-handler"))
        .application(common::application("app-a", "us-east-1", "east-handler"))
        .application(common::application("app-b", "us-west-2", "west-handler"))
        .ingress(common::phone_ingress(common::PHONE))
}

#[test]
fn matched_rule_returns_targets_in_priority_order() {
    let rule = phone_rule(
        "inbound",
        common::PHONE,
        vec![target("app-b", "us-west-2", 2), target("app-a", "us-east-1", 1)],
    );
    let topology = two_region_builder().rule(rule).build().unwrap();
    let Resolution::Matched {
        rule,
        targets,
    } = topology.resolve(TriggerType::ToPhoneNumber, common::PHONE)
    else {
        panic!("expected a match");
    };
    assert_eq!(rule.name().as_str(), "inbound");
    let ids: Vec<&str> = targets.iter().map(|target| target.application.id.as_str()).collect();
    assert_eq!(ids, ["app-a", "app-b"]);
    assert_eq!(targets[1].handler.name.as_str(), "west-handler");
}

#[test]
fn unmatched_value_resolves_to_no_match() {
    let topology = two_region_builder().build().unwrap();
    assert_eq!(topology.resolve(TriggerType::ToPhoneNumber, "+15555550199"), Resolution::NoMatch);
}

#[test]
fn matching_is_scoped_to_trigger_type() {
    let topology = two_region_builder().build().unwrap();
    assert_eq!(
        topology.resolve(TriggerType::RequestUriHostname, common::PHONE),
        Resolution::NoMatch
    );
}

#[test]
fn matching_is_exact() {
    let topology = two_region_builder().build().unwrap();
    assert_eq!(topology.resolve(TriggerType::ToPhoneNumber, "15555550100"), Resolution::NoMatch);
    assert_eq!(
        topology.resolve(TriggerType::ToPhoneNumber, "+15555550100 "),
        Resolution::NoMatch
    );
}

#[test]
fn request_host_matching_is_exact() {
    let topology = common::standard_builder().build().unwrap();
    let host = format!("{}.voiceconnector.chime.aws", common::CONNECTOR);
    assert!(matches!(
        topology.resolve(TriggerType::RequestUriHostname, &host),
        Resolution::Matched { .. }
    ));
    assert_eq!(
        topology.resolve(TriggerType::RequestUriHostname, "ABCDEF1234.voiceconnector.chime.aws"),
        Resolution::NoMatch
    );
    assert_eq!(
        topology.resolve(TriggerType::RequestUriHostname, &format!("{host}.")),
        Resolution::NoMatch
    );
}

#[test]
fn duplicate_type_and_value_is_ambiguous() {
    let first = phone_rule("first", common::PHONE, vec![target("app-a", "us-east-1", 1)]);
    let second = phone_rule("second", common::PHONE, vec![target("app-b", "us-west-2", 1)]);
    let result = TriggerRuleSet::new(vec![first, second]);
    assert!(matches!(result, Err(RuleError::Ambiguous { .. })));
}

#[test]
fn same_value_under_different_types_is_allowed() {
    let phone = phone_rule("phone", "host.example", vec![target("app-a", "us-east-1", 1)]);
    let host = TriggerRule::new(
        RuleName::from("host"),
        TriggerType::RequestUriHostname,
        "host.example",
        vec![target("app-a", "us-east-1", 1)],
    )
    .unwrap();
    let rules = TriggerRuleSet::new(vec![phone, host]).unwrap();
    assert_eq!(rules.len(), 2);
}

#[test]
fn rules_without_targets_are_rejected() {
    let result =
        TriggerRule::new(RuleName::from("empty"), TriggerType::ToPhoneNumber, common::PHONE, vec![]);
    assert!(matches!(result, Err(RuleError::EmptyTargets(_))));
}

#[test]
fn zero_priority_is_rejected() {
    let result = TriggerRule::new(
        RuleName::from("zero"),
        TriggerType::ToPhoneNumber,
        common::PHONE,
        vec![target("app-a", "us-east-1", 0)],
    );
    assert!(matches!(result, Err(RuleError::InvalidPriority(_))));
}

#[test]
fn empty_trigger_value_is_rejected() {
    let result = TriggerRule::new(
        RuleName::from("blank"),
        TriggerType::ToPhoneNumber,
        "",
        vec![target("app-a", "us-east-1", 1)],
    );
    assert!(matches!(result, Err(RuleError::EmptyTriggerValue(_))));
}

proptest! {
    #[test]
    fn targets_are_sorted_and_ties_keep_declaration_order(
        priorities in proptest::collection::vec(1_u32 .. 5, 1 .. 12)
    ) {
        let targets: Vec<RuleTarget> = priorities
            .iter()
            .enumerate()
            .map(|(index, priority)| target(&format!("app-{index}"), "us-east-1", *priority))
            .collect();
        let rule = phone_rule("prop", common::PHONE, targets);
        let ordered: Vec<(u32, usize)> = rule
            .targets()
            .iter()
            .map(|target| {
                let index = target.application.as_str()[4 ..].parse::<usize>().unwrap();
                (target.priority, index)
            })
            .collect();
        let mut expected = ordered.clone();
        expected.sort_unstable();
        prop_assert_eq!(ordered, expected);
    }
}
