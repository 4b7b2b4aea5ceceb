//! Identifier and ingress value tests for voicebot-core.
// crates/voicebot-core/tests/identifiers.rs
// =============================================================================
// Module: Identifier Tests
// Description: Validation of identifiers, ARNs, and CIDR blocks.
// Purpose: Ensure malformed inputs are rejected before they reach an ARN.
// =============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap on deterministic fixtures."
)]

use std::net::Ipv4Addr;

use proptest::prelude::*;
use voicebot_core::AccountId;
use voicebot_core::ApplicationId;
use voicebot_core::ArnScope;
use voicebot_core::BotAliasId;
use voicebot_core::BotId;
use voicebot_core::CidrBlock;
use voicebot_core::CidrError;
use voicebot_core::E164Number;
use voicebot_core::HandlerConfig;
use voicebot_core::IdentifierError;
use voicebot_core::Partition;
use voicebot_core::Region;
use voicebot_core::TwoLetterCode;
use voicebot_core::TrunkIngress;
use voicebot_core::VoiceConnectorId;

mod common;

#[test]
fn account_ids_are_twelve_digits() {
    assert!(AccountId::parse("123456789012").is_ok());
    assert!(matches!(AccountId::parse("12345678901"), Err(IdentifierError::InvalidAccount(_))));
    assert!(AccountId::parse("12345678901a").is_err());
}

#[test]
fn regions_follow_provider_shape() {
    for good in ["us-east-1", "ap-southeast-2", "us-gov-west-1"] {
        assert!(Region::parse(good).is_ok(), "{good}");
    }
    for bad in ["", "us-east", "US-EAST-1", "us-east-x", "us:east-1", "us--1"] {
        assert!(Region::parse(bad).is_err(), "{bad}");
    }
}

#[test]
fn partitions_reject_arn_separators() {
    assert_eq!(Partition::default().as_str(), "aws");
    assert!(Partition::parse("aws-cn").is_ok());
    assert!(Partition::parse("aws:cn").is_err());
    assert!(Partition::parse("").is_err());
}

#[test]
fn phone_numbers_are_e164() {
    assert!(E164Number::parse("+15555550100").is_ok());
    for bad in ["15555550100", "+0555", "+1", "+1234567890123456", "+1555-555-0100"] {
        assert!(E164Number::parse(bad).is_err(), "{bad}");
    }
}

#[test]
fn two_letter_codes_are_uppercase() {
    assert!(TwoLetterCode::parse("AZ").is_ok());
    assert!(TwoLetterCode::parse("az").is_err());
    assert!(TwoLetterCode::parse("USA").is_err());
}

#[test]
fn segment_identifiers_reject_separators() {
    assert!(BotId::parse("BOT_1.v2-x").is_ok());
    let overlong = "x".repeat(129);
    for bad in ["", "a/b", "a:b", "a b", overlong.as_str()] {
        assert!(matches!(BotId::parse(bad), Err(IdentifierError::InvalidSegment { .. })), "{bad}");
    }
}

#[test]
fn identifiers_deserialize_through_validation() {
    let ok: Result<ApplicationId, _> = serde_json::from_str("\"sma-1\"");
    assert!(ok.is_ok());
    let bad: Result<ApplicationId, _> = serde_json::from_str("\"sma/1\"");
    assert!(bad.is_err());
}

#[test]
fn arn_scope_renders_every_resource_kind() {
    let scope = common::scope();
    assert_eq!(
        scope.bot_alias(&BotId::parse("B1").unwrap(), &BotAliasId::parse("A1").unwrap()).as_str(),
        "arn:aws:lex:us-east-1:123456789012:bot-alias/B1/A1"
    );
    assert_eq!(
        scope.voice_connector_namespace(),
        "arn:aws:voiceconnector:us-east-1:123456789012:*"
    );
    assert_eq!(
        scope.sip_media_application(&common::app_id("sma-1")).as_str(),
        "arn:aws:voiceconnector:us-east-1:123456789012:sma/sma-1"
    );
    let china = ArnScope::new(
        Partition::parse("aws-cn").unwrap(),
        Region::parse("cn-north-1").unwrap(),
        AccountId::parse("123456789012").unwrap(),
    );
    assert_eq!(china.voice_connector_namespace(), "arn:aws-cn:voiceconnector:cn-north-1:123456789012:*");
}

#[test]
fn handler_environment_carries_bot_and_language() {
    let environment = HandlerConfig::new(common::bot()).environment();
    assert_eq!(environment.get("lang").map(String::as_str), Some("EN"));
    assert_eq!(environment.get("LEX_BOT_ID").map(String::as_str), Some("B1"));
    assert_eq!(environment.get("LEX_BOT_ALIAS_ID").map(String::as_str), Some("A1"));
}

#[test]
fn cidr_blocks_parse_and_contain() {
    let block: CidrBlock = "54.172.60.0/30".parse().unwrap();
    assert!(block.contains(Ipv4Addr::new(54, 172, 60, 3)));
    assert!(!block.contains(Ipv4Addr::new(54, 172, 60, 4)));
    assert_eq!(block.to_string(), "54.172.60.0/30");

    let any: CidrBlock = "0.0.0.0/0".parse().unwrap();
    assert!(any.contains(Ipv4Addr::new(203, 0, 113, 9)));
}

#[test]
fn malformed_cidr_blocks_are_rejected() {
    assert!(matches!("10.0.0.0".parse::<CidrBlock>(), Err(CidrError::MissingPrefix(_))));
    assert!(matches!("10.0.0/8".parse::<CidrBlock>(), Err(CidrError::InvalidAddress(_))));
    assert!(matches!("10.0.0.0/33".parse::<CidrBlock>(), Err(CidrError::InvalidPrefix(_))));
    assert!(matches!("10.0.0.1/24".parse::<CidrBlock>(), Err(CidrError::HostBitsSet(_))));
}

#[test]
fn trunk_defaults_and_source_filtering() {
    let trunk = TrunkIngress::new(
        VoiceConnectorId::parse("vc1").unwrap(),
        vec!["54.244.51.0/30".parse().unwrap()],
        vec![TwoLetterCode::parse("US").unwrap()],
    );
    assert!(trunk.encryption);
    assert_eq!(trunk.routing_hostname(), "vc1.voiceconnector.chime.aws");
    assert!(trunk.permits_source(Ipv4Addr::new(54, 244, 51, 1)));
    assert!(!trunk.permits_source(Ipv4Addr::new(10, 0, 0, 1)));
    let custom = trunk.with_routing_domain("sip.example.net").with_encryption(false);
    assert_eq!(custom.routing_hostname(), "vc1.sip.example.net");
    assert!(!custom.encryption);
}

proptest! {
    #[test]
    fn distinct_bot_references_render_distinct_arns(
        first_bot in "[A-Za-z0-9]{1,10}",
        first_alias in "[A-Za-z0-9]{1,10}",
        second_bot in "[A-Za-z0-9]{1,10}",
        second_alias in "[A-Za-z0-9]{1,10}",
    ) {
        let scope = common::scope();
        let first = scope.bot_alias(
            &BotId::parse(first_bot.clone()).unwrap(),
            &BotAliasId::parse(first_alias.clone()).unwrap(),
        );
        let second = scope.bot_alias(
            &BotId::parse(second_bot.clone()).unwrap(),
            &BotAliasId::parse(second_alias.clone()).unwrap(),
        );
        prop_assert_eq!(first == second, first_bot == second_bot && first_alias == second_alias);
    }
}
