//! Trust model evaluation tests for voicebot-core.
// crates/voicebot-core/tests/trust_model.rs
// =============================================================================
// Module: Trust Model Tests
// Description: Fail-closed authorization of bot conversations.
// Purpose: Ensure only scoped telephony resources may start bot conversations.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use voicebot_core::AccountId;
use voicebot_core::AuthorizationDecision;
use voicebot_core::Condition;
use voicebot_core::ConditionKey;
use voicebot_core::ConditionOperator;
use voicebot_core::DenyReason;
use voicebot_core::InvocationContext;
use voicebot_core::ResourceArn;
use voicebot_core::TrustGrant;
use voicebot_core::TrustModel;
use voicebot_core::core::trust::BOT_ACCESS_SID;
use voicebot_core::core::trust::START_CONVERSATION_ACTION;
use voicebot_core::core::trust::VOICE_CONNECTOR_SERVICE_PRINCIPAL;
use voicebot_core::core::trust::arn_pattern_matches;

mod common;

const BOT_ARN: &str = "arn:aws:lex:us-east-1:123456789012:bot-alias/B1/A1";

fn model() -> TrustModel {
    TrustModel::new(vec![TrustGrant::bot_access(&common::scope(), ResourceArn::from(BOT_ARN))])
}

fn context(account: &str, source_arn: &str) -> InvocationContext {
    InvocationContext::new(AccountId::parse(account).unwrap(), ResourceArn::from(source_arn))
}

fn authorize(model: &TrustModel, resource: &str, ctx: &InvocationContext) -> AuthorizationDecision {
    model.authorize(
        VOICE_CONNECTOR_SERVICE_PRINCIPAL,
        START_CONVERSATION_ACTION,
        &ResourceArn::from(resource),
        ctx,
    )
}

#[test]
fn same_account_voice_connector_is_allowed() {
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    assert_eq!(
        authorize(&model(), BOT_ARN, &ctx),
        AuthorizationDecision::Allow {
            sid: BOT_ACCESS_SID.to_string(),
        }
    );
}

#[test]
fn foreign_account_is_denied_on_source_account() {
    let ctx = context("999999999999", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    assert_eq!(
        authorize(&model(), BOT_ARN, &ctx),
        AuthorizationDecision::Deny {
            reason: DenyReason::ConditionFailed {
                sid: BOT_ACCESS_SID.to_string(),
                operator: ConditionOperator::StringEquals,
                key: ConditionKey::SourceAccount,
            },
        }
    );
}

#[test]
fn other_region_source_is_denied_on_source_arn() {
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-west-2:123456789012:sma/x");
    let decision = authorize(&model(), BOT_ARN, &ctx);
    assert!(matches!(
        decision,
        AuthorizationDecision::Deny {
            reason: DenyReason::ConditionFailed {
                key: ConditionKey::SourceArn,
                ..
            }
        }
    ));
}

#[test]
fn non_voice_connector_service_is_denied() {
    let ctx = context("123456789012", "arn:aws:lambda:us-east-1:123456789012:function:x");
    assert!(!authorize(&model(), BOT_ARN, &ctx).is_allowed());
}

#[test]
fn unknown_resource_has_no_matching_grant() {
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    let other = "arn:aws:lex:us-east-1:123456789012:bot-alias/B2/A1";
    assert_eq!(
        authorize(&model(), other, &ctx),
        AuthorizationDecision::Deny {
            reason: DenyReason::NoMatchingGrant,
        }
    );
}

#[test]
fn unknown_principal_and_action_have_no_matching_grant() {
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    let resource = ResourceArn::from(BOT_ARN);
    let by_principal =
        model().authorize("lambda.amazonaws.com", START_CONVERSATION_ACTION, &resource, &ctx);
    let by_action =
        model().authorize(VOICE_CONNECTOR_SERVICE_PRINCIPAL, "lex:DeleteBot", &resource, &ctx);
    for decision in [by_principal, by_action] {
        assert_eq!(
            decision,
            AuthorizationDecision::Deny {
                reason: DenyReason::NoMatchingGrant,
            }
        );
    }
}

#[test]
fn empty_model_denies_everything() {
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    assert!(!authorize(&TrustModel::new(Vec::new()), BOT_ARN, &ctx).is_allowed());
}

#[test]
fn condition_values_are_any_of() {
    let mut grant = TrustGrant::bot_access(&common::scope(), ResourceArn::from(BOT_ARN));
    grant.conditions[0].values.push("210987654321".to_string());
    let model = TrustModel::new(vec![grant]);
    let ctx = context("210987654321", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    assert!(authorize(&model, BOT_ARN, &ctx).is_allowed());
}

#[test]
fn first_allowing_grant_wins() {
    let mut strict = TrustGrant::bot_access(&common::scope(), ResourceArn::from(BOT_ARN));
    strict.sid = "Strict".to_string();
    strict.conditions.push(Condition::new(
        ConditionOperator::StringEquals,
        ConditionKey::SourceArn,
        "arn:aws:voiceconnector:us-east-1:123456789012:vc/other",
    ));
    let mut open = TrustGrant::bot_access(&common::scope(), ResourceArn::from(BOT_ARN));
    open.sid = "Open".to_string();
    let model = TrustModel::new(vec![strict, open]);
    let ctx = context("123456789012", "arn:aws:voiceconnector:us-east-1:123456789012:vc/abc");
    assert_eq!(
        authorize(&model, BOT_ARN, &ctx),
        AuthorizationDecision::Allow {
            sid: "Open".to_string(),
        }
    );
}

#[test]
fn arn_patterns_match_segment_wise() {
    let pattern = "arn:aws:voiceconnector:us-east-1:123456789012:*";
    assert!(arn_pattern_matches(pattern, "arn:aws:voiceconnector:us-east-1:123456789012:vc/a"));
    assert!(arn_pattern_matches(pattern, "arn:aws:voiceconnector:us-east-1:123456789012:a:b"));
    assert!(!arn_pattern_matches(pattern, "arn:aws:voiceconnector:us-east-1:123456789012"));
    assert!(!arn_pattern_matches(pattern, "arn:aws:voiceconnector:us-east-10:123456789012:x"));
    assert!(arn_pattern_matches("arn:aws:*:us-east-1:1:x", "arn:aws:lex:us-east-1:1:x"));
    assert!(!arn_pattern_matches("arn:aws:*:us-east-1:1:x", "arn:aws:lex:us-east-1:1:y"));
    assert!(arn_pattern_matches("arn:aws:lex:r:1:bot/*", "arn:aws:lex:r:1:bot/B1"));
    assert!(!arn_pattern_matches("arn:aws:lex:r:1:bot/*", "arn:aws:lex:r:1:alias/B1"));
}

proptest! {
    #[test]
    fn authorization_is_deterministic(account in "[0-9]{12}", resource in "[a-z0-9/]{1,20}") {
        let ctx = context(
            &account,
            &format!("arn:aws:voiceconnector:us-east-1:{account}:{resource}"),
        );
        let first = authorize(&model(), BOT_ARN, &ctx);
        let second = authorize(&model(), BOT_ARN, &ctx);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.is_allowed(), account == common::ACCOUNT);
    }
}
