//! Policy document rendering tests for voicebot-core.
// crates/voicebot-core/tests/policy_document.rs
// =============================================================================
// Module: Policy Document Tests
// Description: Wire shape of the bot resource policy.
// Purpose: Keep the rendered document bit-exact and round-trippable.
// =============================================================================

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use voicebot_core::PolicyDocument;
use voicebot_core::PolicyDocumentError;
use voicebot_core::ResourceArn;
use voicebot_core::TrustGrant;

mod common;

const EXPECTED: &str = concat!(
    r#"{"Version":"2012-10-17","Statement":[{"Sid":"AllowChimePstnAudioUseBot","#,
    r#""Effect":"Allow","Principal":{"Service":"voiceconnector.chime.amazonaws.com"},"#,
    r#""Action":"lex:StartConversation","#,
    r#""Resource":"arn:aws:lex:us-east-1:123456789012:bot-alias/B1/A1","#,
    r#""Condition":{"StringEquals":{"AWS:SourceAccount":"123456789012"},"#,
    r#""ArnEquals":{"AWS:SourceArn":"arn:aws:voiceconnector:us-east-1:123456789012:*"}}}]}"#,
);

fn grant() -> TrustGrant {
    let scope = common::scope();
    TrustGrant::bot_access(&scope, common::bot().alias_arn(&scope))
}

#[test]
fn bot_access_policy_renders_exactly() {
    let document = PolicyDocument::from_grants(&[grant()]);
    assert_eq!(document.to_json().unwrap(), EXPECTED);
}

#[test]
fn policy_document_round_trips_to_same_grants() {
    let model = PolicyDocument::from_json(EXPECTED).unwrap().into_trust_model().unwrap();
    assert_eq!(model.grants(), &[grant()]);
}

#[test]
fn condition_value_lists_are_accepted() {
    let json = EXPECTED.replace(r#""AWS:SourceAccount":"123456789012""#, r#""AWS:SourceAccount":["123456789012","210987654321"]"#);
    let model = PolicyDocument::from_json(&json).unwrap().into_trust_model().unwrap();
    assert_eq!(model.grants()[0].conditions[0].values.len(), 2);
    let rendered = PolicyDocument::from_grants(model.grants()).to_json().unwrap();
    assert_eq!(rendered, json);
}

#[test]
fn deny_statements_are_rejected() {
    let json = EXPECTED.replace(r#""Effect":"Allow""#, r#""Effect":"Deny""#);
    let result = PolicyDocument::from_json(&json).unwrap().into_trust_model();
    assert!(matches!(result, Err(PolicyDocumentError::DenyStatement(_))));
}

#[test]
fn unknown_versions_are_rejected() {
    let json = EXPECTED.replace("2012-10-17", "2008-10-17");
    let result = PolicyDocument::from_json(&json).unwrap().into_trust_model();
    assert!(matches!(result, Err(PolicyDocumentError::UnsupportedVersion(_))));
}

#[test]
fn unknown_operators_and_keys_fail_to_parse() {
    let operator = EXPECTED.replace("ArnEquals", "ArnLike");
    assert!(matches!(PolicyDocument::from_json(&operator), Err(PolicyDocumentError::Json(_))));
    let key = EXPECTED.replace("AWS:SourceAccount", "AWS:PrincipalTag");
    assert!(matches!(PolicyDocument::from_json(&key), Err(PolicyDocumentError::Json(_))));
}

#[test]
fn empty_condition_lists_are_rejected() {
    let json = EXPECTED.replace(r#""AWS:SourceAccount":"123456789012""#, r#""AWS:SourceAccount":[]"#);
    let result = PolicyDocument::from_json(&json).unwrap().into_trust_model();
    assert!(matches!(result, Err(PolicyDocumentError::EmptyConditionValues { .. })));
}

#[test]
fn statement_without_conditions_omits_the_block() {
    let mut bare = grant();
    bare.conditions.clear();
    bare.resource = ResourceArn::from("arn:aws:lex:us-east-1:123456789012:bot-alias/B1/A1");
    let json = PolicyDocument::from_grants(&[bare]).to_json().unwrap();
    assert!(!json.contains("Condition"));
}

#[test]
fn cross_region_namespaces_render_as_a_list() {
    let scope = common::scope();
    let grant = TrustGrant::bot_access_from_regions(
        &scope,
        common::bot().alias_arn(&scope),
        &[common::region("us-west-2"), common::region("us-east-1")],
    );
    let json = PolicyDocument::from_grants(std::slice::from_ref(&grant)).to_json().unwrap();
    let expected = EXPECTED.replace(
        r#""AWS:SourceArn":"arn:aws:voiceconnector:us-east-1:123456789012:*""#,
        r#""AWS:SourceArn":["arn:aws:voiceconnector:us-east-1:123456789012:*","arn:aws:voiceconnector:us-west-2:123456789012:*"]"#,
    );
    assert_eq!(json, expected);
    let model = PolicyDocument::from_json(&json).unwrap().into_trust_model().unwrap();
    assert_eq!(model.grants(), &[grant]);
}
