// crates/voicebot-core/src/core/mod.rs
// ============================================================================
// Module: Voicebot Core Types
// Description: Identifiers, endpoints, ingress, trigger rules, and trust grants.
// Purpose: Provide the immutable building blocks of a routing topology.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types are plain immutable values. They carry no interior mutability,
//! so any of them can be shared across threads once constructed.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod arn;
pub mod endpoint;
pub mod hashing;
pub mod identifiers;
pub mod ingress;
pub mod policy;
pub mod trigger;
pub mod trust;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use arn::ArnScope;
pub use arn::ResourceArn;
pub use endpoint::BotEndpointRef;
pub use endpoint::HandlerConfig;
pub use endpoint::HandlerDefinition;
pub use endpoint::MediaApplication;
pub use hashing::Fingerprint;
pub use hashing::HashError;
pub use identifiers::AccountId;
pub use identifiers::ApplicationId;
pub use identifiers::BotAliasId;
pub use identifiers::BotId;
pub use identifiers::CallId;
pub use identifiers::E164Number;
pub use identifiers::HandlerName;
pub use identifiers::IdentifierError;
pub use identifiers::Partition;
pub use identifiers::Region;
pub use identifiers::RuleName;
pub use identifiers::TwoLetterCode;
pub use identifiers::VoiceConnectorId;
pub use ingress::CidrBlock;
pub use ingress::CidrError;
pub use ingress::Ingress;
pub use ingress::PhoneNumberIngress;
pub use ingress::PhoneNumberType;
pub use ingress::TrunkIngress;
pub use policy::PolicyDocument;
pub use policy::PolicyDocumentError;
pub use trigger::RuleError;
pub use trigger::RuleTarget;
pub use trigger::TriggerRule;
pub use trigger::TriggerRuleSet;
pub use trigger::TriggerType;
pub use trust::AuthorizationDecision;
pub use trust::Condition;
pub use trust::ConditionKey;
pub use trust::ConditionOperator;
pub use trust::DenyReason;
pub use trust::InvocationContext;
pub use trust::TrustGrant;
pub use trust::TrustModel;
