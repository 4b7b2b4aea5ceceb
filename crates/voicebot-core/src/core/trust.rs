// crates/voicebot-core/src/core/trust.rs
// ============================================================================
// Module: Trust Model
// Description: Conditional cross-service grants and their evaluator.
// Purpose: Decide whether a service principal may invoke a resource.
// Dependencies: crate::core::{arn, identifiers}, serde
// ============================================================================

//! ## Overview
//! A [`TrustGrant`] allows one service principal to perform one action on one
//! resource, subject to conditions on the invocation context. The
//! [`TrustModel`] evaluates a request against its grants and fails closed:
//! no matching grant, or any failed condition, yields a deny.
//!
//! Security posture: trust evaluation is the boundary between the telephony
//! service and the bot; every decision must be deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::arn::ArnScope;
use crate::core::arn::ResourceArn;
use crate::core::identifiers::AccountId;
use crate::core::identifiers::Region;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Service principal of the telephony (Voice Connector) service.
pub const VOICE_CONNECTOR_SERVICE_PRINCIPAL: &str = "voiceconnector.chime.amazonaws.com";
/// Action that starts a bot conversation.
pub const START_CONVERSATION_ACTION: &str = "lex:StartConversation";
/// Statement id of the bot access grant.
pub const BOT_ACCESS_SID: &str = "AllowChimePstnAudioUseBot";

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Condition operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionOperator {
    /// Exact string equality.
    StringEquals,
    /// Segment-wise ARN match with trailing wildcard.
    ArnEquals,
}

impl ConditionOperator {
    /// Returns the policy-document label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StringEquals => "StringEquals",
            Self::ArnEquals => "ArnEquals",
        }
    }
}

/// Context key a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionKey {
    /// Account of the calling resource.
    #[serde(rename = "AWS:SourceAccount")]
    SourceAccount,
    /// ARN of the calling resource.
    #[serde(rename = "AWS:SourceArn")]
    SourceArn,
}

impl ConditionKey {
    /// Returns the policy-document label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceAccount => "AWS:SourceAccount",
            Self::SourceArn => "AWS:SourceArn",
        }
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single condition: the key's context value must satisfy the operator
/// against at least one listed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Operator applied.
    pub operator: ConditionOperator,
    /// Context key inspected.
    pub key: ConditionKey,
    /// Accepted values (any-of).
    pub values: Vec<String>,
}

impl Condition {
    /// Creates a condition with a single accepted value.
    #[must_use]
    pub fn new(operator: ConditionOperator, key: ConditionKey, value: impl Into<String>) -> Self {
        Self {
            operator,
            key,
            values: vec![value.into()],
        }
    }

    /// Evaluates the condition against the invocation context.
    #[must_use]
    pub fn holds(&self, context: &InvocationContext) -> bool {
        let actual = match self.key {
            ConditionKey::SourceAccount => context.source_account.as_str(),
            ConditionKey::SourceArn => context.source_arn.as_str(),
        };
        self.values.iter().any(|expected| match self.operator {
            ConditionOperator::StringEquals => expected == actual,
            ConditionOperator::ArnEquals => arn_pattern_matches(expected, actual),
        })
    }
}

// ============================================================================
// SECTION: Grants
// ============================================================================

/// Conditional authorization for one principal, action, and resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustGrant {
    /// Statement identifier.
    pub sid: String,
    /// Service principal allowed to invoke.
    pub principal: String,
    /// Capability string, e.g. `lex:StartConversation`.
    pub action: String,
    /// Rendered target resource.
    pub resource: ResourceArn,
    /// Conditions that must all hold.
    pub conditions: Vec<Condition>,
}

impl TrustGrant {
    /// Grant letting the telephony service start conversations with a bot,
    /// scoped to the deploying account and its Voice Connector namespace.
    #[must_use]
    pub fn bot_access(scope: &ArnScope, bot_alias_arn: ResourceArn) -> Self {
        Self::bot_access_from_regions(scope, bot_alias_arn, &[])
    }

    /// Bot access grant whose source namespaces also cover `regions`.
    ///
    /// The deploying region's namespace is always listed first; further
    /// regions follow in order without duplicates.
    #[must_use]
    pub fn bot_access_from_regions(
        scope: &ArnScope,
        bot_alias_arn: ResourceArn,
        regions: &[Region],
    ) -> Self {
        let mut namespaces = vec![scope.voice_connector_namespace()];
        for region in regions {
            let namespace = scope.in_region(region.clone()).voice_connector_namespace();
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
        Self {
            sid: BOT_ACCESS_SID.to_string(),
            principal: VOICE_CONNECTOR_SERVICE_PRINCIPAL.to_string(),
            action: START_CONVERSATION_ACTION.to_string(),
            resource: bot_alias_arn,
            conditions: vec![
                Condition::new(
                    ConditionOperator::StringEquals,
                    ConditionKey::SourceAccount,
                    scope.account.as_str(),
                ),
                Condition {
                    operator: ConditionOperator::ArnEquals,
                    key: ConditionKey::SourceArn,
                    values: namespaces,
                },
            ],
        }
    }

    /// Returns true when the grant names this principal, action, and resource.
    fn applies_to(&self, principal: &str, action: &str, resource: &ResourceArn) -> bool {
        self.principal == principal && self.action == action && &self.resource == resource
    }

    /// Returns the first condition that fails, if any.
    fn first_failed_condition(&self, context: &InvocationContext) -> Option<&Condition> {
        self.conditions.iter().find(|condition| !condition.holds(context))
    }
}

// ============================================================================
// SECTION: Invocation Context
// ============================================================================

/// Caller facts available at invocation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationContext {
    /// Account owning the calling resource.
    pub source_account: AccountId,
    /// Fully qualified name of the calling resource.
    pub source_arn: ResourceArn,
}

impl InvocationContext {
    /// Creates an invocation context.
    #[must_use]
    pub const fn new(source_account: AccountId, source_arn: ResourceArn) -> Self {
        Self {
            source_account,
            source_arn,
        }
    }
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Reason an invocation was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    /// No grant names the principal, action, and resource.
    NoMatchingGrant,
    /// A grant matched but one of its conditions failed.
    ConditionFailed {
        /// Statement id of the grant.
        sid: String,
        /// Operator of the failed condition.
        operator: ConditionOperator,
        /// Key of the failed condition.
        key: ConditionKey,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingGrant => f.write_str("no matching grant"),
            Self::ConditionFailed {
                sid,
                operator,
                key,
            } => write!(f, "grant {sid}: {} on {key} failed", operator.as_str()),
        }
    }
}

/// Authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthorizationDecision {
    /// Invocation permitted by the named grant.
    Allow {
        /// Statement id of the permitting grant.
        sid: String,
    },
    /// Invocation denied.
    Deny {
        /// Why the invocation was denied.
        #[serde(flatten)]
        reason: DenyReason,
    },
}

impl AuthorizationDecision {
    /// Returns true for [`AuthorizationDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Immutable grant set with a fail-closed evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustModel {
    /// Grants in declaration order.
    grants: Vec<TrustGrant>,
}

impl TrustModel {
    /// Creates a trust model from grants.
    #[must_use]
    pub const fn new(grants: Vec<TrustGrant>) -> Self {
        Self {
            grants,
        }
    }

    /// Returns the grants in declaration order.
    #[must_use]
    pub fn grants(&self) -> &[TrustGrant] {
        &self.grants
    }

    /// Evaluates an invocation request.
    ///
    /// Grants naming the principal, action, and resource are checked in
    /// declaration order; the first whose conditions all hold allows.
    #[must_use]
    pub fn authorize(
        &self,
        principal: &str,
        action: &str,
        resource: &ResourceArn,
        context: &InvocationContext,
    ) -> AuthorizationDecision {
        let mut first_failure = None;
        for grant in self.grants.iter().filter(|grant| grant.applies_to(principal, action, resource))
        {
            match grant.first_failed_condition(context) {
                None => {
                    return AuthorizationDecision::Allow {
                        sid: grant.sid.clone(),
                    };
                }
                Some(condition) => {
                    first_failure.get_or_insert_with(|| DenyReason::ConditionFailed {
                        sid: grant.sid.clone(),
                        operator: condition.operator,
                        key: condition.key,
                    });
                }
            }
        }
        AuthorizationDecision::Deny {
            reason: first_failure.unwrap_or(DenyReason::NoMatchingGrant),
        }
    }
}

// ============================================================================
// SECTION: ARN Matching
// ============================================================================

/// Matches an ARN against a pattern, segment by segment on `:`.
///
/// A non-final `*` segment matches exactly one segment. The final pattern
/// segment may end in `*`, in which case the remainder of the candidate
/// (including further `:` characters) must start with the text before the
/// `*`. Otherwise segments compare exactly and counts must agree.
#[must_use]
pub fn arn_pattern_matches(pattern: &str, candidate: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split(':').collect();
    let Some((last, leading)) = pattern_segments.split_last() else {
        return false;
    };
    let mut remainder = candidate;
    for segment in leading {
        let Some((head, tail)) = remainder.split_once(':') else {
            return false;
        };
        if *segment != "*" && *segment != head {
            return false;
        }
        remainder = tail;
    }
    match last.strip_suffix('*') {
        Some(prefix) => remainder.starts_with(prefix),
        None => *last == remainder,
    }
}
