// crates/voicebot-core/src/core/policy.rs
// ============================================================================
// Module: Resource Policy Documents
// Description: Provider resource-policy document rendering and parsing.
// Purpose: Keep the wire shape bit-exact while the grant model stays typed.
// Dependencies: crate::core::{arn, trust}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Trust grants are authored and evaluated as typed values; the provider
//! consumes them as a JSON policy document. Field order is fixed by struct
//! declaration order: `Sid`, `Effect`, `Principal`, `Action`, `Resource`,
//! `Condition`, with `StringEquals` before `ArnEquals`. Single condition
//! values render as bare strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::arn::ResourceArn;
use crate::core::trust::Condition;
use crate::core::trust::ConditionKey;
use crate::core::trust::ConditionOperator;
use crate::core::trust::TrustGrant;
use crate::core::trust::TrustModel;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Policy language version emitted and accepted.
pub const POLICY_VERSION: &str = "2012-10-17";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy document conversion errors.
#[derive(Debug, Error)]
pub enum PolicyDocumentError {
    /// JSON (de)serialization failed.
    #[error("policy document json error: {0}")]
    Json(String),
    /// Unsupported policy language version.
    #[error("unsupported policy version: {0}")]
    UnsupportedVersion(String),
    /// Deny statements are not representable as grants.
    #[error("statement {0} uses Effect Deny; only Allow grants are supported")]
    DenyStatement(String),
    /// Condition block lists no values for a key.
    #[error("statement {sid} has an empty value list for {key}")]
    EmptyConditionValues {
        /// Statement identifier.
        sid: String,
        /// Condition key with no values.
        key: ConditionKey,
    },
}

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Resource policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    /// Policy language version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Statements in order.
    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEffect {
    /// Permit the action.
    Allow,
    /// Forbid the action.
    Deny,
}

/// Principal block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyPrincipal {
    /// Service principal name.
    #[serde(rename = "Service")]
    pub service: String,
}

/// Value for a condition key: one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Single value.
    One(String),
    /// Multiple values (any-of).
    Many(Vec<String>),
}

impl ConditionValue {
    /// Builds the compact representation for a value list.
    fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::One(values.remove(0))
        } else {
            Self::Many(values)
        }
    }

    /// Returns the values as a list.
    fn into_values(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Condition block; only the operators the grant model understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConditions {
    /// Exact string matches.
    #[serde(rename = "StringEquals", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub string_equals: BTreeMap<ConditionKey, ConditionValue>,
    /// ARN pattern matches.
    #[serde(rename = "ArnEquals", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arn_equals: BTreeMap<ConditionKey, ConditionValue>,
}

impl PolicyConditions {
    /// Returns true when no condition is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.string_equals.is_empty() && self.arn_equals.is_empty()
    }
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyStatement {
    /// Statement identifier.
    #[serde(rename = "Sid")]
    pub sid: String,
    /// Effect.
    #[serde(rename = "Effect")]
    pub effect: PolicyEffect,
    /// Principal allowed to act.
    #[serde(rename = "Principal")]
    pub principal: PolicyPrincipal,
    /// Action name.
    #[serde(rename = "Action")]
    pub action: String,
    /// Resource ARN.
    #[serde(rename = "Resource")]
    pub resource: String,
    /// Conditions.
    #[serde(rename = "Condition", default, skip_serializing_if = "PolicyConditions::is_empty")]
    pub condition: PolicyConditions,
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl PolicyDocument {
    /// Renders grants as a policy document.
    #[must_use]
    pub fn from_grants(grants: &[TrustGrant]) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements: grants.iter().map(statement_from_grant).collect(),
        }
    }

    /// Serializes the document as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyDocumentError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, PolicyDocumentError> {
        serde_json::to_string(self).map_err(|err| PolicyDocumentError::Json(err.to_string()))
    }

    /// Parses a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyDocumentError::Json`] for malformed or unsupported
    /// content (unknown fields, operators, or keys).
    pub fn from_json(json: &str) -> Result<Self, PolicyDocumentError> {
        serde_json::from_str(json).map_err(|err| PolicyDocumentError::Json(err.to_string()))
    }

    /// Converts the document back into an evaluable trust model.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyDocumentError`] for unsupported versions, deny
    /// statements, or empty value lists.
    pub fn into_trust_model(self) -> Result<TrustModel, PolicyDocumentError> {
        if self.version != POLICY_VERSION {
            return Err(PolicyDocumentError::UnsupportedVersion(self.version));
        }
        let grants = self
            .statements
            .into_iter()
            .map(grant_from_statement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrustModel::new(grants))
    }
}

/// Renders one grant as a statement.
fn statement_from_grant(grant: &TrustGrant) -> PolicyStatement {
    let mut condition = PolicyConditions::default();
    let mut merged: BTreeMap<(ConditionOperator, ConditionKey), Vec<String>> = BTreeMap::new();
    for entry in &grant.conditions {
        merged.entry((entry.operator, entry.key)).or_default().extend(entry.values.iter().cloned());
    }
    for ((operator, key), values) in merged {
        let block = match operator {
            ConditionOperator::StringEquals => &mut condition.string_equals,
            ConditionOperator::ArnEquals => &mut condition.arn_equals,
        };
        block.insert(key, ConditionValue::from_values(values));
    }
    PolicyStatement {
        sid: grant.sid.clone(),
        effect: PolicyEffect::Allow,
        principal: PolicyPrincipal {
            service: grant.principal.clone(),
        },
        action: grant.action.clone(),
        resource: grant.resource.as_str().to_string(),
        condition,
    }
}

/// Converts one statement into a grant.
fn grant_from_statement(statement: PolicyStatement) -> Result<TrustGrant, PolicyDocumentError> {
    if statement.effect == PolicyEffect::Deny {
        return Err(PolicyDocumentError::DenyStatement(statement.sid));
    }
    let blocks = [
        (ConditionOperator::StringEquals, statement.condition.string_equals),
        (ConditionOperator::ArnEquals, statement.condition.arn_equals),
    ];
    let mut conditions = Vec::new();
    for (operator, block) in blocks {
        for (key, value) in block {
            let values = value.into_values();
            if values.is_empty() {
                return Err(PolicyDocumentError::EmptyConditionValues {
                    sid: statement.sid,
                    key,
                });
            }
            conditions.push(Condition {
                operator,
                key,
                values,
            });
        }
    }
    Ok(TrustGrant {
        sid: statement.sid,
        principal: statement.principal.service,
        action: statement.action,
        resource: ResourceArn::new(statement.resource),
        conditions,
    })
}
