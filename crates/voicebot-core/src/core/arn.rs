// crates/voicebot-core/src/core/arn.rs
// ============================================================================
// Module: ARN Templating
// Description: Renders resource names for bots, handlers, and media apps.
// Purpose: Substitute account/region once; downstream code compares strings.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`ArnScope`] binds a partition, region, and account. Every resource
//! name the topology needs is rendered from a scope exactly once, at build
//! time. Rendered names are [`ResourceArn`] values that the trust evaluator
//! treats as opaque strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::BotAliasId;
use crate::core::identifiers::BotId;
use crate::core::identifiers::HandlerName;
use crate::core::identifiers::Partition;
use crate::core::identifiers::Region;

// ============================================================================
// SECTION: Resource ARN
// ============================================================================

/// Fully rendered resource name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceArn(String);

impl ResourceArn {
    /// Wraps an already-rendered resource name.
    #[must_use]
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Returns the ARN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ResourceArn {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Partition, region, and account used to render resource names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArnScope {
    /// ARN partition.
    pub partition: Partition,
    /// Deploying region.
    pub region: Region,
    /// Deploying account.
    pub account: AccountId,
}

impl ArnScope {
    /// Creates a scope from validated identifiers.
    #[must_use]
    pub const fn new(partition: Partition, region: Region, account: AccountId) -> Self {
        Self {
            partition,
            region,
            account,
        }
    }

    /// Returns a copy of this scope with a different region.
    #[must_use]
    pub fn in_region(&self, region: Region) -> Self {
        Self {
            partition: self.partition.clone(),
            region,
            account: self.account.clone(),
        }
    }

    /// Bot alias ARN: `arn:{p}:lex:{region}:{account}:bot-alias/{bot}/{alias}`.
    #[must_use]
    pub fn bot_alias(&self, bot_id: &BotId, alias_id: &BotAliasId) -> ResourceArn {
        self.render("lex", &format!("bot-alias/{bot_id}/{alias_id}"))
    }

    /// Voice Connector namespace pattern: `arn:{p}:voiceconnector:{region}:{account}:*`.
    #[must_use]
    pub fn voice_connector_namespace(&self) -> String {
        self.render("voiceconnector", "*").0
    }

    /// SIP media application ARN: `arn:{p}:voiceconnector:{region}:{account}:sma/{id}`.
    #[must_use]
    pub fn sip_media_application(&self, id: &ApplicationId) -> ResourceArn {
        self.render("voiceconnector", &format!("sma/{id}"))
    }

    /// Handler function ARN: `arn:{p}:lambda:{region}:{account}:function:{name}`.
    #[must_use]
    pub fn function(&self, name: &HandlerName) -> ResourceArn {
        self.render("lambda", &format!("function:{name}"))
    }

    /// Renders `arn:{partition}:{service}:{region}:{account}:{resource}`.
    fn render(&self, service: &str, resource: &str) -> ResourceArn {
        ResourceArn(format!(
            "arn:{}:{service}:{}:{}:{resource}",
            self.partition, self.region, self.account
        ))
    }
}
