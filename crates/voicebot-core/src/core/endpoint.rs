// crates/voicebot-core/src/core/endpoint.rs
// ============================================================================
// Module: Endpoint Model
// Description: Bot endpoints, handler configuration, and SIP media applications.
// Purpose: Immutable endpoint records wired together by the topology builder.
// Dependencies: crate::core::{arn, identifiers}, serde
// ============================================================================

//! ## Overview
//! A [`BotEndpointRef`] names one published bot version. Each
//! [`HandlerDefinition`] owns a [`HandlerConfig`] pointing at that bot, and
//! each [`MediaApplication`] forwards events to exactly one handler by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::core::arn::ArnScope;
use crate::core::arn::ResourceArn;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::BotAliasId;
use crate::core::identifiers::BotId;
use crate::core::identifiers::HandlerName;
use crate::core::identifiers::Region;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bot locale passed to the conversation.
pub const DEFAULT_LOCALE: &str = "en_US";
/// Default handler language tag.
pub const DEFAULT_LANGUAGE: &str = "EN";
/// Greeting the bot speaks when it picks up a call.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to the Order Flowers SIP Integration Demo using Amazon \
                                           Chime SDK. To get started, you can say, Order Flowers.";
/// Default handler invocation timeout.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(60);
/// Handler environment key carrying the language tag.
pub const ENV_LANGUAGE: &str = "lang";
/// Handler environment key carrying the bot id.
pub const ENV_BOT_ID: &str = "LEX_BOT_ID";
/// Handler environment key carrying the bot alias id.
pub const ENV_BOT_ALIAS_ID: &str = "LEX_BOT_ALIAS_ID";

// ============================================================================
// SECTION: Bot Endpoint
// ============================================================================

/// Reference to one immutable published bot version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotEndpointRef {
    /// Bot identifier.
    pub bot_id: BotId,
    /// Alias identifier of the published version.
    pub alias_id: BotAliasId,
}

impl BotEndpointRef {
    /// Creates a bot reference.
    #[must_use]
    pub const fn new(bot_id: BotId, alias_id: BotAliasId) -> Self {
        Self {
            bot_id,
            alias_id,
        }
    }

    /// Renders the bot alias ARN within a scope.
    #[must_use]
    pub fn alias_arn(&self, scope: &ArnScope) -> ResourceArn {
        scope.bot_alias(&self.bot_id, &self.alias_id)
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Routing parameters owned by a single handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerConfig {
    /// Bot the handler starts conversations with.
    pub bot: BotEndpointRef,
    /// Bot locale, e.g. `en_US`.
    pub locale: String,
    /// Language tag exposed to the handler.
    pub language: String,
    /// Plain-text greeting played on pickup; empty disables it.
    pub welcome_message: String,
    /// Maximum time the handler may take to answer an event.
    #[serde(rename = "timeout_secs", serialize_with = "serialize_secs")]
    pub timeout: Duration,
}

impl HandlerConfig {
    /// Creates a config with the default locale, language, greeting, and timeout.
    #[must_use]
    pub fn new(bot: BotEndpointRef) -> Self {
        Self {
            bot,
            locale: DEFAULT_LOCALE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }

    /// Overrides the bot locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Overrides the language tag.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Overrides the greeting.
    #[must_use]
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// Overrides the invocation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Environment variables handed to the handler function.
    #[must_use]
    pub fn environment(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (ENV_LANGUAGE, self.language.clone()),
            (ENV_BOT_ID, self.bot.bot_id.to_string()),
            (ENV_BOT_ALIAS_ID, self.bot.alias_id.to_string()),
        ])
    }
}

/// Named handler function with its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerDefinition {
    /// Function name.
    pub name: HandlerName,
    /// Routing parameters.
    pub config: HandlerConfig,
}

impl HandlerDefinition {
    /// Creates a handler definition.
    #[must_use]
    pub const fn new(name: HandlerName, config: HandlerConfig) -> Self {
        Self {
            name,
            config,
        }
    }
}

// ============================================================================
// SECTION: SIP Media Application
// ============================================================================

/// Regional SIP media application backed by one handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaApplication {
    /// Application identifier.
    pub id: ApplicationId,
    /// Display name.
    pub name: String,
    /// Region hosting the application.
    pub region: Region,
    /// Name of the handler receiving call-control events.
    pub handler: HandlerName,
}

impl MediaApplication {
    /// Creates a media application record.
    #[must_use]
    pub fn new(
        id: ApplicationId,
        name: impl Into<String>,
        region: Region,
        handler: HandlerName,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            region,
            handler,
        }
    }

    /// Renders the application ARN, using the application's own region.
    #[must_use]
    pub fn arn(&self, scope: &ArnScope) -> ResourceArn {
        scope.in_region(self.region.clone()).sip_media_application(&self.id)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a duration as whole seconds.
pub(crate) fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}
