// crates/voicebot-core/src/interfaces/mod.rs
// ============================================================================
// Module: Voicebot Interfaces
// Description: Seams to the external handler runtime.
// Purpose: Keep handler invocation behind a trait so routing stays pure.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The router never talks to a function runtime directly. It hands a
//! [`HandlerInvocation`] to a [`HandlerInvoker`], which is responsible for
//! delivery and for enforcing the handler's timeout. Replies are opaque
//! beyond accept/reject.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::ApplicationId;
use crate::core::CallId;
use crate::core::HandlerName;
use crate::core::ResourceArn;

// ============================================================================
// SECTION: Handler Invocation
// ============================================================================

/// Event payload delivered to a handler for one call leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInvocation {
    /// Call-leg identifier.
    pub call_id: CallId,
    /// Calling party number.
    pub caller: String,
    /// Dialed number.
    pub dialed: String,
    /// Request URI host for trunk calls.
    pub request_host: Option<String>,
    /// Application forwarding the event.
    pub application: ApplicationId,
    /// Handler receiving the event.
    pub handler: HandlerName,
    /// Handler function ARN.
    pub handler_arn: ResourceArn,
    /// Bot alias the handler is authorized to converse with.
    pub bot_alias_arn: ResourceArn,
    /// Bot locale.
    pub locale: String,
    /// Greeting the bot plays on pickup; empty for none.
    pub welcome_message: String,
    /// Deadline the invoker must enforce.
    #[serde(rename = "timeout_secs", serialize_with = "crate::core::endpoint::serialize_secs")]
    pub timeout: Duration,
}

/// Handler answer to an invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum HandlerReply {
    /// Handler takes the call; actions are opaque media-control instructions.
    Accept {
        /// Media-control actions.
        actions: Vec<Value>,
    },
    /// Handler refuses the call.
    Reject {
        /// Refusal reason.
        reason: String,
    },
}

impl HandlerReply {
    /// Standard new-call answer: enable voice focus, then hand the caller to
    /// the bot with the caller's number as a session attribute.
    #[must_use]
    pub fn start_bot_conversation(invocation: &HandlerInvocation) -> Self {
        let call_id = invocation.call_id.as_str();
        let mut configuration = json!({
            "SessionState": {
                "SessionAttributes": { "phoneNumber": invocation.caller },
                "DialogAction": { "Type": "ElicitIntent" },
            },
        });
        if !invocation.welcome_message.is_empty() {
            configuration["WelcomeMessages"] = json!([{
                "Content": invocation.welcome_message,
                "ContentType": "PlainText",
            }]);
        }
        Self::Accept {
            actions: vec![
                json!({
                    "Type": "VoiceFocus",
                    "Parameters": { "Enable": true, "CallId": call_id },
                }),
                json!({
                    "Type": "StartBotConversation",
                    "Parameters": {
                        "CallId": call_id,
                        "BotAliasArn": invocation.bot_alias_arn.as_str(),
                        "LocaleId": invocation.locale,
                        "Configuration": configuration,
                    },
                }),
            ],
        }
    }
}

/// Transient invocation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum InvocationError {
    /// Handler could not be reached.
    #[error("handler unavailable: {message}")]
    Unavailable {
        /// Failure detail.
        message: String,
    },
    /// Handler did not answer within its timeout.
    #[error("handler timed out after {secs}s")]
    TimedOut {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },
}

/// Delivers invocations to handlers.
pub trait HandlerInvoker {
    /// Invokes the handler and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when the handler is unreachable or does not
    /// answer in time.
    fn invoke(&self, invocation: &HandlerInvocation) -> Result<HandlerReply, InvocationError>;
}
