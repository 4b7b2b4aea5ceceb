// crates/voicebot-core/src/runtime/router.rs
// ============================================================================
// Module: Call Router
// Description: Routes inbound calls through rules, trust, and handlers.
// Purpose: Drive one call leg from trigger match to handler reply.
// Dependencies: crate::{core, interfaces, runtime}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The router picks the trigger type from the call's ingress (trunk calls
//! carry a request URI host, number calls do not), resolves the ordered
//! targets, and walks them in priority order. Each target is authorized
//! against the trust model before its handler is invoked.
//!
//! Failover rules:
//! - A handler that is unreachable or times out advances to the next target.
//! - A handler reject is terminal.
//! - An authorization deny is terminal; the call never reaches the bot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::ApplicationId;
use crate::core::AuthorizationDecision;
use crate::core::CallId;
use crate::core::DenyReason;
use crate::core::TriggerType;
use crate::interfaces::HandlerInvocation;
use crate::interfaces::HandlerInvoker;
use crate::interfaces::HandlerReply;
use crate::interfaces::InvocationError;
use crate::runtime::audit::AttemptOutcome;
use crate::runtime::audit::AuditEvent;
use crate::runtime::audit::RoutingAuditSink;
use crate::runtime::topology::Resolution;
use crate::runtime::topology::ResolvedTarget;
use crate::runtime::topology::Topology;

// ============================================================================
// SECTION: Calls
// ============================================================================

/// Inbound call leg as observed at ingress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundCall {
    /// Call-leg identifier.
    pub call_id: CallId,
    /// Calling party number.
    pub caller: String,
    /// Dialed number.
    pub dialed: String,
    /// Request URI host, present for trunk calls.
    pub request_host: Option<String>,
}

impl InboundCall {
    /// Creates a call that arrived on a provisioned number.
    #[must_use]
    pub fn to_number(
        call_id: CallId,
        caller: impl Into<String>,
        dialed: impl Into<String>,
    ) -> Self {
        Self {
            call_id,
            caller: caller.into(),
            dialed: dialed.into(),
            request_host: None,
        }
    }

    /// Creates a call that arrived over a SIP trunk.
    #[must_use]
    pub fn via_trunk(
        call_id: CallId,
        caller: impl Into<String>,
        dialed: impl Into<String>,
        request_host: impl Into<String>,
    ) -> Self {
        Self {
            call_id,
            caller: caller.into(),
            dialed: dialed.into(),
            request_host: Some(request_host.into()),
        }
    }

    /// Trigger type and observed value used to resolve this call.
    #[must_use]
    pub fn trigger(&self) -> (TriggerType, &str) {
        match &self.request_host {
            Some(host) => (TriggerType::RequestUriHostname, host.as_str()),
            None => (TriggerType::ToPhoneNumber, self.dialed.as_str()),
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Terminal handler answer for a routed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// A handler accepted the call.
    Accepted {
        /// Application that took the call.
        application: ApplicationId,
        /// Priority of that application's target.
        priority: u32,
        /// Media-control actions returned by the handler.
        actions: Vec<Value>,
        /// Earlier targets that were unavailable.
        failed: Vec<FailedAttempt>,
    },
    /// A handler rejected the call.
    Rejected {
        /// Application that rejected the call.
        application: ApplicationId,
        /// Handler-provided reason.
        reason: String,
    },
}

/// Target skipped because its handler was unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
    /// Application attempted.
    pub application: ApplicationId,
    /// Target priority.
    pub priority: u32,
    /// Invocation failure.
    pub error: InvocationError,
}

/// Calls that could not be delivered to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No rule matched the observed value.
    #[error("no {trigger_type} rule matches {observed}")]
    NoMatch {
        /// Trigger type evaluated.
        trigger_type: TriggerType,
        /// Observed value.
        observed: String,
    },
    /// The trust model denied the target application.
    #[error("application {application} denied bot access: {reason}")]
    AuthorizationDenied {
        /// Application denied.
        application: ApplicationId,
        /// Deny reason.
        reason: DenyReason,
    },
    /// Every target's handler was unavailable.
    #[error("all {} handler targets unavailable", .attempts.len())]
    HandlerUnavailable {
        /// Failed attempts in priority order.
        attempts: Vec<FailedAttempt>,
    },
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Routes calls against an immutable topology.
pub struct CallRouter<'a> {
    /// Topology snapshot.
    topology: &'a Topology,
    /// Handler delivery.
    invoker: &'a dyn HandlerInvoker,
    /// Audit sink.
    audit: &'a dyn RoutingAuditSink,
}

impl<'a> CallRouter<'a> {
    /// Creates a router.
    #[must_use]
    pub const fn new(
        topology: &'a Topology,
        invoker: &'a dyn HandlerInvoker,
        audit: &'a dyn RoutingAuditSink,
    ) -> Self {
        Self {
            topology,
            invoker,
            audit,
        }
    }

    /// Routes one call leg.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when no rule matches, a target is denied bot
    /// access, or every handler is unavailable.
    pub fn route(&self, call: &InboundCall) -> Result<RouteOutcome, RouteError> {
        let (trigger_type, observed) = call.trigger();
        let resolution = self.topology.resolve(trigger_type, observed);
        let Resolution::Matched {
            rule,
            targets,
        } = resolution
        else {
            self.audit.record(&AuditEvent::RouteResolution {
                call_id: call.call_id.clone(),
                trigger_type,
                observed: observed.to_string(),
                rule: None,
                targets: Vec::new(),
            });
            return Err(RouteError::NoMatch {
                trigger_type,
                observed: observed.to_string(),
            });
        };
        self.audit.record(&AuditEvent::RouteResolution {
            call_id: call.call_id.clone(),
            trigger_type,
            observed: observed.to_string(),
            rule: Some(rule.name().to_string()),
            targets: targets.iter().map(|target| target.application.id.clone()).collect(),
        });

        let mut failed = Vec::new();
        for target in &targets {
            self.authorize(call, target)?;
            let invocation = self.invocation(call, target);
            match self.invoker.invoke(&invocation) {
                Ok(HandlerReply::Accept {
                    actions,
                }) => {
                    self.record_attempt(call, target, AttemptOutcome::Accepted, None);
                    return Ok(RouteOutcome::Accepted {
                        application: target.application.id.clone(),
                        priority: target.priority,
                        actions,
                        failed,
                    });
                }
                Ok(HandlerReply::Reject {
                    reason,
                }) => {
                    self.record_attempt(
                        call,
                        target,
                        AttemptOutcome::Rejected,
                        Some(reason.clone()),
                    );
                    return Ok(RouteOutcome::Rejected {
                        application: target.application.id.clone(),
                        reason,
                    });
                }
                Err(error) => {
                    self.record_attempt(
                        call,
                        target,
                        AttemptOutcome::Unavailable,
                        Some(error.to_string()),
                    );
                    failed.push(FailedAttempt {
                        application: target.application.id.clone(),
                        priority: target.priority,
                        error,
                    });
                }
            }
        }
        Err(RouteError::HandlerUnavailable {
            attempts: failed,
        })
    }

    /// Checks that the target application may start a bot conversation.
    fn authorize(&self, call: &InboundCall, target: &ResolvedTarget<'_>) -> Result<(), RouteError> {
        let decision = self.topology.authorize_application(target.application);
        self.audit.record(&AuditEvent::AuthorizationDecision {
            call_id: call.call_id.clone(),
            application: target.application.id.clone(),
            source_arn: target.application.arn(self.topology.scope()),
            decision: decision.clone(),
        });
        match decision {
            AuthorizationDecision::Allow {
                ..
            } => Ok(()),
            AuthorizationDecision::Deny {
                reason,
            } => Err(RouteError::AuthorizationDenied {
                application: target.application.id.clone(),
                reason,
            }),
        }
    }

    /// Builds the handler event for a target.
    fn invocation(&self, call: &InboundCall, target: &ResolvedTarget<'_>) -> HandlerInvocation {
        let scope = self.topology.scope().in_region(target.application.region.clone());
        HandlerInvocation {
            call_id: call.call_id.clone(),
            caller: call.caller.clone(),
            dialed: call.dialed.clone(),
            request_host: call.request_host.clone(),
            application: target.application.id.clone(),
            handler: target.handler.name.clone(),
            handler_arn: scope.function(&target.handler.name),
            bot_alias_arn: self.topology.outputs().bot_alias_arn.clone(),
            locale: target.handler.config.locale.clone(),
            welcome_message: target.handler.config.welcome_message.clone(),
            timeout: target.handler.config.timeout,
        }
    }

    /// Records a handler attempt.
    fn record_attempt(
        &self,
        call: &InboundCall,
        target: &ResolvedTarget<'_>,
        outcome: AttemptOutcome,
        detail: Option<String>,
    ) {
        self.audit.record(&AuditEvent::HandlerAttempt {
            call_id: call.call_id.clone(),
            application: target.application.id.clone(),
            priority: target.priority,
            outcome,
            detail,
        });
    }
}
