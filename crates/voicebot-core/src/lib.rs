// crates/voicebot-core/src/lib.rs
// ============================================================================
// Module: Voicebot Core Library
// Description: Public API surface for SIP/PSTN-to-bot routing and trust.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Voicebot core decides which media application receives an inbound call
//! and whether that application may start a conversation with the bot. It
//! builds an immutable routing and trust topology from provisioning inputs,
//! resolves calls against trigger rules, and evaluates trust grants
//! fail-closed. Handler delivery happens behind [`HandlerInvoker`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::HandlerInvocation;
pub use interfaces::HandlerInvoker;
pub use interfaces::HandlerReply;
pub use interfaces::InvocationError;
pub use runtime::AttemptOutcome;
pub use runtime::AuditEvent;
pub use runtime::CallRouter;
pub use runtime::FailedAttempt;
pub use runtime::FileAuditSink;
pub use runtime::InboundCall;
pub use runtime::LogLevel;
pub use runtime::LogLevelError;
pub use runtime::NoopAuditSink;
pub use runtime::Resolution;
pub use runtime::ResolvedTarget;
pub use runtime::RouteError;
pub use runtime::RouteOutcome;
pub use runtime::RoutingAuditSink;
pub use runtime::StderrAuditSink;
pub use runtime::Topology;
pub use runtime::TopologyBuilder;
pub use runtime::TopologyError;
pub use runtime::TopologyOutputs;
