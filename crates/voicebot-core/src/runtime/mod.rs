// crates/voicebot-core/src/runtime/mod.rs
// ============================================================================
// Module: Voicebot Runtime
// Description: Topology construction, call routing, and audit sinks.
// Purpose: Turn provisioning inputs into a snapshot and route calls on it.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime builds an immutable [`Topology`] once and routes any number
//! of calls against it. Routing holds no mutable state, so a single
//! topology may be shared by concurrent routers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod router;
pub mod topology;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AttemptOutcome;
pub use audit::AuditEvent;
pub use audit::FileAuditSink;
pub use audit::LogLevel;
pub use audit::LogLevelError;
pub use audit::NoopAuditSink;
pub use audit::RoutingAuditSink;
pub use audit::StderrAuditSink;
pub use router::CallRouter;
pub use router::FailedAttempt;
pub use router::InboundCall;
pub use router::RouteError;
pub use router::RouteOutcome;
pub use topology::Resolution;
pub use topology::ResolvedTarget;
pub use topology::Topology;
pub use topology::TopologyBuilder;
pub use topology::TopologyError;
pub use topology::TopologyOutputs;
