// crates/voicebot-core/src/runtime/audit.rs
// ============================================================================
// Module: Routing Audit Logging
// Description: Structured JSON-line events for topology and call routing.
// Purpose: Emit leveled, machine-readable logs without a logging framework.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every topology build and every routing decision is described by an
//! [`AuditEvent`]. Sinks serialize events as JSON lines and drop events
//! below their configured [`LogLevel`], so deployments can route them to
//! whatever pipeline they already run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ApplicationId;
use crate::core::AuthorizationDecision;
use crate::core::CallId;
use crate::core::ResourceArn;
use crate::core::TriggerType;

// ============================================================================
// SECTION: Levels
// ============================================================================

/// Event severity, ordered from most to least severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    /// Failures.
    Error,
    /// Degraded outcomes (denials, no route, failover).
    Warn,
    /// Normal decisions.
    #[default]
    Info,
    /// Verbose detail.
    Debug,
}

impl LogLevel {
    /// Returns true when an event at `level` passes this threshold.
    #[must_use]
    pub fn admits(self, level: Self) -> bool {
        level <= self
    }

    /// Returns the canonical uppercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown log level label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct LogLevelError(String);

impl FromStr for LogLevel {
    type Err = LogLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Self::Error),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(LogLevelError(value.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LogLevelError;

    fn try_from(value: String) -> Result<Self, LogLevelError> {
        value.parse()
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Result of a single handler attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Handler took the call.
    Accepted,
    /// Handler refused the call.
    Rejected,
    /// Handler unreachable or timed out.
    Unavailable,
}

/// Audit event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A topology snapshot was built.
    TopologyBuilt {
        /// Topology fingerprint.
        fingerprint: String,
        /// Number of ingresses.
        ingresses: usize,
        /// Number of trigger rules.
        rules: usize,
        /// Number of trust grants.
        grants: usize,
    },
    /// A call was matched (or not) against the rule set.
    RouteResolution {
        /// Call-leg identifier.
        call_id: CallId,
        /// Trigger type used.
        trigger_type: TriggerType,
        /// Observed value.
        observed: String,
        /// Matching rule name, if any.
        rule: Option<String>,
        /// Candidate applications in priority order.
        targets: Vec<ApplicationId>,
    },
    /// A target application was authorized (or denied) to reach the bot.
    AuthorizationDecision {
        /// Call-leg identifier.
        call_id: CallId,
        /// Application evaluated.
        application: ApplicationId,
        /// Source ARN presented.
        source_arn: ResourceArn,
        /// Decision.
        decision: AuthorizationDecision,
    },
    /// A handler was invoked.
    HandlerAttempt {
        /// Call-leg identifier.
        call_id: CallId,
        /// Application invoked.
        application: ApplicationId,
        /// Target priority.
        priority: u32,
        /// Attempt outcome.
        outcome: AttemptOutcome,
        /// Failure or rejection detail.
        detail: Option<String>,
    },
}

impl AuditEvent {
    /// Severity of the event.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        match self {
            Self::TopologyBuilt {
                ..
            } => LogLevel::Info,
            Self::RouteResolution {
                rule, ..
            } => {
                if rule.is_some() {
                    LogLevel::Info
                } else {
                    LogLevel::Warn
                }
            }
            Self::AuthorizationDecision {
                decision, ..
            } => {
                if decision.is_allowed() {
                    LogLevel::Debug
                } else {
                    LogLevel::Warn
                }
            }
            Self::HandlerAttempt {
                outcome, ..
            } => match outcome {
                AttemptOutcome::Accepted => LogLevel::Info,
                AttemptOutcome::Rejected | AttemptOutcome::Unavailable => LogLevel::Warn,
            },
        }
    }
}

/// Serialized line: level and timestamp wrapped around the event.
#[derive(Serialize)]
struct AuditLine<'a> {
    /// Event severity.
    level: LogLevel,
    /// Milliseconds since the Unix epoch.
    timestamp_ms: u128,
    /// Event body.
    #[serde(flatten)]
    event: &'a AuditEvent,
}

/// Renders an event as a JSON line body (no trailing newline).
fn render(event: &AuditEvent) -> Option<String> {
    let timestamp_ms =
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    serde_json::to_string(&AuditLine {
        level: event.level(),
        timestamp_ms,
        event,
    })
    .ok()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for routing events.
pub trait RoutingAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink {
    /// Minimum level written.
    threshold: LogLevel,
}

impl StderrAuditSink {
    /// Creates a stderr sink with a level threshold.
    #[must_use]
    pub const fn new(threshold: LogLevel) -> Self {
        Self {
            threshold,
        }
    }
}

impl RoutingAuditSink for StderrAuditSink {
    fn record(&self, event: &AuditEvent) {
        if self.threshold.admits(event.level())
            && let Some(payload) = render(event)
        {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
    /// Minimum level written.
    threshold: LogLevel,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path, threshold: LogLevel) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            threshold,
        })
    }
}

impl RoutingAuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) {
        if self.threshold.admits(event.level())
            && let Some(payload) = render(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl RoutingAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}
