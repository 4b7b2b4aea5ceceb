// crates/voicebot-core/src/core/trigger.rs
// ============================================================================
// Module: Trigger Rules
// Description: Match rules mapping observed call attributes to media apps.
// Purpose: Exact-match routing with deterministic priority ordering.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`TriggerRule`] maps one `(trigger type, trigger value)` pair to an
//! ordered list of target applications. Targets are sorted ascending by
//! priority when the rule is built; equal priorities keep insertion order.
//! A [`TriggerRuleSet`] indexes rules by their key and refuses duplicates,
//! so resolution never has to break ties between rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::Region;
use crate::core::identifiers::RuleName;

// ============================================================================
// SECTION: Trigger Types
// ============================================================================

/// Call attribute a rule matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriggerType {
    /// Dialed phone number (E.164).
    ToPhoneNumber,
    /// Host component of the inbound SIP request URI.
    RequestUriHostname,
}

impl TriggerType {
    /// Returns a stable label for the trigger type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToPhoneNumber => "ToPhoneNumber",
            Self::RequestUriHostname => "RequestUriHostname",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rule construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Rule has no targets.
    #[error("trigger rule {0} has no target applications")]
    EmptyTargets(String),
    /// Rule has a priority below 1.
    #[error("trigger rule {0} has a target with priority 0 (priorities start at 1)")]
    InvalidPriority(String),
    /// Rule has an empty trigger value.
    #[error("trigger rule {0} has an empty trigger value")]
    EmptyTriggerValue(String),
    /// Two rules share the same type and value.
    #[error("trigger rules {first} and {second} both match {trigger_type} {trigger_value}")]
    Ambiguous {
        /// First rule name.
        first: String,
        /// Second rule name.
        second: String,
        /// Shared trigger type.
        trigger_type: TriggerType,
        /// Shared trigger value.
        trigger_value: String,
    },
}

// ============================================================================
// SECTION: Trigger Rule
// ============================================================================

/// Prioritized target of a trigger rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTarget {
    /// Region the target application lives in.
    pub region: Region,
    /// Priority; 1 is primary.
    pub priority: u32,
    /// Target application.
    pub application: ApplicationId,
}

impl RuleTarget {
    /// Creates a rule target.
    #[must_use]
    pub const fn new(region: Region, priority: u32, application: ApplicationId) -> Self {
        Self {
            region,
            priority,
            application,
        }
    }
}

/// Match rule routing one observed value to prioritized applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRule {
    /// Rule name for diagnostics.
    name: RuleName,
    /// Attribute the rule matches.
    trigger_type: TriggerType,
    /// Exact value the attribute must equal.
    trigger_value: String,
    /// Targets in ascending priority order.
    targets: Vec<RuleTarget>,
}

impl TriggerRule {
    /// Builds a rule, sorting targets by priority (stable on ties).
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the value is empty, there are no targets,
    /// or a target uses priority 0.
    pub fn new(
        name: RuleName,
        trigger_type: TriggerType,
        trigger_value: impl Into<String>,
        mut targets: Vec<RuleTarget>,
    ) -> Result<Self, RuleError> {
        let trigger_value = trigger_value.into();
        if trigger_value.is_empty() {
            return Err(RuleError::EmptyTriggerValue(name.to_string()));
        }
        if targets.is_empty() {
            return Err(RuleError::EmptyTargets(name.to_string()));
        }
        if targets.iter().any(|target| target.priority == 0) {
            return Err(RuleError::InvalidPriority(name.to_string()));
        }
        targets.sort_by_key(|target| target.priority);
        Ok(Self {
            name,
            trigger_type,
            trigger_value,
            targets,
        })
    }

    /// Returns the rule name.
    #[must_use]
    pub const fn name(&self) -> &RuleName {
        &self.name
    }

    /// Returns the trigger type.
    #[must_use]
    pub const fn trigger_type(&self) -> TriggerType {
        self.trigger_type
    }

    /// Returns the trigger value.
    #[must_use]
    pub fn trigger_value(&self) -> &str {
        &self.trigger_value
    }

    /// Returns targets in ascending priority order.
    #[must_use]
    pub fn targets(&self) -> &[RuleTarget] {
        &self.targets
    }
}

// ============================================================================
// SECTION: Rule Set
// ============================================================================

/// Immutable, duplicate-free collection of trigger rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRuleSet {
    /// Rules in declaration order.
    rules: Vec<TriggerRule>,
    /// Index from `(type, value)` to position in `rules`.
    #[serde(skip)]
    index: BTreeMap<(TriggerType, String), usize>,
}

impl TriggerRuleSet {
    /// Builds a rule set, rejecting duplicate `(type, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Ambiguous`] when two rules share a key.
    pub fn new(rules: Vec<TriggerRule>) -> Result<Self, RuleError> {
        let mut index = BTreeMap::new();
        for (position, rule) in rules.iter().enumerate() {
            let key = (rule.trigger_type, rule.trigger_value.clone());
            if let Some(existing) = index.insert(key, position) {
                return Err(RuleError::Ambiguous {
                    first: rules[existing].name.to_string(),
                    second: rule.name.to_string(),
                    trigger_type: rule.trigger_type,
                    trigger_value: rule.trigger_value.clone(),
                });
            }
        }
        Ok(Self {
            rules,
            index,
        })
    }

    /// Returns the rule matching the observed value exactly, if any.
    #[must_use]
    pub fn find(&self, trigger_type: TriggerType, observed: &str) -> Option<&TriggerRule> {
        self.index
            .get(&(trigger_type, observed.to_string()))
            .and_then(|position| self.rules.get(*position))
    }

    /// Returns true when a rule exists for the key.
    #[must_use]
    pub fn covers(&self, trigger_type: TriggerType, value: &str) -> bool {
        self.find(trigger_type, value).is_some()
    }

    /// Returns all rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[TriggerRule] {
        &self.rules
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
