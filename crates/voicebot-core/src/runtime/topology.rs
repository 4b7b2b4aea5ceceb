// crates/voicebot-core/src/runtime/topology.rs
// ============================================================================
// Module: Topology Builder
// Description: Pure construction of the routing and trust topology.
// Purpose: Validate provisioning inputs and produce an immutable snapshot.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`TopologyBuilder`] gathers ingresses, the bot reference, handlers, and
//! media applications, then [`TopologyBuilder::build`] validates them and
//! returns a [`Topology`]. Building has no side effects: the same builder
//! yields an identical topology (and fingerprint) every time. Any invariant
//! violation aborts the build; there is no partial topology.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::ApplicationId;
use crate::core::ArnScope;
use crate::core::AuthorizationDecision;
use crate::core::BotEndpointRef;
use crate::core::E164Number;
use crate::core::Fingerprint;
use crate::core::HandlerDefinition;
use crate::core::HashError;
use crate::core::Ingress;
use crate::core::InvocationContext;
use crate::core::MediaApplication;
use crate::core::PolicyDocument;
use crate::core::Region;
use crate::core::ResourceArn;
use crate::core::RuleError;
use crate::core::RuleName;
use crate::core::RuleTarget;
use crate::core::TriggerRule;
use crate::core::TriggerRuleSet;
use crate::core::TriggerType;
use crate::core::TrustGrant;
use crate::core::TrustModel;
use crate::core::VoiceConnectorId;
use crate::core::hashing::fingerprint;
use crate::core::trust::START_CONVERSATION_ACTION;
use crate::core::trust::VOICE_CONNECTOR_SERVICE_PRINCIPAL;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Build-time configuration errors. Always fatal to deployment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// No bot reference was supplied.
    #[error("topology requires a published bot reference")]
    MissingBot,
    /// No handler was supplied.
    #[error("topology requires at least one handler")]
    MissingHandler,
    /// No media application was supplied.
    #[error("topology requires at least one sip media application")]
    MissingApplication,
    /// No ingress was supplied.
    #[error("topology requires at least one ingress")]
    MissingIngress,
    /// Two handlers share a name.
    #[error("duplicate handler name: {0}")]
    DuplicateHandler(String),
    /// Two applications share an id.
    #[error("duplicate sip media application id: {0}")]
    DuplicateApplication(String),
    /// Two ingresses produce the same trigger key.
    #[error("duplicate ingress for {trigger_type} {value}")]
    DuplicateIngress {
        /// Trigger type of the ingress.
        trigger_type: TriggerType,
        /// Trigger value of the ingress.
        value: String,
    },
    /// An application references an unknown handler.
    #[error("sip media application {application} references unknown handler {handler}")]
    UnknownHandler {
        /// Application id.
        application: String,
        /// Missing handler name.
        handler: String,
    },
    /// A handler targets a bot other than the topology's bot.
    #[error("handler {0} targets a different bot than the topology")]
    HandlerBotMismatch(String),
    /// A rule targets an unknown application.
    #[error("trigger rule {rule} targets unknown sip media application {application}")]
    UnknownApplication {
        /// Rule name.
        rule: String,
        /// Missing application id.
        application: String,
    },
    /// A rule target's region disagrees with the application's region.
    #[error("trigger rule {rule} targets {application} in the wrong region")]
    TargetRegionMismatch {
        /// Rule name.
        rule: String,
        /// Application id.
        application: String,
    },
    /// An ingress has no covering rule.
    #[error("ingress {value} has no {trigger_type} trigger rule")]
    UnmappedIngress {
        /// Trigger type the ingress needs.
        trigger_type: TriggerType,
        /// Trigger value the ingress produces.
        value: String,
    },
    /// Rule construction or rule-set invariant failed.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Values exposed to operational tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyOutputs {
    /// Provisioned phone numbers.
    pub phone_numbers: Vec<E164Number>,
    /// Voice Connector identifiers.
    pub voice_connector_ids: Vec<VoiceConnectorId>,
    /// Bot alias ARN.
    pub bot_alias_arn: ResourceArn,
    /// Resource the trust policy is attached to.
    pub trust_policy_resource_arn: ResourceArn,
}

// ============================================================================
// SECTION: Topology
// ============================================================================

/// Immutable routing and trust snapshot for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    /// Deployment scope.
    scope: ArnScope,
    /// Bot all handlers converse with.
    bot: BotEndpointRef,
    /// Call origination paths.
    ingresses: Vec<Ingress>,
    /// Handlers in declaration order.
    handlers: Vec<HandlerDefinition>,
    /// Media applications in declaration order.
    applications: Vec<MediaApplication>,
    /// Trigger rules.
    rules: TriggerRuleSet,
    /// Trust grants.
    trust: TrustModel,
    /// Produced outputs.
    outputs: TopologyOutputs,
}

/// Candidate application for a matched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget<'a> {
    /// Target priority (1 = primary).
    pub priority: u32,
    /// Application to invoke.
    pub application: &'a MediaApplication,
    /// Handler backing the application.
    pub handler: &'a HandlerDefinition,
}

/// Outcome of matching an observed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A rule matched; targets are in ascending priority.
    Matched {
        /// Matching rule.
        rule: &'a TriggerRule,
        /// Ordered candidates.
        targets: Vec<ResolvedTarget<'a>>,
    },
    /// No rule matched.
    NoMatch,
}

impl Topology {
    /// Returns the deployment scope.
    #[must_use]
    pub const fn scope(&self) -> &ArnScope {
        &self.scope
    }

    /// Returns the bot reference.
    #[must_use]
    pub const fn bot(&self) -> &BotEndpointRef {
        &self.bot
    }

    /// Returns the ingresses.
    #[must_use]
    pub fn ingresses(&self) -> &[Ingress] {
        &self.ingresses
    }

    /// Returns the handlers.
    #[must_use]
    pub fn handlers(&self) -> &[HandlerDefinition] {
        &self.handlers
    }

    /// Returns the media applications.
    #[must_use]
    pub fn applications(&self) -> &[MediaApplication] {
        &self.applications
    }

    /// Returns the trigger rule set.
    #[must_use]
    pub const fn rules(&self) -> &TriggerRuleSet {
        &self.rules
    }

    /// Returns the trust model.
    #[must_use]
    pub const fn trust(&self) -> &TrustModel {
        &self.trust
    }

    /// Returns the produced outputs.
    #[must_use]
    pub const fn outputs(&self) -> &TopologyOutputs {
        &self.outputs
    }

    /// Looks up an application by id.
    #[must_use]
    pub fn application(&self, id: &ApplicationId) -> Option<&MediaApplication> {
        self.applications.iter().find(|application| &application.id == id)
    }

    /// Returns the handler backing an application.
    #[must_use]
    pub fn handler_for(&self, application: &MediaApplication) -> Option<&HandlerDefinition> {
        self.handlers.iter().find(|handler| handler.name == application.handler)
    }

    /// Matches an observed value exactly against rules of one trigger type.
    #[must_use]
    pub fn resolve(&self, trigger_type: TriggerType, observed: &str) -> Resolution<'_> {
        let Some(rule) = self.rules.find(trigger_type, observed) else {
            return Resolution::NoMatch;
        };
        let targets = rule
            .targets()
            .iter()
            .filter_map(|target| {
                let application = self.application(&target.application)?;
                let handler = self.handler_for(application)?;
                Some(ResolvedTarget {
                    priority: target.priority,
                    application,
                    handler,
                })
            })
            .collect();
        Resolution::Matched {
            rule,
            targets,
        }
    }

    /// Invocation context presented when an application reaches the bot.
    #[must_use]
    pub fn invocation_context(&self, application: &MediaApplication) -> InvocationContext {
        InvocationContext::new(self.scope.account.clone(), application.arn(&self.scope))
    }

    /// Authorizes an application to start a conversation with the bot.
    #[must_use]
    pub fn authorize_application(&self, application: &MediaApplication) -> AuthorizationDecision {
        self.trust.authorize(
            VOICE_CONNECTOR_SERVICE_PRINCIPAL,
            START_CONVERSATION_ACTION,
            &self.outputs.bot_alias_arn,
            &self.invocation_context(application),
        )
    }

    /// Renders the trust grants as the provider policy document.
    #[must_use]
    pub fn policy_document(&self) -> PolicyDocument {
        PolicyDocument::from_grants(self.trust.grants())
    }

    /// Content fingerprint of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonical serialization fails.
    pub fn fingerprint(&self) -> Result<Fingerprint, HashError> {
        fingerprint(self)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Collects provisioning inputs for a [`Topology`].
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    /// Deployment scope.
    scope: ArnScope,
    /// Bot reference, required.
    bot: Option<BotEndpointRef>,
    /// Handlers.
    handlers: Vec<HandlerDefinition>,
    /// Media applications.
    applications: Vec<MediaApplication>,
    /// Ingresses.
    ingresses: Vec<Ingress>,
    /// Explicit rules; derived from ingresses when empty.
    rules: Vec<TriggerRule>,
}

impl TopologyBuilder {
    /// Starts a builder for a deployment scope.
    #[must_use]
    pub const fn new(scope: ArnScope) -> Self {
        Self {
            scope,
            bot: None,
            handlers: Vec::new(),
            applications: Vec::new(),
            ingresses: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Sets the bot reference.
    #[must_use]
    pub fn bot(mut self, bot: BotEndpointRef) -> Self {
        self.bot = Some(bot);
        self
    }

    /// Adds a handler.
    #[must_use]
    pub fn handler(mut self, handler: HandlerDefinition) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Adds a media application.
    #[must_use]
    pub fn application(mut self, application: MediaApplication) -> Self {
        self.applications.push(application);
        self
    }

    /// Adds an ingress.
    #[must_use]
    pub fn ingress(mut self, ingress: Ingress) -> Self {
        self.ingresses.push(ingress);
        self
    }

    /// Adds an explicit trigger rule. Once any rule is added, rules are no
    /// longer derived from ingresses.
    #[must_use]
    pub fn rule(mut self, rule: TriggerRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validates inputs and builds the topology.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`] for any violated invariant.
    pub fn build(&self) -> Result<Topology, TopologyError> {
        let bot = self.bot.clone().ok_or(TopologyError::MissingBot)?;
        self.check_handlers(&bot)?;
        self.check_applications()?;
        self.check_ingresses()?;

        let rules = if self.rules.is_empty() { self.derived_rules()? } else { self.rules.clone() };
        let rules = TriggerRuleSet::new(rules)?;
        self.check_rule_targets(&rules)?;
        self.check_coverage(&rules)?;

        let bot_alias_arn = bot.alias_arn(&self.scope);
        let regions: Vec<Region> =
            self.applications.iter().map(|application| application.region.clone()).collect();
        let trust = TrustModel::new(vec![TrustGrant::bot_access_from_regions(
            &self.scope,
            bot_alias_arn.clone(),
            &regions,
        )]);
        let outputs = TopologyOutputs {
            phone_numbers: self
                .ingresses
                .iter()
                .filter_map(|ingress| match ingress {
                    Ingress::PhoneNumber(number) => Some(number.number.clone()),
                    Ingress::Trunk(_) => None,
                })
                .collect(),
            voice_connector_ids: self
                .ingresses
                .iter()
                .filter_map(|ingress| match ingress {
                    Ingress::Trunk(trunk) => Some(trunk.connector_id.clone()),
                    Ingress::PhoneNumber(_) => None,
                })
                .collect(),
            trust_policy_resource_arn: bot_alias_arn.clone(),
            bot_alias_arn,
        };

        Ok(Topology {
            scope: self.scope.clone(),
            bot,
            ingresses: self.ingresses.clone(),
            handlers: self.handlers.clone(),
            applications: self.applications.clone(),
            rules,
            trust,
            outputs,
        })
    }

    /// Ensures handlers exist, are unique, and all target the bot.
    fn check_handlers(&self, bot: &BotEndpointRef) -> Result<(), TopologyError> {
        if self.handlers.is_empty() {
            return Err(TopologyError::MissingHandler);
        }
        for (index, handler) in self.handlers.iter().enumerate() {
            if self.handlers.iter().skip(index + 1).any(|other| other.name == handler.name) {
                return Err(TopologyError::DuplicateHandler(handler.name.to_string()));
            }
            if &handler.config.bot != bot {
                return Err(TopologyError::HandlerBotMismatch(handler.name.to_string()));
            }
        }
        Ok(())
    }

    /// Ensures applications exist, are unique, and resolve to one handler.
    fn check_applications(&self) -> Result<(), TopologyError> {
        if self.applications.is_empty() {
            return Err(TopologyError::MissingApplication);
        }
        for (index, application) in self.applications.iter().enumerate() {
            if self.applications.iter().skip(index + 1).any(|other| other.id == application.id) {
                return Err(TopologyError::DuplicateApplication(application.id.to_string()));
            }
            if !self.handlers.iter().any(|handler| handler.name == application.handler) {
                return Err(TopologyError::UnknownHandler {
                    application: application.id.to_string(),
                    handler: application.handler.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Ensures ingresses exist and produce distinct trigger keys.
    fn check_ingresses(&self) -> Result<(), TopologyError> {
        if self.ingresses.is_empty() {
            return Err(TopologyError::MissingIngress);
        }
        let keys: Vec<(TriggerType, String)> =
            self.ingresses.iter().map(Ingress::trigger_key).collect();
        for (index, key) in keys.iter().enumerate() {
            if keys.iter().skip(index + 1).any(|other| other == key) {
                return Err(TopologyError::DuplicateIngress {
                    trigger_type: key.0,
                    value: key.1.clone(),
                });
            }
        }
        Ok(())
    }

    /// One rule per ingress targeting every application in declaration order.
    fn derived_rules(&self) -> Result<Vec<TriggerRule>, TopologyError> {
        let targets: Vec<RuleTarget> = self
            .applications
            .iter()
            .zip(1_u32 ..)
            .map(|(application, priority)| {
                RuleTarget::new(application.region.clone(), priority, application.id.clone())
            })
            .collect();
        self.ingresses
            .iter()
            .map(|ingress| {
                let (trigger_type, value) = ingress.trigger_key();
                let name = match ingress {
                    Ingress::PhoneNumber(_) => RuleName::new(format!("phone-{value}")),
                    Ingress::Trunk(trunk) => RuleName::new(format!("sip-{}", trunk.connector_id)),
                };
                TriggerRule::new(name, trigger_type, value, targets.clone())
                    .map_err(TopologyError::from)
            })
            .collect()
    }

    /// Ensures rule targets reference known applications in their region.
    fn check_rule_targets(&self, rules: &TriggerRuleSet) -> Result<(), TopologyError> {
        for rule in rules.rules() {
            for target in rule.targets() {
                let Some(application) =
                    self.applications.iter().find(|application| application.id == target.application)
                else {
                    return Err(TopologyError::UnknownApplication {
                        rule: rule.name().to_string(),
                        application: target.application.to_string(),
                    });
                };
                if application.region != target.region {
                    return Err(TopologyError::TargetRegionMismatch {
                        rule: rule.name().to_string(),
                        application: target.application.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Ensures every ingress is matched by a rule of its trigger type.
    fn check_coverage(&self, rules: &TriggerRuleSet) -> Result<(), TopologyError> {
        for ingress in &self.ingresses {
            let (trigger_type, value) = ingress.trigger_key();
            if !rules.covers(trigger_type, &value) {
                return Err(TopologyError::UnmappedIngress {
                    trigger_type,
                    value,
                });
            }
        }
        Ok(())
    }
}
