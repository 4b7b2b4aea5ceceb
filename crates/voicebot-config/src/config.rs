// crates/voicebot-config/src/config.rs
// ============================================================================
// Module: Voicebot Configuration
// Description: Configuration loading and validation for voicebot deployments.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: voicebot-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then overlaid with environment variables. Identifiers are validated while
//! parsing; structural checks run by assembling the topology, so a config
//! that validates always builds.
//!
//! Environment precedence: environment variable, then file value, then
//! built-in default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use voicebot_core::AccountId;
use voicebot_core::ApplicationId;
use voicebot_core::ArnScope;
use voicebot_core::BotAliasId;
use voicebot_core::BotEndpointRef;
use voicebot_core::BotId;
use voicebot_core::CidrBlock;
use voicebot_core::E164Number;
use voicebot_core::HandlerConfig;
use voicebot_core::HandlerDefinition;
use voicebot_core::HandlerName;
use voicebot_core::Ingress;
use voicebot_core::LogLevel;
use voicebot_core::MediaApplication;
use voicebot_core::Partition;
use voicebot_core::PhoneNumberIngress;
use voicebot_core::PhoneNumberType;
use voicebot_core::Region;
use voicebot_core::RuleName;
use voicebot_core::RuleTarget;
use voicebot_core::Topology;
use voicebot_core::TopologyBuilder;
use voicebot_core::TriggerRule;
use voicebot_core::TriggerType;
use voicebot_core::TrunkIngress;
use voicebot_core::TwoLetterCode;
use voicebot_core::VoiceConnectorId;
use voicebot_core::core::endpoint::DEFAULT_HANDLER_TIMEOUT;
use voicebot_core::core::endpoint::DEFAULT_LANGUAGE;
use voicebot_core::core::endpoint::DEFAULT_LOCALE;
use voicebot_core::core::endpoint::DEFAULT_WELCOME_MESSAGE;
use voicebot_core::core::ingress::DEFAULT_CALLING_REGION;
use voicebot_core::core::ingress::DEFAULT_TERMINATION_CIDRS;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "voicebot.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "VOICEBOT_CONFIG";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";
/// Environment variable overriding the default phone number state.
pub const PHONE_NUMBER_STATE_ENV_VAR: &str = "PHONE_NUMBER_STATE";
/// Environment variable overriding the deployment account.
pub const ACCOUNT_ENV_VAR: &str = "VOICEBOT_ACCOUNT";
/// Environment variable overriding the deployment region.
pub const REGION_ENV_VAR: &str = "VOICEBOT_REGION";
/// Default state phone numbers are ordered in.
const DEFAULT_PHONE_NUMBER_STATE: &str = "AZ";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum handler timeout in seconds.
pub(crate) const MAX_HANDLER_TIMEOUT_SECS: u64 = 900;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Root `voicebot.toml` model.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoicebotConfig {
    /// Minimum audit event level.
    #[serde(default)]
    pub log_level: LogLevel,
    /// State used for phone numbers that do not name one (default `AZ`).
    #[serde(default)]
    pub phone_number_state: Option<TwoLetterCode>,
    /// Deployment scope.
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Published bot reference.
    #[serde(default)]
    pub bot: Option<BotConfig>,
    /// Handler functions.
    #[serde(default)]
    pub handlers: Vec<HandlerEntry>,
    /// SIP media applications.
    #[serde(default)]
    pub applications: Vec<ApplicationEntry>,
    /// Provisioned phone numbers.
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumberEntry>,
    /// SIP trunks.
    #[serde(default)]
    pub trunks: Vec<TrunkEntry>,
    /// Explicit trigger rules; derived from ingresses when empty.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// `[deployment]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    /// Deploying account; may come from the environment instead.
    #[serde(default)]
    pub account: Option<AccountId>,
    /// Deploying region; may come from the environment instead.
    #[serde(default)]
    pub region: Option<Region>,
    /// ARN partition.
    #[serde(default)]
    pub partition: Partition,
}

/// `[bot]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Bot identifier.
    pub bot_id: BotId,
    /// Published alias identifier.
    pub alias_id: BotAliasId,
}

/// `[[handlers]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerEntry {
    /// Handler function name.
    pub name: HandlerName,
    /// Bot locale.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Language tag passed in the handler environment.
    #[serde(default = "default_language")]
    pub language: String,
    /// Greeting played on pickup; an empty string disables it.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Invocation timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[[applications]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationEntry {
    /// Application identifier.
    pub id: ApplicationId,
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Hosting region; defaults to the deployment region.
    #[serde(default)]
    pub region: Option<Region>,
    /// Backing handler.
    pub handler: HandlerName,
}

/// `[[phone_numbers]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneNumberEntry {
    /// E.164 number.
    pub number: E164Number,
    /// Ordering state; defaults to `phone_number_state`.
    #[serde(default)]
    pub state: Option<TwoLetterCode>,
    /// Number product class.
    #[serde(default = "default_number_type")]
    pub number_type: PhoneNumberType,
}

/// `[[trunks]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrunkEntry {
    /// Voice Connector identifier.
    pub connector_id: VoiceConnectorId,
    /// Termination CIDRs; defaults to the carrier's published blocks.
    #[serde(default)]
    pub allowed_cidrs: Option<Vec<CidrBlock>>,
    /// Calling regions; defaults to `["US"]`.
    #[serde(default)]
    pub calling_regions: Option<Vec<TwoLetterCode>>,
    /// Encryption requirement.
    #[serde(default = "default_encryption")]
    pub encryption: bool,
    /// Routing domain override.
    #[serde(default)]
    pub routing_domain: Option<String>,
}

/// `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Rule name.
    pub name: String,
    /// Trigger type.
    pub trigger_type: TriggerType,
    /// Exact value to match.
    pub trigger_value: String,
    /// Ordered targets.
    #[serde(default)]
    pub targets: Vec<RuleTargetEntry>,
}

/// `[[rules.targets]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleTargetEntry {
    /// Target application.
    pub application: ApplicationId,
    /// Priority, 1 = primary.
    pub priority: u32,
    /// Region; defaults to the application's region.
    #[serde(default)]
    pub region: Option<Region>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl VoicebotConfig {
    /// Loads configuration from disk using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration from disk using the supplied environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_topology_with_env(path, lookup).map(|(config, _)| config)
    }

    /// Loads configuration and the topology it describes, building it once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, validation, or the build fails.
    pub fn load_topology(path: Option<&Path>) -> Result<(Self, Topology), ConfigError> {
        Self::load_topology_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration and its topology using the supplied environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, validation, or the build fails.
    pub fn load_topology_with_env<F>(
        path: Option<&Path>,
        lookup: F,
    ) -> Result<(Self, Topology), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.apply_env(&lookup)?;
        config.validate_entries()?;
        let topology = config.topology()?;
        Ok((config, topology))
    }

    /// Parses configuration text without environment overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown fields, or
    /// malformed identifiers.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override is malformed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
            self.log_level = level
                .parse()
                .map_err(|err| ConfigError::Invalid(format!("{LOG_LEVEL_ENV_VAR}: {err}")))?;
        }
        if let Some(state) = lookup(PHONE_NUMBER_STATE_ENV_VAR) {
            self.phone_number_state = Some(TwoLetterCode::parse(state).map_err(|err| {
                ConfigError::Invalid(format!("{PHONE_NUMBER_STATE_ENV_VAR}: {err}"))
            })?);
        }
        if let Some(account) = lookup(ACCOUNT_ENV_VAR) {
            self.deployment.account = Some(
                AccountId::parse(account)
                    .map_err(|err| ConfigError::Invalid(format!("{ACCOUNT_ENV_VAR}: {err}")))?,
            );
        }
        if let Some(region) = lookup(REGION_ENV_VAR) {
            self.deployment.region = Some(
                Region::parse(region)
                    .map_err(|err| ConfigError::Invalid(format!("{REGION_ENV_VAR}: {err}")))?,
            );
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_entries()?;
        self.topology().map(|_| ())
    }

    /// Checks per-entry settings that the topology builder does not cover.
    fn validate_entries(&self) -> Result<(), ConfigError> {
        for handler in &self.handlers {
            handler.validate()?;
        }
        for trunk in &self.trunks {
            trunk.validate()?;
        }
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::Invalid("rules.name must be non-empty".to_string()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // SECTION: Topology Assembly
    // ========================================================================

    /// Returns the deployment scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when account or region is missing.
    pub fn scope(&self) -> Result<ArnScope, ConfigError> {
        let account = self.deployment.account.clone().ok_or_else(|| {
            ConfigError::Invalid(format!("deployment.account or {ACCOUNT_ENV_VAR} is required"))
        })?;
        let region = self.deployment.region.clone().ok_or_else(|| {
            ConfigError::Invalid(format!("deployment.region or {REGION_ENV_VAR} is required"))
        })?;
        Ok(ArnScope::new(self.deployment.partition.clone(), region, account))
    }

    /// Assembles a topology builder from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when inputs cannot be assembled.
    pub fn topology_builder(&self) -> Result<TopologyBuilder, ConfigError> {
        let scope = self.scope()?;
        let mut builder = TopologyBuilder::new(scope.clone());
        let bot = self.bot.as_ref().map(BotConfig::endpoint);
        if let Some(bot) = &bot {
            builder = builder.bot(bot.clone());
            for handler in &self.handlers {
                builder = builder.handler(handler.definition(bot.clone()));
            }
        }
        for application in &self.applications {
            builder = builder.application(application.application(&scope));
        }
        let default_state = match &self.phone_number_state {
            Some(state) => state.clone(),
            None => TwoLetterCode::parse(DEFAULT_PHONE_NUMBER_STATE)
                .map_err(|err| ConfigError::Invalid(err.to_string()))?,
        };
        for number in &self.phone_numbers {
            builder = builder.ingress(number.ingress(&default_state));
        }
        for trunk in &self.trunks {
            builder = builder.ingress(trunk.ingress()?);
        }
        for rule in &self.rules {
            builder = builder.rule(self.rule(rule, &scope)?);
        }
        Ok(builder)
    }

    /// Builds the routing topology.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the topology fails validation.
    pub fn topology(&self) -> Result<Topology, ConfigError> {
        self.topology_builder()?.build().map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Converts a rule entry, defaulting target regions from applications.
    fn rule(&self, entry: &RuleEntry, scope: &ArnScope) -> Result<TriggerRule, ConfigError> {
        let targets = entry
            .targets
            .iter()
            .map(|target| {
                let region = target.region.clone().unwrap_or_else(|| {
                    self.applications
                        .iter()
                        .find(|application| application.id == target.application)
                        .map_or_else(
                            || scope.region.clone(),
                            |application| application.region_or(scope),
                        )
                });
                RuleTarget::new(region, target.priority, target.application.clone())
            })
            .collect();
        TriggerRule::new(
            RuleName::new(entry.name.clone()),
            entry.trigger_type,
            entry.trigger_value.clone(),
            targets,
        )
        .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

impl BotConfig {
    /// Returns the bot endpoint reference.
    fn endpoint(&self) -> BotEndpointRef {
        BotEndpointRef::new(self.bot_id.clone(), self.alias_id.clone())
    }
}

impl HandlerEntry {
    /// Validates handler settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_HANDLER_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "handlers.timeout_secs must be between 1 and {MAX_HANDLER_TIMEOUT_SECS}"
            )));
        }
        if self.locale.trim().is_empty() {
            return Err(ConfigError::Invalid("handlers.locale must be non-empty".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("handlers.language must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Converts the entry into a handler bound to the bot.
    fn definition(&self, bot: BotEndpointRef) -> HandlerDefinition {
        let config = HandlerConfig::new(bot)
            .with_locale(self.locale.clone())
            .with_language(self.language.clone())
            .with_welcome_message(self.welcome_message.trim())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        HandlerDefinition::new(self.name.clone(), config)
    }
}

impl ApplicationEntry {
    /// Region of the application, defaulting to the deployment region.
    fn region_or(&self, scope: &ArnScope) -> Region {
        self.region.clone().unwrap_or_else(|| scope.region.clone())
    }

    /// Converts the entry into a media application.
    fn application(&self, scope: &ArnScope) -> MediaApplication {
        MediaApplication::new(
            self.id.clone(),
            self.name.clone().unwrap_or_else(|| self.id.to_string()),
            self.region_or(scope),
            self.handler.clone(),
        )
    }
}

impl PhoneNumberEntry {
    /// Converts the entry into a phone number ingress.
    fn ingress(&self, default_state: &TwoLetterCode) -> Ingress {
        Ingress::PhoneNumber(PhoneNumberIngress {
            number: self.number.clone(),
            state: self.state.clone().unwrap_or_else(|| default_state.clone()),
            number_type: self.number_type,
        })
    }
}

impl TrunkEntry {
    /// Validates trunk settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_cidrs.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Invalid("trunks.allowed_cidrs must be non-empty".to_string()));
        }
        if self.calling_regions.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Invalid(
                "trunks.calling_regions must be non-empty".to_string(),
            ));
        }
        if self.routing_domain.as_ref().is_some_and(|domain| domain.trim().is_empty()) {
            return Err(ConfigError::Invalid("trunks.routing_domain must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Converts the entry into a trunk ingress.
    fn ingress(&self) -> Result<Ingress, ConfigError> {
        let allowed_cidrs = match &self.allowed_cidrs {
            Some(cidrs) => cidrs.clone(),
            None => DEFAULT_TERMINATION_CIDRS
                .iter()
                .map(|cidr| cidr.parse::<CidrBlock>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| ConfigError::Invalid(err.to_string()))?,
        };
        let calling_regions = match &self.calling_regions {
            Some(regions) => regions.clone(),
            None => vec![
                TwoLetterCode::parse(DEFAULT_CALLING_REGION)
                    .map_err(|err| ConfigError::Invalid(err.to_string()))?,
            ],
        };
        let mut trunk = TrunkIngress::new(self.connector_id.clone(), allowed_cidrs, calling_regions)
            .with_encryption(self.encryption);
        if let Some(domain) = &self.routing_domain {
            trunk = trunk.with_routing_domain(domain.trim());
        }
        Ok(Ingress::Trunk(trunk))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default handler locale.
fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

/// Default handler language tag.
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Default greeting.
fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}

/// Default handler timeout.
const fn default_timeout_secs() -> u64 {
    DEFAULT_HANDLER_TIMEOUT.as_secs()
}

/// Default phone number type.
const fn default_number_type() -> PhoneNumberType {
    PhoneNumberType::Local
}

/// Default trunk encryption.
const fn default_encryption() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
