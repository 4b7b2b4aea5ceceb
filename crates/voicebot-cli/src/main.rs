// crates/voicebot-cli/src/main.rs
// ============================================================================
// Module: Voicebot CLI Entry Point
// Description: Command dispatcher for voicebot topology and routing workflows.
// Purpose: Validate configs, emit topology outputs, and preview call routing.
// Dependencies: clap, serde, serde_json, thiserror, voicebot-config, voicebot-core.
// ============================================================================

//! ## Overview
//! The `voicebot` CLI loads a `voicebot.toml`, builds the routing topology,
//! and prints its outputs or trust policy as JSON. `route` previews how an
//! inbound call would be delivered using a dry-run invoker that answers like
//! the standard bot hand-off handler; `authorize` evaluates one request
//! against the built trust model. Audit events go to stderr, or to an
//! append-only file with `--audit-log`, filtered by the configured level.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgGroup;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;
use voicebot_cli::t;
use voicebot_config::VoicebotConfig;
use voicebot_core::AccountId;
use voicebot_core::AuditEvent;
use voicebot_core::AuthorizationDecision;
use voicebot_core::CallId;
use voicebot_core::CallRouter;
use voicebot_core::FileAuditSink;
use voicebot_core::Fingerprint;
use voicebot_core::HandlerInvocation;
use voicebot_core::HandlerInvoker;
use voicebot_core::HandlerReply;
use voicebot_core::InboundCall;
use voicebot_core::InvocationContext;
use voicebot_core::InvocationError;
use voicebot_core::LogLevel;
use voicebot_core::ResourceArn;
use voicebot_core::RouteOutcome;
use voicebot_core::RoutingAuditSink;
use voicebot_core::StderrAuditSink;
use voicebot_core::Topology;
use voicebot_core::TopologyOutputs;
use voicebot_core::core::trust::START_CONVERSATION_ACTION;
use voicebot_core::core::trust::VOICE_CONNECTOR_SERVICE_PRINCIPAL;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Call id used when `--call-id` is not given.
const DEFAULT_CALL_ID: &str = "cli-preview";
/// Caller number used when `--caller` is not given.
const DEFAULT_CALLER: &str = "+10000000000";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "voicebot", disable_help_subcommand = true)]
struct Cli {
    /// Config file path (overrides `VOICEBOT_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Append audit events to this file instead of stderr.
    #[arg(long, value_name = "PATH", global = true)]
    audit_log: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Topology outputs and trust policy.
    Topology {
        /// Selected topology subcommand.
        #[command(subcommand)]
        command: TopologyCommand,
    },
    /// Preview how an inbound call is routed.
    Route(RouteCommand),
    /// Evaluate a request against the trust model.
    Authorize(AuthorizeCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a voicebot configuration file.
    Validate,
}

/// Topology subcommands.
#[derive(Subcommand, Debug)]
enum TopologyCommand {
    /// Print topology outputs and fingerprint as JSON.
    Build,
    /// Print the bot trust policy document.
    Policy,
}

/// Arguments for `route`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("trigger").args(["to", "host"]).required(true).multiple(true)))]
struct RouteCommand {
    /// Dialed number.
    #[arg(long, value_name = "NUMBER")]
    to: Option<String>,
    /// Request URI host of a trunk call.
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
    /// Calling party number.
    #[arg(long, value_name = "NUMBER", default_value = DEFAULT_CALLER)]
    caller: String,
    /// Call-leg identifier.
    #[arg(long, value_name = "ID", default_value = DEFAULT_CALL_ID)]
    call_id: String,
    /// Treat this application's handler as unavailable (repeatable).
    #[arg(long, value_name = "APPLICATION")]
    unavailable: Vec<String>,
}

/// Arguments for `authorize`.
#[derive(Args, Debug)]
struct AuthorizeCommand {
    /// Calling service principal.
    #[arg(long, default_value = VOICE_CONNECTOR_SERVICE_PRINCIPAL)]
    principal: String,
    /// Requested capability.
    #[arg(long, default_value = START_CONVERSATION_ACTION)]
    action: String,
    /// Target resource; defaults to the trust policy resource.
    #[arg(long, value_name = "ARN")]
    resource: Option<String>,
    /// Account owning the calling resource.
    #[arg(long, value_name = "ACCOUNT")]
    source_account: String,
    /// ARN of the calling resource.
    #[arg(long, value_name = "ARN")]
    source_arn: String,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// JSON emitted by `topology build`.
#[derive(Debug, Serialize)]
struct BuildReport<'a> {
    /// Provisioned resource outputs.
    outputs: &'a TopologyOutputs,
    /// Canonical topology fingerprint.
    fingerprint: Fingerprint,
}

/// JSON emitted by `route`.
#[derive(Debug, Serialize)]
struct RouteReport<'a> {
    /// Call that was routed.
    call: &'a InboundCall,
    /// Terminal outcome.
    #[serde(flatten)]
    outcome: RouteOutcome,
    /// Invocations delivered, in order.
    invocations: Vec<HandlerInvocation>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let (config, topology) = load_config(cli.config.as_deref())?;
    let audit = audit_sink(cli.audit_log.as_deref(), config.log_level)?;
    record_topology(&topology, audit.as_ref())?;
    match cli.command {
        Commands::Config {
            command,
        } => command_config(&command),
        Commands::Topology {
            command,
        } => command_topology(&topology, &command),
        Commands::Route(command) => command_route(&topology, audit.as_ref(), &command),
        Commands::Authorize(command) => command_authorize(&topology, &command),
    }
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Loads the configuration and builds its topology.
fn load_config(path: Option<&Path>) -> CliResult<(VoicebotConfig, Topology)> {
    VoicebotConfig::load_topology(path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the audit sink selected by `--audit-log`.
fn audit_sink(path: Option<&Path>, level: LogLevel) -> CliResult<Box<dyn RoutingAuditSink>> {
    match path {
        Some(path) => {
            let sink = FileAuditSink::new(path, level).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(StderrAuditSink::new(level))),
    }
}

/// Records a `topology_built` event for the loaded topology.
fn record_topology(topology: &Topology, audit: &dyn RoutingAuditSink) -> CliResult<()> {
    let fingerprint = topology_fingerprint(topology)?;
    audit.record(&AuditEvent::TopologyBuilt {
        fingerprint: fingerprint.value,
        ingresses: topology.ingresses().len(),
        rules: topology.rules().len(),
        grants: topology.trust().grants().len(),
    });
    Ok(())
}

/// Computes the topology fingerprint.
fn topology_fingerprint(topology: &Topology) -> CliResult<Fingerprint> {
    topology
        .fingerprint()
        .map_err(|err| CliError::new(t!("topology.fingerprint_failed", error = err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands. Loading already validated the config.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error(OutputStream::Stdout, &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Topology Commands
// ============================================================================

/// Dispatches topology subcommands.
fn command_topology(topology: &Topology, command: &TopologyCommand) -> CliResult<ExitCode> {
    let output = match command {
        TopologyCommand::Build => {
            let report = BuildReport {
                outputs: topology.outputs(),
                fingerprint: topology_fingerprint(topology)?,
            };
            to_json(&report, &t!("output.kind.outputs"))?
        }
        TopologyCommand::Policy => topology
            .policy_document()
            .to_json()
            .map_err(|err| CliError::new(t!("policy.render_failed", error = err)))?,
    };
    write_stdout_line(&output).map_err(|err| CliError::new(output_error(OutputStream::Stdout, &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Route Command
// ============================================================================

/// Invoker that answers like the bot hand-off handler without leaving the
/// process.
struct DryRunInvoker {
    /// Applications whose handlers report unavailable.
    unavailable: BTreeSet<String>,
    /// Invocations received, in order.
    invocations: RefCell<Vec<HandlerInvocation>>,
}

impl DryRunInvoker {
    /// Creates an invoker treating `unavailable` applications as down.
    fn new(unavailable: impl IntoIterator<Item = String>) -> Self {
        Self {
            unavailable: unavailable.into_iter().collect(),
            invocations: RefCell::new(Vec::new()),
        }
    }

    /// Consumes the invoker, returning the recorded invocations.
    fn into_invocations(self) -> Vec<HandlerInvocation> {
        self.invocations.into_inner()
    }
}

impl HandlerInvoker for DryRunInvoker {
    fn invoke(&self, invocation: &HandlerInvocation) -> Result<HandlerReply, InvocationError> {
        self.invocations.borrow_mut().push(invocation.clone());
        if self.unavailable.contains(invocation.application.as_str()) {
            return Err(InvocationError::Unavailable {
                message: "marked unavailable".to_string(),
            });
        }
        Ok(HandlerReply::start_bot_conversation(invocation))
    }
}

/// Builds the inbound call described by `route` arguments.
fn inbound_call(command: &RouteCommand) -> CliResult<InboundCall> {
    let call_id = CallId::new(command.call_id.clone());
    match (&command.host, &command.to) {
        (Some(host), dialed) => Ok(InboundCall::via_trunk(
            call_id,
            command.caller.clone(),
            dialed.clone().unwrap_or_default(),
            host.clone(),
        )),
        (None, Some(dialed)) => {
            Ok(InboundCall::to_number(call_id, command.caller.clone(), dialed.clone()))
        }
        (None, None) => Err(CliError::new(t!("route.target_required"))),
    }
}

/// Executes the `route` command.
fn command_route(
    topology: &Topology,
    audit: &dyn RoutingAuditSink,
    command: &RouteCommand,
) -> CliResult<ExitCode> {
    let call = inbound_call(command)?;
    let invoker = DryRunInvoker::new(command.unavailable.iter().cloned());
    let outcome = CallRouter::new(topology, &invoker, audit)
        .route(&call)
        .map_err(|err| CliError::new(t!("route.failed", error = err)))?;
    let report = RouteReport {
        call: &call,
        outcome,
        invocations: invoker.into_invocations(),
    };
    let output = to_json(&report, &t!("output.kind.route"))?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error(OutputStream::Stdout, &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Authorize Command
// ============================================================================

/// Executes the `authorize` command. Denials print the decision and fail.
fn command_authorize(topology: &Topology, command: &AuthorizeCommand) -> CliResult<ExitCode> {
    let source_account = AccountId::parse(command.source_account.clone())
        .map_err(|err| CliError::new(t!("authorize.source_account_invalid", error = err)))?;
    let context = InvocationContext::new(source_account, ResourceArn::new(command.source_arn.as_str()));
    let resource = command.resource.as_deref().map_or_else(
        || topology.outputs().trust_policy_resource_arn.clone(),
        ResourceArn::new,
    );
    let decision =
        topology.trust().authorize(&command.principal, &command.action, &resource, &context);
    let output = to_json(&decision, &t!("output.kind.decision"))?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error(OutputStream::Stdout, &err)))?;
    match decision {
        AuthorizationDecision::Allow {
            ..
        } => Ok(ExitCode::SUCCESS),
        AuthorizationDecision::Deny {
            reason,
        } => {
            write_stderr_line(&t!("authorize.denied", reason = reason))
                .map_err(|err| CliError::new(output_error(OutputStream::Stderr, &err)))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes a report as compact JSON.
fn to_json<T: Serialize>(value: &T, kind: &str) -> CliResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", kind = kind, error = err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Process stream a report or diagnostic is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl OutputStream {
    /// Stream name shown in write failures.
    const fn name(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Formats an output error message.
fn output_error(stream: OutputStream, error: &std::io::Error) -> String {
    t!("output.write_failed", stream = stream.name(), error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
