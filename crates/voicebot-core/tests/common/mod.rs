// crates/voicebot-core/tests/common/mod.rs
// =============================================================================
// Module: Voicebot Core Test Helpers
// Description: Shared fixtures for topology, trust, and routing tests.
// Purpose: Reduce duplication across integration tests for voicebot-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fixtures use fixed valid identifiers.")]

use std::collections::BTreeMap;
use std::sync::Mutex;

use voicebot_core::AccountId;
use voicebot_core::ApplicationId;
use voicebot_core::ArnScope;
use voicebot_core::AuditEvent;
use voicebot_core::BotAliasId;
use voicebot_core::BotEndpointRef;
use voicebot_core::BotId;
use voicebot_core::CidrBlock;
use voicebot_core::E164Number;
use voicebot_core::HandlerConfig;
use voicebot_core::HandlerDefinition;
use voicebot_core::HandlerInvocation;
use voicebot_core::HandlerInvoker;
use voicebot_core::HandlerName;
use voicebot_core::HandlerReply;
use voicebot_core::Ingress;
use voicebot_core::InvocationError;
use voicebot_core::MediaApplication;
use voicebot_core::Partition;
use voicebot_core::PhoneNumberIngress;
use voicebot_core::PhoneNumberType;
use voicebot_core::Region;
use voicebot_core::RoutingAuditSink;
use voicebot_core::TopologyBuilder;
use voicebot_core::TrunkIngress;
use voicebot_core::TwoLetterCode;
use voicebot_core::VoiceConnectorId;
use voicebot_core::core::ingress::DEFAULT_TERMINATION_CIDRS;

/// Deploying account.
pub const ACCOUNT: &str = "123456789012";
/// Deploying region.
pub const REGION: &str = "us-east-1";
/// Provisioned phone number.
pub const PHONE: &str = "+15555550100";
/// Voice Connector id.
pub const CONNECTOR: &str = "abcdef1234";

/// Parses a region.
pub fn region(value: &str) -> Region {
    Region::parse(value).unwrap()
}

/// Deployment scope for the fixed account and region.
pub fn scope() -> ArnScope {
    ArnScope::new(Partition::default(), region(REGION), AccountId::parse(ACCOUNT).unwrap())
}

/// Bot `B1` alias `A1`.
pub fn bot() -> BotEndpointRef {
    BotEndpointRef::new(BotId::parse("B1").unwrap(), BotAliasId::parse("A1").unwrap())
}

/// Handler bound to the fixture bot with default config.
pub fn handler(name: &str) -> HandlerDefinition {
    HandlerDefinition::new(HandlerName::parse(name).unwrap(), HandlerConfig::new(bot()))
}

/// Parses an application id.
pub fn app_id(id: &str) -> ApplicationId {
    ApplicationId::parse(id).unwrap()
}

/// Media application in a region backed by a handler.
pub fn application(id: &str, region_name: &str, handler_name: &str) -> MediaApplication {
    MediaApplication::new(
        app_id(id),
        format!("{id}-app"),
        region(region_name),
        HandlerName::parse(handler_name).unwrap(),
    )
}

/// Local number ordered in AZ.
pub fn phone_ingress(number: &str) -> Ingress {
    Ingress::PhoneNumber(PhoneNumberIngress {
        number: E164Number::parse(number).unwrap(),
        state: TwoLetterCode::parse("AZ").unwrap(),
        number_type: PhoneNumberType::Local,
    })
}

/// Trunk with the default carrier CIDRs.
pub fn trunk_ingress(connector: &str) -> Ingress {
    let cidrs = DEFAULT_TERMINATION_CIDRS
        .iter()
        .map(|cidr| cidr.parse::<CidrBlock>().unwrap())
        .collect();
    Ingress::Trunk(TrunkIngress::new(
        VoiceConnectorId::parse(connector).unwrap(),
        cidrs,
        vec![TwoLetterCode::parse("US").unwrap()],
    ))
}

/// One handler, one application, both ingress kinds; rules derived.
pub fn standard_builder() -> TopologyBuilder {
    TopologyBuilder::new(scope())
        .bot(bot())
        .handler(handler("bot-handler"))
        .application(application("sma-primary", REGION, "bot-handler"))
        .ingress(phone_ingress(PHONE))
        .ingress(trunk_ingress(CONNECTOR))
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns the recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl RoutingAuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Invoker answering per application id; unknown ids are unavailable.
#[derive(Default)]
pub struct ScriptedInvoker {
    /// Replies keyed by application id.
    replies: BTreeMap<String, Result<HandlerReply, InvocationError>>,
    /// Invocations received.
    calls: Mutex<Vec<HandlerInvocation>>,
}

impl ScriptedInvoker {
    /// Scripts the reply for an application.
    pub fn reply(mut self, application: &str, reply: Result<HandlerReply, InvocationError>) -> Self {
        self.replies.insert(application.to_string(), reply);
        self
    }

    /// Returns the invocations received.
    pub fn calls(&self) -> Vec<HandlerInvocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl HandlerInvoker for ScriptedInvoker {
    fn invoke(&self, invocation: &HandlerInvocation) -> Result<HandlerReply, InvocationError> {
        self.calls.lock().unwrap().push(invocation.clone());
        self.replies.get(invocation.application.as_str()).cloned().unwrap_or_else(|| {
            Err(InvocationError::Unavailable {
                message: "no script".to_string(),
            })
        })
    }
}

/// Accept reply with one action.
pub fn accept() -> Result<HandlerReply, InvocationError> {
    Ok(HandlerReply::Accept {
        actions: vec![serde_json::json!({"Type": "StartBotConversation"})],
    })
}
