// crates/voicebot-core/src/core/ingress.rs
// ============================================================================
// Module: Ingress Model
// Description: Call origination paths (PSTN phone numbers and SIP trunks).
// Purpose: Describe where calls enter and which trigger value they produce.
// Dependencies: crate::core::{identifiers, trigger}, serde, thiserror
// ============================================================================

//! ## Overview
//! An [`Ingress`] is either a provisioned phone number or a Voice Connector
//! trunk. Each ingress produces exactly one trigger key: phone numbers match
//! `ToPhoneNumber` rules by number, trunks match `RequestUriHostname` rules
//! by their routing hostname.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::E164Number;
use crate::core::identifiers::TwoLetterCode;
use crate::core::identifiers::VoiceConnectorId;
use crate::core::trigger::TriggerType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default domain appended to a connector id to form its routing hostname.
pub const DEFAULT_ROUTING_DOMAIN: &str = "voiceconnector.chime.aws";

/// Termination CIDRs published by the default SIP carrier.
pub const DEFAULT_TERMINATION_CIDRS: &[&str] = &[
    "54.172.60.0/30",
    "54.244.51.0/30",
    "54.171.127.192/30",
    "35.156.191.128/30",
    "54.65.63.192/30",
    "54.169.127.128/30",
    "54.252.254.64/30",
    "177.71.206.192/30",
];

/// Default calling region for trunk termination.
pub const DEFAULT_CALLING_REGION: &str = "US";

// ============================================================================
// SECTION: CIDR Blocks
// ============================================================================

/// Errors raised when parsing a CIDR block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    /// Missing `/prefix` separator.
    #[error("cidr block missing prefix length: {0}")]
    MissingPrefix(String),
    /// Address part is not IPv4.
    #[error("cidr block has invalid address: {0}")]
    InvalidAddress(String),
    /// Prefix length outside 0..=32.
    #[error("cidr block has invalid prefix length: {0}")]
    InvalidPrefix(String),
    /// Address has bits set beyond the prefix.
    #[error("cidr block has host bits set: {0}")]
    HostBitsSet(String),
}

/// IPv4 network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CidrBlock {
    /// Network address.
    network: Ipv4Addr,
    /// Prefix length in bits.
    prefix: u8,
}

impl CidrBlock {
    /// Returns the network mask for this block.
    const fn mask(self) -> u32 {
        if self.prefix == 0 { 0 } else { u32::MAX << (32 - self.prefix) }
    }

    /// Returns true when the address lies inside the block.
    #[must_use]
    pub const fn contains(self, address: Ipv4Addr) -> bool {
        (address.to_bits() & self.mask()) == self.network.to_bits()
    }
}

impl FromStr for CidrBlock {
    type Err = CidrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (address, prefix) =
            value.split_once('/').ok_or_else(|| CidrError::MissingPrefix(value.to_string()))?;
        let network = Ipv4Addr::from_str(address)
            .map_err(|_| CidrError::InvalidAddress(value.to_string()))?;
        let prefix = prefix
            .parse::<u8>()
            .ok()
            .filter(|prefix| *prefix <= 32)
            .ok_or_else(|| CidrError::InvalidPrefix(value.to_string()))?;
        let block = Self {
            network,
            prefix,
        };
        if network.to_bits() & !block.mask() != 0 {
            return Err(CidrError::HostBitsSet(value.to_string()));
        }
        Ok(block)
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = CidrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CidrBlock> for String {
    fn from(value: CidrBlock) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

// ============================================================================
// SECTION: Phone Number Ingress
// ============================================================================

/// Phone number product class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneNumberType {
    /// Local (geographic) number.
    Local,
    /// Toll-free number.
    TollFree,
}

/// Direct PSTN number routed to a SIP media application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PhoneNumberIngress {
    /// Provisioned number.
    pub number: E164Number,
    /// State the number was ordered in.
    pub state: TwoLetterCode,
    /// Number product class.
    pub number_type: PhoneNumberType,
}

// ============================================================================
// SECTION: Trunk Ingress
// ============================================================================

/// Voice Connector SIP trunk terminating carrier calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrunkIngress {
    /// Voice Connector identifier.
    pub connector_id: VoiceConnectorId,
    /// Source networks allowed to terminate calls.
    pub allowed_cidrs: Vec<CidrBlock>,
    /// Country codes the trunk accepts calls for.
    pub calling_regions: Vec<TwoLetterCode>,
    /// Whether SIP/RTP encryption is required.
    pub encryption: bool,
    /// Domain appended to the connector id for the request URI host.
    pub routing_domain: String,
}

impl TrunkIngress {
    /// Creates a trunk with the default routing domain and encryption on.
    #[must_use]
    pub fn new(
        connector_id: VoiceConnectorId,
        allowed_cidrs: Vec<CidrBlock>,
        calling_regions: Vec<TwoLetterCode>,
    ) -> Self {
        Self {
            connector_id,
            allowed_cidrs,
            calling_regions,
            encryption: true,
            routing_domain: DEFAULT_ROUTING_DOMAIN.to_string(),
        }
    }

    /// Overrides the routing domain.
    #[must_use]
    pub fn with_routing_domain(mut self, domain: impl Into<String>) -> Self {
        self.routing_domain = domain.into();
        self
    }

    /// Overrides the encryption requirement.
    #[must_use]
    pub const fn with_encryption(mut self, encryption: bool) -> Self {
        self.encryption = encryption;
        self
    }

    /// Request URI host the carrier sends calls to.
    #[must_use]
    pub fn routing_hostname(&self) -> String {
        format!("{}.{}", self.connector_id, self.routing_domain)
    }

    /// Returns true when the source address may terminate calls on this trunk.
    #[must_use]
    pub fn permits_source(&self, address: Ipv4Addr) -> bool {
        self.allowed_cidrs.iter().any(|block| block.contains(address))
    }
}

// ============================================================================
// SECTION: Ingress
// ============================================================================

/// Call origination path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ingress {
    /// Direct PSTN number.
    PhoneNumber(PhoneNumberIngress),
    /// SIP trunk termination.
    Trunk(TrunkIngress),
}

impl Ingress {
    /// Trigger type and value this ingress produces for inbound calls.
    #[must_use]
    pub fn trigger_key(&self) -> (TriggerType, String) {
        match self {
            Self::PhoneNumber(number) => {
                (TriggerType::ToPhoneNumber, number.number.as_str().to_string())
            }
            Self::Trunk(trunk) => (TriggerType::RequestUriHostname, trunk.routing_hostname()),
        }
    }
}
