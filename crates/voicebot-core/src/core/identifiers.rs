// crates/voicebot-core/src/core/identifiers.rs
// ============================================================================
// Module: Voicebot Identifiers
// Description: Strongly typed identifiers for accounts, regions, bots, and calls.
// Purpose: Validate identifier shapes once so ARN rendering stays injective.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers are string newtypes that serialize transparently. Identifiers
//! that are substituted into ARNs (accounts, regions, partitions, bot ids,
//! connector ids, application ids) are validated on construction and on
//! deserialization, so two distinct values can never render the same ARN.
//! Purely descriptive names (rule names, call ids) stay opaque.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digits in a cloud account identifier.
const ACCOUNT_ID_LENGTH: usize = 12;
/// Maximum number of digits in an E.164 number (excluding the `+`).
const MAX_E164_DIGITS: usize = 15;
/// Minimum number of digits accepted for an E.164 number.
const MIN_E164_DIGITS: usize = 2;
/// Maximum length of an ARN path segment supplied by configuration.
const MAX_SEGMENT_LENGTH: usize = 128;
/// Default ARN partition.
pub const DEFAULT_PARTITION: &str = "aws";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Account id is not exactly twelve digits.
    #[error("invalid account id: {0}")]
    InvalidAccount(String),
    /// Region is not of the `aa-bbbb-N` form.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    /// Partition contains characters outside `[a-z-]`.
    #[error("invalid partition: {0}")]
    InvalidPartition(String),
    /// Phone number is not E.164.
    #[error("invalid e.164 phone number: {0}")]
    InvalidPhoneNumber(String),
    /// State or country code is not two uppercase letters.
    #[error("invalid two-letter code: {0}")]
    InvalidCode(String),
    /// Value would break ARN segment boundaries.
    #[error("invalid {kind}: {value}")]
    InvalidSegment {
        /// Identifier kind label.
        kind: &'static str,
        /// Rejected value.
        value: String,
    },
}

// ============================================================================
// SECTION: Validated Identifiers
// ============================================================================

/// Twelve-digit cloud account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parses an account identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidAccount`] unless the value is exactly
    /// twelve ASCII digits.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.len() != ACCOUNT_ID_LENGTH || !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(IdentifierError::InvalidAccount(value));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Regional identifier such as `us-east-1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Parses a region identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidRegion`] when the value is not
    /// lowercase, dash separated, at least three segments, with a numeric tail.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        let segments: Vec<&str> = value.split('-').collect();
        let well_formed = segments.len() >= 3
            && segments.iter().all(|segment| {
                !segment.is_empty()
                    && segment.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit())
            })
            && segments[.. 2].iter().all(|segment| segment.bytes().all(|b| b.is_ascii_lowercase()))
            && segments.last().is_some_and(|tail| tail.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(IdentifierError::InvalidRegion(value));
        }
        Ok(Self(value))
    }

    /// Returns the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ARN partition such as `aws` or `aws-us-gov`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Partition(String);

impl Partition {
    /// Parses a partition.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidPartition`] for empty values or values
    /// outside `[a-z-]`.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.is_empty()
            || value.starts_with('-')
            || !value.bytes().all(|byte| byte.is_ascii_lowercase() || byte == b'-')
        {
            return Err(IdentifierError::InvalidPartition(value));
        }
        Ok(Self(value))
    }

    /// Returns the partition as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self(DEFAULT_PARTITION.to_string())
    }
}

/// Phone number in E.164 form (`+` followed by up to fifteen digits).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct E164Number(String);

impl E164Number {
    /// Parses an E.164 phone number.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidPhoneNumber`] when the value is not a
    /// `+` followed by digits with a non-zero leading digit.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        let Some(digits) = value.strip_prefix('+') else {
            return Err(IdentifierError::InvalidPhoneNumber(value));
        };
        let well_formed = (MIN_E164_DIGITS ..= MAX_E164_DIGITS).contains(&digits.len())
            && digits.bytes().all(|byte| byte.is_ascii_digit())
            && !digits.starts_with('0');
        if !well_formed {
            return Err(IdentifierError::InvalidPhoneNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Two-letter uppercase code (US state for number ordering, or calling country).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TwoLetterCode(String);

impl TwoLetterCode {
    /// Parses a two-letter code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidCode`] unless the value is exactly two
    /// uppercase ASCII letters.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.len() != 2 || !value.bytes().all(|byte| byte.is_ascii_uppercase()) {
            return Err(IdentifierError::InvalidCode(value));
        }
        Ok(Self(value))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Declares an ARN-segment-safe identifier newtype.
macro_rules! segment_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses the identifier, rejecting values that would break ARN
            /// segment boundaries.
            ///
            /// # Errors
            ///
            /// Returns [`IdentifierError::InvalidSegment`] for empty, overlong,
            /// or non `[A-Za-z0-9._-]` values.
            pub fn parse(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let value = value.into();
                validate_segment($kind, &value)?;
                Ok(Self(value))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

segment_identifier!(
    /// Conversational bot identifier.
    BotId,
    "bot id"
);
segment_identifier!(
    /// Published bot alias identifier.
    BotAliasId,
    "bot alias id"
);
segment_identifier!(
    /// Voice Connector (SIP trunk) identifier.
    VoiceConnectorId,
    "voice connector id"
);
segment_identifier!(
    /// SIP media application identifier.
    ApplicationId,
    "application id"
);
segment_identifier!(
    /// Media/event handler function name.
    HandlerName,
    "handler name"
);

/// Implements string conversions and display for hand-written identifiers.
macro_rules! validated_conversions {
    ($($name:ident),* $(,)?) => {
        $(
            impl TryFrom<String> for $name {
                type Error = IdentifierError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::parse(value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }
        )*
    };
}

validated_conversions!(AccountId, Region, Partition, E164Number, TwoLetterCode);

// ============================================================================
// SECTION: Opaque Identifiers
// ============================================================================

/// Trigger rule name, used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleName(String);

impl RuleName {
    /// Creates a new rule name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RuleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Call-leg identifier assigned by the call-control layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Creates a new call identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures a value is safe to embed as a single ARN path segment.
fn validate_segment(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
    let safe = !value.is_empty()
        && value.len() <= MAX_SEGMENT_LENGTH
        && value
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));
    if safe {
        Ok(())
    } else {
        Err(IdentifierError::InvalidSegment {
            kind,
            value: value.to_string(),
        })
    }
}
