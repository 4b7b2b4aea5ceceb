// crates/voicebot-config/src/lib.rs
// ============================================================================
// Module: Voicebot Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for voicebot.toml semantics.
// Dependencies: voicebot-core, serde, toml
// ============================================================================

//! ## Overview
//! `voicebot-config` reads `voicebot.toml`, applies environment overrides,
//! and assembles the routing topology. Validation is fail-closed: a config
//! that loads always builds a topology.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
