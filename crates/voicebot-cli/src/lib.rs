// crates/voicebot-cli/src/lib.rs
// ============================================================================
// Module: Voicebot CLI Library
// Description: Shared helpers for the `voicebot` binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The `voicebot` binary routes every user-facing string through the
//! [`messages`] catalog via the [`t!`] macro.

pub mod messages;
