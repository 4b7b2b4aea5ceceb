// crates/voicebot-cli/src/messages.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Centralize user-facing strings so wording stays consistent.
// Dependencies: None.
// ============================================================================

//! ## Overview
//! User-facing CLI strings live in a static catalog keyed by dotted names.
//! All runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is a constant table; lookups never allocate.
//! - Missing keys fall back to the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example, `path`).
    pub key: &'static str,
    /// Preformatted substitution value.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("topology.fingerprint_failed", "Failed to fingerprint topology: {error}"),
    ("policy.render_failed", "Failed to render trust policy: {error}"),
    ("route.target_required", "route requires --to or --host."),
    ("route.failed", "Call not routed: {error}"),
    ("authorize.source_account_invalid", "Invalid --source-account: {error}"),
    ("authorize.denied", "Authorization denied: {reason}"),
    ("output.serialize_failed", "Failed to serialize {kind}: {error}"),
    ("output.kind.outputs", "topology outputs"),
    ("output.kind.route", "route report"),
    ("output.kind.decision", "authorization decision"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

/// Returns the template registered for `key`.
fn template(key: &str) -> Option<&'static str> {
    CATALOG.iter().find(|(entry, _)| *entry == key).map(|(_, template)| *template)
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: &[MessageArg]) -> String {
    args.iter().fold(template(key).unwrap_or(key).to_string(), |message, arg| {
        message.replace(&format!("{{{}}}", arg.key), &arg.value)
    })
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        $crate::messages::translate(
            $key,
            &[
                $(
                    $crate::messages::MessageArg::new(stringify!($name), $value.to_string()),
                )*
            ],
        )
    }};
}
