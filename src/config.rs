//! Operator policy for the RTI decision layer.
//!
//! The policy is loaded once at startup, validated with [`validate_config`],
//! and treated as read-only for the lifetime of the process. Serde names
//! follow the operator-facing camelCase convention used by RTI config files.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::EventType;

/// Operating mode for the decision layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Report traffic to RTI without enforcing anything.
    #[default]
    Monitoring,
    /// Report traffic to RTI and enforce the resulting action.
    Blocking,
}

/// Maps a route to the event type reported for it. First match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteToEventType {
    /// Path pattern (regex, searched against the request path)
    pub path: String,

    /// Method pattern (regex, searched against the request method)
    pub method: String,

    /// Event type reported when both patterns match
    pub event_type: EventType,
}

/// Operator policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtiConfig {
    pub mode: Mode,

    /// API key issued on the Paradome platform
    pub api_key: String,

    /// Tag hash issued on the Paradome platform
    pub tag_hash: String,

    /// Threat type codes that are blocked, or redirected when
    /// [`redirect_location`](Self::redirect_location) is set
    pub block_redirect_codes: Vec<u16>,

    /// Redirect target for blocked traffic; when unset, traffic is blocked
    /// outright instead of redirected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_location: Option<String>,

    /// Threat type codes that trigger the host's challenge flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_codes: Option<Vec<u16>>,

    /// Path patterns exempt from enforcement in blocking mode,
    /// e.g. `["/images", "/api/test", "\\.css$", "\\.js$"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_paths: Option<Vec<String>>,

    /// Route-to-event-type mappings, consulted in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_to_event_type: Option<Vec<RouteToEventType>>,

    /// Header whose value overrides the transport-level client IP when
    /// present and non-empty. Both historical option names are accepted.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "trustedIPHeader",
        alias = "ipHeader"
    )]
    pub trusted_ip_header: Option<String>,

    /// Prefer the `x-cheq-rti-host` override header when deriving the
    /// payload Host field, falling back to the standard `Host` header.
    /// Disable to consult the standard header only.
    #[serde(default = "default_true")]
    pub host_header_override: bool,

    /// Timeout in milliseconds before the service client cancels the RTI
    /// call. Carried for the transport; not interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_true() -> bool {
    true
}

/// Validates a policy, returning every problem found.
///
/// An empty result means the policy is usable. Problems are reported, never
/// panicked: the host decides whether a bad policy aborts startup or is
/// logged and ignored.
pub fn validate_config(config: &RtiConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.api_key.is_empty() {
        errors.push("apiKey must not be empty".to_string());
    }
    if config.tag_hash.is_empty() {
        errors.push("tagHash must not be empty".to_string());
    }

    if let Some(challenge_codes) = &config.challenge_codes {
        let duplicates: Vec<u16> = config
            .block_redirect_codes
            .iter()
            .filter(|code| challenge_codes.contains(code))
            .copied()
            .collect();
        if !duplicates.is_empty() {
            errors.push(format!(
                "blockRedirectCodes and challengeCodes must be unique for each array, duplicates found: {duplicates:?}"
            ));
        }
    }

    for pattern in config.ignore_paths.iter().flatten() {
        if let Err(err) = Regex::new(pattern) {
            errors.push(format!("ignorePaths pattern {pattern:?} is invalid: {err}"));
        }
    }
    for mapping in config.route_to_event_type.iter().flatten() {
        if let Err(err) = Regex::new(&mapping.path) {
            errors.push(format!(
                "routeToEventType path pattern {:?} is invalid: {err}",
                mapping.path
            ));
        }
        if let Err(err) = Regex::new(&mapping.method) {
            errors.push(format!(
                "routeToEventType method pattern {:?} is invalid: {err}",
                mapping.method
            ));
        }
    }

    errors
}
