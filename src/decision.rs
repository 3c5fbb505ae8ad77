//! Decision engine mapping RTI verdicts and policy to enforcement actions.

use anyhow::Context;
use regex::Regex;

use crate::config::{Mode, RtiConfig};
use crate::types::{Action, EventType, RtiResponse};

/// Decision engine for a validated policy.
///
/// Compiles every configured pattern once at construction; the per-request
/// calls are pure functions over immutable state and safe to share across
/// threads without coordination.
pub struct RtiCore {
    config: RtiConfig,
    ignore_paths: Vec<Regex>,
    routes: Vec<CompiledRoute>,
}

struct CompiledRoute {
    path: Regex,
    method: Regex,
    event_type: EventType,
}

impl RtiCore {
    /// Compiles the policy's patterns. Fails on the same patterns
    /// [`crate::config::validate_config`] reports as invalid.
    pub fn new(config: RtiConfig) -> anyhow::Result<Self> {
        let ignore_paths = config
            .ignore_paths
            .iter()
            .flatten()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("invalid ignorePaths pattern {pattern:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let routes = config
            .route_to_event_type
            .iter()
            .flatten()
            .map(|mapping| {
                Ok(CompiledRoute {
                    path: Regex::new(&mapping.path).with_context(|| {
                        format!("invalid routeToEventType path pattern {:?}", mapping.path)
                    })?,
                    method: Regex::new(&mapping.method).with_context(|| {
                        format!("invalid routeToEventType method pattern {:?}", mapping.method)
                    })?,
                    event_type: mapping.event_type,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            config,
            ignore_paths,
            routes,
        })
    }

    pub fn config(&self) -> &RtiConfig {
        &self.config
    }

    /// Returns whether the path is exempt from enforcement.
    ///
    /// Exemptions exist only in blocking mode; monitoring observes every
    /// path, ignorable or not.
    pub fn should_ignore(&self, path: &str) -> bool {
        self.config.mode == Mode::Blocking
            && self.ignore_paths.iter().any(|pattern| pattern.is_match(path))
    }

    /// Event type for a path and method.
    ///
    /// The first mapping whose path and method patterns both match wins;
    /// without a match the default [`EventType::PageLoad`] is reported.
    pub fn event_type(&self, path: &str, method: &str) -> EventType {
        self.routes
            .iter()
            .find(|route| route.path.is_match(path) && route.method.is_match(method))
            .map(|route| route.event_type)
            .unwrap_or_default()
    }

    /// Maps an RTI verdict to the enforcement action for this policy.
    ///
    /// Monitoring mode and valid verdicts always allow. The block/redirect
    /// bucket is checked before the challenge bucket, so a code present in
    /// both (which validation rejects) resolves to block/redirect. An
    /// invalid verdict whose code is in neither bucket allows.
    pub fn decide(&self, response: &RtiResponse) -> Action {
        if self.config.mode == Mode::Blocking && response.is_invalid {
            if self
                .config
                .block_redirect_codes
                .contains(&response.threat_type_code)
            {
                return if self.config.redirect_location.is_some() {
                    Action::Redirect
                } else {
                    Action::Block
                };
            }
            if let Some(challenge_codes) = &self.config.challenge_codes {
                if challenge_codes.contains(&response.threat_type_code) {
                    return Action::Challenge;
                }
            }
        }
        Action::Allow
    }
}
