//! Per-request orchestration around the decision core.
//!
//! Hosts that do not need framework-specific glue can run the whole flow
//! through [`RtiAgent`]: exemption check, event classification, payload
//! build, transport call, decision. The transport and log sink are traits so
//! integrations keep ownership of networking and log routing.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::body::RtiBody;
use crate::config::RtiConfig;
use crate::decision::RtiCore;
use crate::threat;
use crate::types::{Action, RtiRequest, RtiResponse};

/// Transport for the RTI service.
///
/// Implementations own the wire protocol, timeouts (see
/// [`RtiConfig::timeout`]), and any retry policy.
#[async_trait]
pub trait RtiService: Send + Sync {
    /// Sends the payload to RTI and returns its verdict.
    async fn call_rti(&self, body: &RtiBody, config: &RtiConfig) -> anyhow::Result<RtiResponse>;
}

/// Severity levels accepted by [`RtiLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Audit,
    Error,
    Info,
    Warn,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Audit => "audit",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
        }
    }
}

/// Log sink for the agent, with an optional enforcement-action label.
pub trait RtiLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, action: Option<&str>);

    fn audit(&self, message: &str, action: Option<&str>) {
        self.log(LogLevel::Audit, message, action);
    }

    fn error(&self, message: &str, action: Option<&str>) {
        self.log(LogLevel::Error, message, action);
    }

    fn info(&self, message: &str, action: Option<&str>) {
        self.log(LogLevel::Info, message, action);
    }

    fn warn(&self, message: &str, action: Option<&str>) {
        self.log(LogLevel::Warn, message, action);
    }
}

/// Default log sink forwarding to `tracing`.
///
/// Audit entries land on the info level with an `audit` marker field so
/// subscribers can route them separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RtiLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, action: Option<&str>) {
        let action = action.unwrap_or("-");
        match level {
            LogLevel::Audit => info!(audit = true, action, "{message}"),
            LogLevel::Error => error!(action, "{message}"),
            LogLevel::Info => info!(action, "{message}"),
            LogLevel::Warn => warn!(action, "{message}"),
        }
    }
}

/// Result of inspecting one request, for the host to execute.
#[derive(Debug, Clone)]
pub struct Inspection {
    /// Enforcement action
    pub action: Action,

    /// Redirect target, present exactly when `action` is `Redirect`
    pub redirect_location: Option<String>,

    /// RTI cookie-set instruction passed through from the verdict
    pub set_cookie: Option<String>,

    /// RTI request id, present when the service answered
    pub request_id: Option<String>,
}

impl Inspection {
    fn allow() -> Self {
        Self {
            action: Action::Allow,
            redirect_location: None,
            set_cookie: None,
            request_id: None,
        }
    }
}

/// Per-request orchestrator: policy + transport + log sink.
pub struct RtiAgent<S, L = TracingLogger> {
    core: RtiCore,
    service: S,
    logger: L,
}

impl<S: RtiService> RtiAgent<S> {
    /// Creates an agent logging through [`TracingLogger`].
    pub fn new(config: RtiConfig, service: S) -> anyhow::Result<Self> {
        Self::with_logger(config, service, TracingLogger)
    }
}

impl<S: RtiService, L: RtiLogger> RtiAgent<S, L> {
    /// Creates an agent with a custom log sink.
    pub fn with_logger(config: RtiConfig, service: S, logger: L) -> anyhow::Result<Self> {
        Ok(Self {
            core: RtiCore::new(config)?,
            service,
            logger,
        })
    }

    pub fn core(&self) -> &RtiCore {
        &self.core
    }

    /// Inspects one request end to end.
    ///
    /// The event type is classified from the configured route mappings;
    /// hosts reporting [`crate::types::EventType::Custom`] events build the
    /// payload through [`RtiBody::build`] directly instead. Exempt paths and
    /// transport failures resolve to `Allow` (fail-open: the site stays up
    /// when RTI is unreachable).
    pub async fn inspect(&self, request: &RtiRequest) -> Inspection {
        let path = url_path(&request.url);
        if self.core.should_ignore(path) {
            self.logger
                .info(&format!("path {path} exempt from enforcement"), None);
            return Inspection::allow();
        }

        let request = RtiRequest {
            event_type: self.core.event_type(path, &request.method),
            ..request.clone()
        };
        let body = RtiBody::build(&request, self.core.config());

        match self.service.call_rti(&body, self.core.config()).await {
            Ok(response) => self.enforce(&response),
            Err(err) => {
                self.logger.error(
                    &format!("RTI call failed, allowing request: {err}"),
                    Some(Action::Allow.as_str()),
                );
                Inspection::allow()
            }
        }
    }

    fn enforce(&self, response: &RtiResponse) -> Inspection {
        let action = self.core.decide(response);
        let message = format!(
            "request {} classified as {} (threat type {})",
            response.request_id,
            threat::label(response.threat_type_code).unwrap_or("unknown"),
            response.threat_type_code,
        );
        if action == Action::Allow {
            self.logger.info(&message, Some(action.as_str()));
        } else {
            self.logger.audit(&message, Some(action.as_str()));
        }

        Inspection {
            action,
            redirect_location: (action == Action::Redirect)
                .then(|| self.core.config().redirect_location.clone())
                .flatten(),
            set_cookie: (!response.set_cookie.is_empty()).then(|| response.set_cookie.clone()),
            request_id: Some(response.request_id.clone()),
        }
    }
}

/// Path portion of a URL: authority stripped, query and fragment cut off.
fn url_path(url: &str) -> &str {
    let path = match url.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "/",
        },
        None => url,
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::types::EventType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedService {
        response: RtiResponse,
        calls: Arc<AtomicUsize>,
    }

    impl FixedService {
        fn new(is_invalid: bool, threat_type_code: u16) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let service = Self {
                response: RtiResponse {
                    version: 1,
                    is_invalid,
                    threat_type_code,
                    request_id: "req-1".to_string(),
                    set_cookie: "_cheq_rti=token; Path=/".to_string(),
                },
                calls: Arc::clone(&calls),
            };
            (service, calls)
        }
    }

    #[async_trait]
    impl RtiService for FixedService {
        async fn call_rti(&self, _body: &RtiBody, _config: &RtiConfig) -> anyhow::Result<RtiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct FailingService;

    #[async_trait]
    impl RtiService for FailingService {
        async fn call_rti(&self, _body: &RtiBody, _config: &RtiConfig) -> anyhow::Result<RtiResponse> {
            anyhow::bail!("connection refused")
        }
    }

    fn config(mode: Mode) -> RtiConfig {
        RtiConfig {
            mode,
            api_key: "key".to_string(),
            tag_hash: "hash".to_string(),
            block_redirect_codes: vec![10],
            redirect_location: None,
            challenge_codes: Some(vec![5]),
            ignore_paths: Some(vec!["\\.css$".to_string()]),
            route_to_event_type: None,
            trusted_ip_header: None,
            host_header_override: true,
            timeout: None,
        }
    }

    fn request(url: &str) -> RtiRequest {
        RtiRequest {
            event_type: EventType::PageLoad,
            url: url.to_string(),
            ip: "127.0.0.1".to_string(),
            method: "GET".to_string(),
            headers: [("user-agent", "Mozilla/5.0")].into_iter().collect(),
            ja3: None,
            channel: None,
            resource_type: None,
        }
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("https://foo.com/a/b.css"), "/a/b.css");
        assert_eq!(url_path("https://foo.com/a/b?x=1"), "/a/b");
        assert_eq!(url_path("https://foo.com"), "/");
        assert_eq!(url_path("/a/b.css"), "/a/b.css");
        assert_eq!(url_path("/a/b#frag"), "/a/b");
    }

    #[tokio::test]
    async fn test_inspect_blocks_on_listed_code() {
        let (service, _calls) = FixedService::new(true, 10);
        let agent = RtiAgent::new(config(Mode::Blocking), service).unwrap();

        let inspection = agent.inspect(&request("https://foo.com/")).await;
        assert_eq!(inspection.action, Action::Block);
        assert_eq!(inspection.redirect_location, None);
        assert_eq!(inspection.request_id.as_deref(), Some("req-1"));
        assert_eq!(inspection.set_cookie.as_deref(), Some("_cheq_rti=token; Path=/"));
    }

    #[tokio::test]
    async fn test_inspect_redirects_when_location_set() {
        let (service, _calls) = FixedService::new(true, 10);
        let agent = RtiAgent::new(
            RtiConfig {
                redirect_location: Some("/blocked".to_string()),
                ..config(Mode::Blocking)
            },
            service,
        )
        .unwrap();

        let inspection = agent.inspect(&request("https://foo.com/")).await;
        assert_eq!(inspection.action, Action::Redirect);
        assert_eq!(inspection.redirect_location.as_deref(), Some("/blocked"));
    }

    #[tokio::test]
    async fn test_inspect_skips_exempt_path_without_calling_service() {
        let (service, calls) = FixedService::new(true, 10);
        let agent = RtiAgent::new(config(Mode::Blocking), service).unwrap();

        let inspection = agent.inspect(&request("https://foo.com/site.css")).await;
        assert_eq!(inspection.action, Action::Allow);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inspect_monitoring_still_reports_ignorable_paths() {
        let (service, calls) = FixedService::new(true, 10);
        let agent = RtiAgent::new(config(Mode::Monitoring), service).unwrap();

        let inspection = agent.inspect(&request("https://foo.com/site.css")).await;
        assert_eq!(inspection.action, Action::Allow);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inspect_fails_open_on_transport_error() {
        let agent = RtiAgent::new(config(Mode::Blocking), FailingService).unwrap();

        let inspection = agent.inspect(&request("https://foo.com/")).await;
        assert_eq!(inspection.action, Action::Allow);
        assert_eq!(inspection.request_id, None);
        assert_eq!(inspection.set_cookie, None);
    }
}
