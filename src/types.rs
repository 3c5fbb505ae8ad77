//! Shared request, verdict, and action types.

use serde::{Deserialize, Serialize};

use crate::headers::HeadersMap;

/// Traffic event reported to RTI for a request.
///
/// Defaults to `PageLoad`, which is also what unmatched routes resolve to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    PageLoad,
    AddPayment,
    AddToCart,
    AddToWishlist,
    Registration,
    Purchase,
    Search,
    // Wire value is "start_trail"; the RTI API spells it this way.
    StartTrail,
    Subscribe,
    FormSubmission,
    /// Custom event; pair with [`RtiRequest::channel`].
    Custom,
    TokenValidation,
}

impl EventType {
    /// Returns the wire string for this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageLoad => "page_load",
            EventType::AddPayment => "add_payment",
            EventType::AddToCart => "add_to_cart",
            EventType::AddToWishlist => "add_to_wishlist",
            EventType::Registration => "registration",
            EventType::Purchase => "purchase",
            EventType::Search => "search",
            EventType::StartTrail => "start_trail",
            EventType::Subscribe => "subscribe",
            EventType::FormSubmission => "form_submission",
            EventType::Custom => "custom",
            EventType::TokenValidation => "token_validation",
        }
    }
}

/// Enforcement action for a request, the terminal output of the decision
/// step. Execution (responding 403, issuing the redirect, running the
/// challenge flow) belongs to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Challenge,
    Block,
    Redirect,
}

impl Action {
    /// Returns the action label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Challenge => "challenge",
            Action::Block => "block",
            Action::Redirect => "redirect",
        }
    }
}

/// Normalized inbound HTTP request, constructed by the host's transport
/// adapter once per request.
#[derive(Debug, Clone)]
pub struct RtiRequest {
    /// Event type reported to RTI
    pub event_type: EventType,

    /// Full request URL
    pub url: String,

    /// Client IP as seen by the server
    pub ip: String,

    /// HTTP method
    pub method: String,

    /// Request headers
    pub headers: HeadersMap,

    /// JA3 TLS fingerprint, when the host terminates TLS and computes one
    pub ja3: Option<String>,

    /// Channel label for [`EventType::Custom`] events
    pub channel: Option<String>,

    /// Response content type override; `"text/html"` is assumed when absent
    pub resource_type: Option<String>,
}

/// Verdict returned by the RTI service for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtiResponse {
    /// RTI API version
    pub version: u32,

    /// Whether the request was classified as invalid traffic
    pub is_invalid: bool,

    /// Threat type code for the request; see [`crate::threat`]
    pub threat_type_code: u16,

    /// Request ID generated by RTI
    pub request_id: String,

    /// Data for the host to set the RTI cookie with
    pub set_cookie: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_wire_strings() {
        assert_eq!(EventType::PageLoad.as_str(), "page_load");
        assert_eq!(EventType::AddToCart.as_str(), "add_to_cart");
        assert_eq!(EventType::StartTrail.as_str(), "start_trail");
        assert_eq!(EventType::TokenValidation.as_str(), "token_validation");
    }

    #[test]
    fn test_event_type_serde_matches_as_str() {
        for event_type in [
            EventType::PageLoad,
            EventType::AddPayment,
            EventType::AddToCart,
            EventType::AddToWishlist,
            EventType::Registration,
            EventType::Purchase,
            EventType::Search,
            EventType::StartTrail,
            EventType::Subscribe,
            EventType::FormSubmission,
            EventType::Custom,
            EventType::TokenValidation,
        ] {
            let json = serde_json::to_string(&event_type).unwrap();
            assert_eq!(json, format!("\"{}\"", event_type.as_str()));
        }
    }

    #[test]
    fn test_event_type_default() {
        assert_eq!(EventType::default(), EventType::PageLoad);
    }

    #[test]
    fn test_action_as_str() {
        assert_eq!(Action::Allow.as_str(), "allow");
        assert_eq!(Action::Challenge.as_str(), "challenge");
        assert_eq!(Action::Block.as_str(), "block");
        assert_eq!(Action::Redirect.as_str(), "redirect");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "version": 1,
            "isInvalid": true,
            "threatTypeCode": 10,
            "requestId": "req-123",
            "setCookie": "_cheq_rti=abc; Path=/"
        }"#;

        let response: RtiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.version, 1);
        assert!(response.is_invalid);
        assert_eq!(response.threat_type_code, 10);
        assert_eq!(response.request_id, "req-123");
        assert_eq!(response.set_cookie, "_cheq_rti=abc; Path=/");
    }
}
