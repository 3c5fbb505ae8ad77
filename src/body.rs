//! Outbound RTI payload assembly.
//!
//! The serialized field names of [`RtiBody`] are the RTI wire contract and
//! must not change. Optional fields are omitted from serialization entirely,
//! never sent as null or empty, except `ContentType` which the service
//! expects as an empty string when the header is missing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::RtiConfig;
use crate::headers::{self, HeadersMap};
use crate::types::RtiRequest;

/// Resource type reported when the host supplies none.
const DEFAULT_RESOURCE_TYPE: &str = "text/html";

/// Override header consulted before the standard `Host` header.
const HOST_OVERRIDE_HEADER: &str = "x-cheq-rti-host";

/// Flat payload sent to the RTI service, built fresh per inspected request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RtiBody {
    #[serde(rename = "ApiKey")]
    pub api_key: String,
    #[serde(rename = "TagHash")]
    pub tag_hash: String,
    #[serde(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "ClientIP")]
    pub client_ip: String,
    #[serde(rename = "RequestURL")]
    pub request_url: String,
    #[serde(rename = "ResourceType")]
    pub resource_type: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Host", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "UserAgent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(rename = "Accept", skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(rename = "AcceptLanguage", skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    #[serde(rename = "AcceptEncoding", skip_serializing_if = "Option::is_none")]
    pub accept_encoding: Option<String>,
    #[serde(rename = "AcceptCharset", skip_serializing_if = "Option::is_none")]
    pub accept_charset: Option<String>,
    #[serde(rename = "HeaderNames")]
    pub header_names: String,
    #[serde(rename = "CheqCookie", skip_serializing_if = "Option::is_none")]
    pub cheq_cookie: Option<String>,
    /// Wall-clock capture time in milliseconds; the one non-deterministic
    /// field. Tests pin it through [`RtiBody::build_at`].
    #[serde(rename = "RequestTime")]
    pub request_time: u64,
    #[serde(rename = "XForwardedFor", skip_serializing_if = "Option::is_none")]
    pub x_forwarded_for: Option<String>,
    #[serde(rename = "Referer", skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(rename = "Origin", skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(rename = "XRequestedWith", skip_serializing_if = "Option::is_none")]
    pub x_requested_with: Option<String>,
    #[serde(rename = "Connection", skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(rename = "Pragma", skip_serializing_if = "Option::is_none")]
    pub pragma: Option<String>,
    #[serde(rename = "CacheControl", skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Empty string when the request carries no `Content-Type` header.
    #[serde(rename = "ContentType")]
    pub content_type: String,
    #[serde(rename = "TrueClientIP", skip_serializing_if = "Option::is_none")]
    pub true_client_ip: Option<String>,
    #[serde(rename = "XRealIP", skip_serializing_if = "Option::is_none")]
    pub x_real_ip: Option<String>,
    #[serde(rename = "RemoteAddr", skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    #[serde(rename = "Forwarded", skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<String>,
    #[serde(rename = "JA3", skip_serializing_if = "Option::is_none")]
    pub ja3: Option<String>,
    #[serde(rename = "Channel", skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl RtiBody {
    /// Builds the payload for a request using the current wall clock.
    pub fn build(request: &RtiRequest, config: &RtiConfig) -> Self {
        Self::build_at(request, config, unix_millis())
    }

    /// Builds the payload with an explicit `RequestTime`.
    ///
    /// [`RtiBody::build`] is the production entry point; this variant exists
    /// so tests can pin the clock and compare whole payloads.
    pub fn build_at(request: &RtiRequest, config: &RtiConfig, request_time: u64) -> Self {
        let headers = &request.headers;
        let passthrough = |name: &str| headers::get_header(headers, name).map(str::to_string);

        let client_ip = match &config.trusted_ip_header {
            Some(name) => headers::get_header(headers, name)
                .unwrap_or(&request.ip)
                .to_string(),
            None => request.ip.clone(),
        };

        let host = if config.host_header_override {
            headers::get_header(headers, HOST_OVERRIDE_HEADER)
                .or_else(|| headers::get_header(headers, "Host"))
                .map(str::to_string)
        } else {
            passthrough("Host")
        };

        Self {
            api_key: config.api_key.clone(),
            tag_hash: config.tag_hash.clone(),
            event_type: request.event_type.as_str().to_string(),
            client_ip,
            request_url: request.url.clone(),
            resource_type: request
                .resource_type
                .clone()
                .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
            method: request.method.clone(),
            host,
            user_agent: passthrough("User-Agent"),
            accept: passthrough("Accept"),
            accept_language: passthrough("Accept-Language"),
            accept_encoding: passthrough("Accept-Encoding"),
            accept_charset: passthrough("Accept-Charset"),
            header_names: headers.names().collect::<Vec<_>>().join(","),
            cheq_cookie: headers::get_cheq_cookie(headers::get_header(headers, "cookie")),
            request_time,
            x_forwarded_for: passthrough("X-Forwarded-For"),
            referer: passthrough("Referer"),
            origin: passthrough("Origin"),
            x_requested_with: passthrough("X-Requested-With"),
            connection: passthrough("Connection"),
            pragma: passthrough("Pragma"),
            cache_control: passthrough("Cache-Control"),
            content_type: passthrough("Content-Type").unwrap_or_default(),
            true_client_ip: passthrough("True-Client-IP"),
            x_real_ip: passthrough("X-Real-IP"),
            remote_addr: passthrough("Remote-Addr"),
            forwarded: passthrough("Forwarded"),
            ja3: request.ja3.clone(),
            channel: request.channel.clone(),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}
