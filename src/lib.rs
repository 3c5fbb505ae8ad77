//! CHEQ RTI decision layer.
//!
//! Classifies incoming HTTP traffic through the CHEQ RTI (real-time
//! intelligence) bot-detection service and decides, per request, whether to
//! allow, block, redirect, or challenge it.
//!
//! # Features
//!
//! - Operator policy with startup validation
//! - Outbound payload builder producing the exact RTI wire format
//! - Decision engine mapping RTI verdicts to enforcement actions
//! - Path exemptions and route-to-event-type classification
//! - Pluggable transport and logging seams for host integrations
//!
//! # Example
//!
//! ```ignore
//! use cheq_rti_agent::{RtiAgent, RtiConfig};
//!
//! let config: RtiConfig = serde_json::from_str(policy_json)?;
//! let agent = RtiAgent::new(config, transport)?;
//! let inspection = agent.inspect(&request).await;
//! // enforce inspection.action
//! ```

pub mod agent;
pub mod body;
pub mod config;
pub mod decision;
pub mod headers;
pub mod threat;
pub mod types;

pub use agent::{Inspection, LogLevel, RtiAgent, RtiLogger, RtiService, TracingLogger};
pub use body::RtiBody;
pub use config::{validate_config, Mode, RouteToEventType, RtiConfig};
pub use decision::RtiCore;
pub use headers::HeadersMap;
pub use types::{Action, EventType, RtiRequest, RtiResponse};
