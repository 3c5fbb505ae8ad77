//! Policy checker for the CHEQ RTI decision layer.
//!
//! Loads an operator policy, validates it, and prints what the agent would
//! enforce. Intended for CI and pre-deploy checks: a bad policy exits
//! non-zero before it reaches a running server.

use anyhow::Result;
use cheq_rti_agent::{threat, validate_config, Mode, RtiConfig, RtiCore};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cheq-rti-agent")]
#[command(author, version, about = "Policy validation for the CHEQ RTI decision layer")]
struct Args {
    /// Path to the policy file (JSON or YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

fn load_config(path: &Path) -> Result<RtiConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs, &args.log_level);

    let config = load_config(&args.config)?;

    let errors = validate_config(&config);
    if !errors.is_empty() {
        for problem in &errors {
            error!(%problem, "policy error");
        }
        anyhow::bail!("policy has {} error(s)", errors.len());
    }

    // Compile the patterns too; validate_config reports the same problems,
    // but this is the construction path a host will actually take.
    let core = RtiCore::new(config)?;
    let config = core.config();

    info!(mode = ?config.mode, "policy ok");
    for &code in &config.block_redirect_codes {
        info!(
            code,
            label = threat::label(code).unwrap_or("unknown"),
            group = threat::group(code).map_or("unknown", |g| g.as_str()),
            "block/redirect threat type"
        );
    }
    for &code in config.challenge_codes.iter().flatten() {
        info!(
            code,
            label = threat::label(code).unwrap_or("unknown"),
            group = threat::group(code).map_or("unknown", |g| g.as_str()),
            "challenge threat type"
        );
    }
    if let Some(patterns) = &config.ignore_paths {
        info!(count = patterns.len(), "ignore path patterns compiled");
    }
    if let Some(mappings) = &config.route_to_event_type {
        info!(count = mappings.len(), "route mappings compiled");
    }
    if config.mode == Mode::Monitoring {
        warn!("monitoring mode: traffic is reported but never enforced");
    }

    Ok(())
}
