//! Maps the loaded config file onto runtime types.

use std::time::Duration;

use murmur_config::schema::{CliConfig, EchoConfig, RetryConfig};
use murmur_config::MurmurConfig;
use murmur_session::{EchoTransport, ListenVolume, RetryPolicy, SessionConfig};

use crate::cli::Args;

/// Login parameters after applying command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub enable_tts: bool,
}

pub fn identity(config: &MurmurConfig, args: &Args) -> Identity {
    Identity {
        display_name: args
            .name
            .clone()
            .unwrap_or_else(|| config.session.display_name.clone()),
        enable_tts: config.session.enable_tts && !args.no_tts,
    }
}

pub fn session_config(config: &MurmurConfig) -> SessionConfig {
    SessionConfig {
        default_volume: ListenVolume::clamped(config.session.default_volume),
        event_capacity: config.session.event_capacity,
        all_channel: config.channels.all.clone(),
        team_channel: config.channels.team.clone(),
        listen_volume: ListenVolume::clamped(config.channels.listen_volume),
    }
}

pub fn retry_policy(config: &RetryConfig) -> RetryPolicy {
    RetryPolicy::new(config.join_attempts, Duration::from_millis(config.backoff_ms))
}

pub fn echo_transport(config: &EchoConfig) -> EchoTransport {
    EchoTransport::new(
        Duration::from_millis(config.latency_ms),
        config.self_id.clone(),
    )
}

/// `None` when timeouts are disabled.
pub fn operation_timeout(config: &CliConfig) -> Option<Duration> {
    (config.operation_timeout_secs > 0).then(|| Duration::from_secs(config.operation_timeout_secs))
}
