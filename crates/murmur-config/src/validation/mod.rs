//! Full configuration validation.
//!
//! Collects every problem into a single `ConfigError` so one run reports
//! all of them.

mod helpers;


use crate::schema::MurmurConfig;
use helpers::{validate_not_blank, validate_range, validate_range_i32};
use murmur_common::ConfigError;

/// Listen volume bounds accepted by the voice transport.
pub const MIN_VOLUME: i32 = -50;
pub const MAX_VOLUME: i32 = 40;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MurmurConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_not_blank(&mut errors, "session.display_name", &config.session.display_name);
    validate_range_i32(
        &mut errors,
        "session.default_volume",
        config.session.default_volume,
        MIN_VOLUME,
        MAX_VOLUME,
    );
    validate_range(
        &mut errors,
        "session.event_capacity",
        config.session.event_capacity as u64,
        1,
        65_536,
    );

    validate_not_blank(&mut errors, "channels.all", &config.channels.all);
    validate_not_blank(&mut errors, "channels.team", &config.channels.team);
    if config.channels.all == config.channels.team {
        errors.push(format!(
            "channels.all and channels.team must differ (both are \"{}\")",
            config.channels.all
        ));
    }
    validate_range_i32(
        &mut errors,
        "channels.listen_volume",
        config.channels.listen_volume,
        MIN_VOLUME,
        MAX_VOLUME,
    );

    validate_range(&mut errors, "echo.latency_ms", config.echo.latency_ms, 0, 10_000);
    if let Some(ref id) = config.echo.self_id {
        validate_not_blank(&mut errors, "echo.self_id", id);
    }

    validate_range(
        &mut errors,
        "retry.join_attempts",
        u64::from(config.retry.join_attempts),
        1,
        10,
    );
    validate_range(&mut errors, "retry.backoff_ms", config.retry.backoff_ms, 0, 60_000);

    validate_not_blank(&mut errors, "logging.level", &config.logging.level);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
