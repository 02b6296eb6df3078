//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# murmur configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[session]
# display_name = "User"
# enable_tts = true
# default_volume = 0     # -50 to 40, applied right after joining
# event_capacity = 256

[channels]
# all = "all"            # aggregate channel
# team = "team"          # listening to all always includes team
# listen_volume = 0      # -50 to 40, applied by listen-all / listen-team

[echo]
# latency_ms = 50        # simulated transport round-trip
# self_id = "local"

[retry]
# join_attempts = 1      # 1 disables retrying
# backoff_ms = 250

[cli]
# operation_timeout_secs = 10   # 0 waits forever

[logging]
# level = "murmur=info"
"##
    .to_string()
}
