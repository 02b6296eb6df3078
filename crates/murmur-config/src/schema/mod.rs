//! Configuration schema types for murmur.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod channels;
mod echo;
mod retry;
mod session;
mod system;

pub use channels::*;
pub use echo::*;
pub use retry::*;
pub use session::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MurmurConfig {
    pub session: SessionConfig,
    pub channels: ChannelsConfig,
    pub echo: EchoConfig,
    pub retry: RetryConfig,
    pub cli: CliConfig,
    pub logging: LoggingConfig,
}
