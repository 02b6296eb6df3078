use std::path::PathBuf;

use clap::Parser;

/// murmur: drive a multi-channel voice session from the terminal.
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter override (e.g. `debug`, `murmur_session=trace`).
    /// `RUST_LOG` still wins when set.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Display name used at login. Defaults to `[session] display_name`.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Disable text-to-speech for this session.
    #[arg(long)]
    pub no_tts: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
