//! Subscriber setup. Filter precedence: `RUST_LOG`, then `--log-level`,
//! then `[logging] level`.

use tracing_subscriber::EnvFilter;

const FALLBACK_DIRECTIVE: &str = "murmur=info";

/// Pick the directive used when `RUST_LOG` is not set.
fn directive<'a>(flag: Option<&'a str>, configured: &'a str) -> &'a str {
    match flag.map(str::trim) {
        Some(level) if !level.is_empty() => level,
        _ => configured,
    }
}

pub fn init(flag: Option<&str>, configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let chosen = directive(flag, configured);
        EnvFilter::try_new(chosen).unwrap_or_else(|e| {
            eprintln!("invalid log directive {chosen:?} ({e}); using {FALLBACK_DIRECTIVE}");
            EnvFilter::new(FALLBACK_DIRECTIVE)
        })
    });

    // Logs go to stderr so command output on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
