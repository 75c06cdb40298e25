use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "GETOPTX_LOG";

/// Install a stderr subscriber when `GETOPTX_LOG` is set.
///
/// Logging is off by default: stderr belongs to the diagnostics of the
/// script being parsed.
pub fn init_tracing() {
    let Ok(directive) = std::env::var(LOG_ENV) else {
        return;
    };

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
