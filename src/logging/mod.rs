use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(level: &str) -> String {
    format!("produce_inventory={}", level)
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Output goes to stderr so command output on stdout stays machine readable.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(level: &str, json: bool) {
    let filter_directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_directive(level));

    let builder = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr);

    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
