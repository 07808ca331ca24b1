//! `tracing-subscriber` setup for the binary.

use tracing_subscriber::EnvFilter;

/// Map `-v` occurrences to a default filter directive.
pub fn verbosity_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber. `RUST_LOG` overrides `verbosity`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_directive() {
        assert_eq!(verbosity_directive(0), "warn");
        assert_eq!(verbosity_directive(2), "debug");
        assert_eq!(verbosity_directive(9), "trace");
    }
}
