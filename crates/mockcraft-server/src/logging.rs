//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "mockcraft=info,mockcraft_server=info";
const VERBOSE_DIRECTIVE: &str = "mockcraft=debug,mockcraft_server=debug";

/// Install the global subscriber. `RUST_LOG` overrides the default level.
/// Output goes to stderr so stdout stays clean for JSON and emitted programs.
pub fn init(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose)));

    // A second install (e.g. from tests) is a no-op.
    let _ = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
    };
}

fn directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_levels() {
        assert_eq!(directive(false), "mockcraft=info,mockcraft_server=info");
        assert!(directive(true).contains("debug"));
        assert!(EnvFilter::try_new(directive(true)).is_ok());
    }
}
