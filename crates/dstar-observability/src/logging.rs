//! Structured logging setup via tracing-subscriber
//!
//! Level is controlled by the `DSTAR_LOG` environment variable (standard
//! `tracing_subscriber::EnvFilter` syntax, e.g. `dstar_reflector=debug`);
//! absent that, `-v`/`--verbose` on the CLI selects debug vs info.

use tracing_subscriber::EnvFilter;

const ENV_VAR: &str = "DSTAR_LOG";

/// Initializes the global tracing subscriber. Call once at binary
/// startup, before any other logging happens.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_name_is_stable() {
        assert_eq!(ENV_VAR, "DSTAR_LOG");
    }
}
