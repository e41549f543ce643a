//! Tracing setup for the `advisor` binary.
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides
//! the default filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Crates whose debug output drowns out ours.
const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "html5ever", "selectors"];

fn default_directives(level: &str) -> String {
    let mut directives = String::from(level);
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{module}=warn"));
    }
    directives
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noisy_crates_are_capped_at_warn() {
        let directives = default_directives("info");
        assert!(directives.starts_with("info,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.contains("hyper=warn"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init("debug");
        init("info");
    }
}
