use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Dependencies whose debug output drowns out ours.
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("reqwest", "warn"),
    ("rustls", "warn"),
];

/// Command-line verbosity overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub verbose: bool,
    pub quiet: bool,
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins over the flags, which win over the configured level.
/// An unparsable configured level falls back to `info`.
pub fn init(configured_level: &str, verbosity: Verbosity) {
    let (level, rejected) = resolve_level(configured_level, verbosity);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();

    if rejected {
        warn!(level = configured_level, "invalid log level provided, using info");
    }
}

/// Pick the effective level. The flag is set when the configured level
/// was unusable and had to be replaced.
fn resolve_level(configured: &str, verbosity: Verbosity) -> (LevelFilter, bool) {
    if verbosity.verbose {
        return (LevelFilter::DEBUG, false);
    }
    if verbosity.quiet {
        return (LevelFilter::ERROR, false);
    }
    match configured.trim().parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::INFO, true),
    }
}

/// Base level plus the noisy-dependency overrides.
fn directives(level: LevelFilter) -> String {
    let mut directives = vec![level.to_string().to_ascii_lowercase()];
    directives.extend(
        NOISY_TARGETS
            .iter()
            .map(|(target, lvl)| format!("{target}={lvl}")),
    );
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_case_insensitive() {
        let (level, rejected) = resolve_level("DEBUG", Verbosity::default());
        assert_eq!(level, LevelFilter::DEBUG);
        assert!(!rejected);
    }

    #[test]
    fn invalid_level_falls_back_to_info() {
        let (level, rejected) = resolve_level("chatty", Verbosity::default());
        assert_eq!(level, LevelFilter::INFO);
        assert!(rejected);
    }

    #[test]
    fn flags_override_config() {
        let verbose = Verbosity {
            verbose: true,
            quiet: false,
        };
        let quiet = Verbosity {
            verbose: false,
            quiet: true,
        };
        assert_eq!(resolve_level("error", verbose).0, LevelFilter::DEBUG);
        assert_eq!(resolve_level("debug", quiet).0, LevelFilter::ERROR);
    }

    #[test]
    fn directives_quiet_dependencies() {
        let d = directives(LevelFilter::DEBUG);
        assert!(d.starts_with("debug,"));
        assert!(d.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&d).is_ok());
    }
}
