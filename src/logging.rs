//! Logging Setup
//!
//! Shared by the binaries. Records go through `env_logger`; warnings and
//! errors carry their level as a prefix, everything else is printed bare.

use log::LevelFilter;

use crate::environment::Environment;

/// Environment variable selecting the log level when no flag is given.
pub const LOG_LEVEL_ENV: &str = "HADOOP_GALAXY_LOG_LEVEL";

/// Parses a level name. Python-style names such as `WARNING` and
/// `CRITICAL` are accepted alongside the `log` crate's own.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(LevelFilter::Warn),
        "critical" | "fatal" => Some(LevelFilter::Error),
        other => other.parse().ok(),
    }
}

/// `clap` value parser for `--log-level`: rejects names [`parse_level`]
/// does not know.
pub fn level_arg(value: &str) -> Result<String, String> {
    match parse_level(value) {
        Some(_) => Ok(value.to_string()),
        None => Err(format!(
            "'{}' is not a valid log level (debug, info, warning, error, critical)",
            value
        )),
    }
}

/// Picks the level: the explicit flag, then [`LOG_LEVEL_ENV`], then `info`.
///
/// An unusable value is reported on stderr and ignored.
pub fn resolve_level(flag: Option<&str>, env: &Environment) -> LevelFilter {
    if let Some(raw) = flag {
        match parse_level(raw) {
            Some(level) => return level,
            None => eprintln!("Ignoring log level '{}' because it's not a valid log level", raw),
        }
    }
    if let Some(raw) = env.get_non_empty(LOG_LEVEL_ENV) {
        match parse_level(raw) {
            Some(level) => return level,
            None => eprintln!(
                "Ignoring value of {} because it's not a valid log level",
                LOG_LEVEL_ENV
            ),
        }
    }
    LevelFilter::Info
}

/// Installs the global logger. `RUST_LOG`, when set, still takes precedence
/// over the resolved level.
pub fn setup_logging(flag: Option<&str>, env: &Environment) {
    let level = resolve_level(flag, env);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_string().to_lowercase()),
    )
    .format(|buf, record| {
        use std::io::Write;

        match record.level() {
            log::Level::Warn | log::Level::Error => {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        }
    })
    .init();
}
