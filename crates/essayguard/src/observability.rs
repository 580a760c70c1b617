//! Logging setup: human-readable stderr output plus a JSONL log file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_PATH_ENV: &str = "ESSAYGUARD_LOG_PATH";
const LOG_DIR_ENV: &str = "ESSAYGUARD_LOG_DIR";
const LOG_FILE_PREFIX: &str = "essayguard.jsonl";

/// Where the JSONL log goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Explicit log file; written without rotation.
    pub log_path: Option<PathBuf>,
    /// Directory for daily-rotated log files.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve log locations from the environment, then `config_dir`, then
    /// the platform data directory.
    pub fn from_env_with_overrides(config_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_dir,
        )
    }

    fn resolve(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        if env_path.is_some() {
            return Self {
                log_path: env_path,
                log_dir: None,
            };
        }
        let log_dir = env_dir.or(config_dir).or_else(|| {
            essayguard_core::config::user_data_local_dir()
                .map(|dir| dir.join("logs").into_std_path_buf())
        });
        Self {
            log_path: None,
            log_dir,
        }
    }
}

/// Build the log filter. `RUST_LOG` wins over every flag.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(filter_directive(quiet, verbose, default_level))
}

fn filter_directive(quiet: bool, verbose: u8, default_level: &str) -> &str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => default_level,
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
/// A log location that cannot be created downgrades to stderr-only logging.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match file_appender(config) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}

fn file_appender(config: &ObservabilityConfig) -> Option<RollingFileAppender> {
    if let Some(path) = &config.log_path {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path.file_name()?;
        std::fs::create_dir_all(dir).ok()?;
        return Some(tracing_appender::rolling::never(dir, name));
    }
    let dir = config.log_dir.as_ref()?;
    std::fs::create_dir_all(dir).ok()?;
    Some(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let cfg = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/eg.log")),
            Some(PathBuf::from("/tmp/dir")),
            Some(PathBuf::from("/tmp/cfg")),
        );
        assert_eq!(cfg.log_path, Some(PathBuf::from("/tmp/eg.log")));
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let cfg = ObservabilityConfig::resolve(
            None,
            Some(PathBuf::from("/tmp/dir")),
            Some(PathBuf::from("/tmp/cfg")),
        );
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/dir")));
    }

    #[test]
    fn config_dir_used_without_env() {
        let cfg = ObservabilityConfig::resolve(None, None, Some(PathBuf::from("/tmp/cfg")));
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/cfg")));
    }

    #[test]
    fn directive_follows_flags() {
        assert_eq!(filter_directive(true, 2, "info"), "error");
        assert_eq!(filter_directive(false, 0, "warn"), "warn");
        assert_eq!(filter_directive(false, 1, "warn"), "debug");
        assert_eq!(filter_directive(false, 3, "warn"), "trace");
    }

    #[test]
    fn file_appender_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/logs");
        let cfg = ObservabilityConfig {
            log_path: None,
            log_dir: Some(dir.clone()),
        };
        assert!(file_appender(&cfg).is_some());
        assert!(dir.is_dir());
    }
}
