//! Logging setup: env-filtered console output with local timestamps, plus
//! an optional daily-rotated log file.

use chrono::Local;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::utils::fs;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "subgrab=info,yt_source=info";

const LOG_FILE_PREFIX: &str = "subgrab.log";

/// Formats timestamps in the local timezone.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Console verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            _ => Self::Normal,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "subgrab=error,yt_source=error",
            Self::Normal => DEFAULT_LOG_FILTER,
            Self::Verbose => "subgrab=debug,yt_source=debug",
        }
    }
}

/// Build the filter: `RUST_LOG` wins over the verbosity flags.
pub fn build_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Install the global subscriber.
///
/// Console output goes to stderr so stdout stays free for transcripts and
/// JSON summaries. When `log_dir` is set, a daily-rotated file is written
/// there too; keep the returned guard alive until exit.
pub fn init_logging(
    verbosity: Verbosity,
    log_dir: Option<&Path>,
) -> crate::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::ensure_dir_all_sync_with_op("creating log directory", dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTimer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Verbose)
        .with_timer(LocalTimer);

    tracing_subscriber::registry()
        .with(build_filter(verbosity))
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::Error::Other(format!("Failed to set global default subscriber: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(DEFAULT_LOG_FILTER.contains("subgrab=info"));
        assert!(DEFAULT_LOG_FILTER.contains("yt_source=info"));
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert!(Verbosity::Quiet.directive().contains("error"));
    }
}
