//! yt-dlp release freshness check.
//!
//! YouTube changes often enough that a yt-dlp release older than a month is
//! likely to fail in confusing ways, so the binary's version date is compared
//! against today and against a minimum known-good release.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::YtDlp;

/// Releases older than this are reported as stale.
pub const MAX_AGE_DAYS: i64 = 30;

/// Oldest release known to work with the current site.
pub const MIN_RECOMMENDED_VERSION: &str = "2025.12.01";

/// Outcome of a version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStatus {
    /// Raw version string, `None` when the binary could not be run.
    pub version: Option<String>,
    pub age_days: Option<i64>,
    pub needs_update: bool,
    /// Human-readable hint when `needs_update` is set.
    pub hint: Option<String>,
}

/// Parse the release date out of a yt-dlp version string.
///
/// Accepts `YYYY.MM.DD` with an optional nightly suffix (`2025.12.01.123456`).
pub fn parse_version_date(version: &str) -> Option<NaiveDate> {
    let mut parts = version.trim().split('.');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Evaluate a version string against `today`.
pub fn evaluate(version: &str, today: NaiveDate) -> VersionStatus {
    let version = version.trim().to_string();
    let Some(released) = parse_version_date(&version) else {
        return VersionStatus {
            hint: Some(format!("unrecognised yt-dlp version '{version}'")),
            version: Some(version),
            age_days: None,
            needs_update: false,
        };
    };

    let age = (today - released).num_days();
    let below_minimum =
        parse_version_date(MIN_RECOMMENDED_VERSION).is_some_and(|min| released < min);

    let hint = if below_minimum {
        Some(format!(
            "yt-dlp {version} is older than the recommended {MIN_RECOMMENDED_VERSION}; run `yt-dlp -U`"
        ))
    } else if age > MAX_AGE_DAYS {
        Some(format!(
            "yt-dlp {version} is {age} days old; run `yt-dlp -U`"
        ))
    } else {
        None
    };

    VersionStatus {
        version: Some(version),
        age_days: Some(age),
        needs_update: hint.is_some(),
        hint,
    }
}

/// Run `yt-dlp --version` and evaluate the result. Never fails.
pub async fn check(ytdlp: &YtDlp) -> VersionStatus {
    let binary = ytdlp.config().binary_path();
    let mut cmd = process_utils::tokio_command(&binary);
    cmd.arg("--version");

    match process_utils::run_captured(&mut cmd).await {
        Ok(out) if out.success() => evaluate(&out.stdout, Local::now().date_naive()),
        Ok(out) => VersionStatus {
            version: None,
            age_days: None,
            needs_update: true,
            hint: Some(format!("{binary} --version failed: {}", out.diagnostic())),
        },
        Err(e) => VersionStatus {
            version: None,
            age_days: None,
            needs_update: true,
            hint: Some(format!(
                "{binary} could not be run ({e}); install it with `pip install -U yt-dlp`"
            )),
        },
    }
}

/// Attempt `yt-dlp -U`. Returns whether the updater exited successfully.
pub async fn update(ytdlp: &YtDlp) -> bool {
    let mut cmd = process_utils::tokio_command(ytdlp.config().binary_path());
    cmd.arg("-U");

    match process_utils::run_captured(&mut cmd).await {
        Ok(out) if out.success() => {
            info!(output = %out.stdout.trim(), "yt-dlp update finished");
            true
        }
        Ok(out) => {
            warn!(error = %out.diagnostic(), "yt-dlp self-update failed");
            false
        }
        Err(e) => {
            warn!(error = %e, "Could not run yt-dlp updater");
            false
        }
    }
}
