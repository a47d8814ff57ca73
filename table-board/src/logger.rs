//! Logging Infrastructure
//!
//! Structured logging for the dashboard.
//! Features:
//! - Daily rotating application logs (deleted after 14 days)
//! - Permanent audit logs for staff actions (never deleted)

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, filter::filter_fn, fmt, prelude::*};

/// Days an application log file is kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const APP_PREFIX: &str = "app";
const AUDIT_PREFIX: &str = "audit";
const LOG_SUFFIX: &str = "log";

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` wins when set
/// * `json_format` - JSON console output instead of the pretty format
/// * `log_dir` - Optional directory for file logging; creates `app/` and `audit/`
///
/// # Examples
/// ```ignore
/// // Development setup (console only)
/// table_board::logger::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + files)
/// table_board::logger::init_logger_with_file("info", true, Some("./logs"))?;
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Console layer
    let json_console = json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty_console = (!json_format).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
    });

    let (app_layer, audit_layer) = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_log_dir = log_dir.join(APP_PREFIX);
            let audit_log_dir = log_dir.join(AUDIT_PREFIX);
            fs::create_dir_all(&app_log_dir)?;
            fs::create_dir_all(&audit_log_dir)?;

            // Application logs (rotated daily, subject to 14-day cleanup)
            let app_log = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(APP_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(app_log_dir)?;
            let app_layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(filter_fn(|meta| meta.target() != "audit"));

            // Permanent audit logs (never deleted)
            let audit_log = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(AUDIT_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(audit_log_dir)?;
            let audit_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(filter_fn(|meta| meta.target() == "audit"));

            (Some(app_layer), Some(audit_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(pretty_console)
        .with(app_layer)
        .with(audit_layer)
        .try_init()?;

    Ok(())
}

/// Delete application log files older than `retention_days`
///
/// Only `app/app.YYYY-MM-DD.log` files are considered; audit logs are kept.
/// Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join(APP_PREFIX);
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - chrono::Duration::days(retention_days);
    let mut deleted = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = log_file_date(name) else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// `app.2026-01-29.log` → 2026-01-29
fn log_file_date(name: &str) -> Option<NaiveDate> {
    let date_part = name
        .strip_prefix(APP_PREFIX)?
        .strip_prefix('.')?
        .strip_suffix(LOG_SUFFIX)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Periodic cleanup task - runs every hour until shutdown
pub async fn periodic_cleanup(log_dir: PathBuf, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = cleanup_old_logs(&log_dir, APP_LOG_RETENTION_DAYS) {
                    tracing::error!(error = %e, "Failed to cleanup old logs");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_date() {
        assert_eq!(
            log_file_date("app.2026-01-29.log"),
            NaiveDate::from_ymd_opt(2026, 1, 29)
        );
        assert_eq!(log_file_date("audit.2026-01-29.log"), None);
        assert_eq!(log_file_date("app.log"), None);
        assert_eq!(log_file_date("app.2026-13-01.log"), None);
    }

    #[test]
    fn test_cleanup_only_removes_old_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        let audit_dir = dir.path().join("audit");
        fs::create_dir_all(&app_dir).unwrap();
        fs::create_dir_all(&audit_dir).unwrap();

        let today = Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        let old_name = format!("app.{}.log", old.format("%Y-%m-%d"));
        let new_name = format!("app.{}.log", today.format("%Y-%m-%d"));
        let audit_name = format!("audit.{}.log", old.format("%Y-%m-%d"));
        fs::write(app_dir.join(&old_name), "old").unwrap();
        fs::write(app_dir.join(&new_name), "new").unwrap();
        fs::write(app_dir.join("notes.txt"), "keep").unwrap();
        fs::write(audit_dir.join(&audit_name), "audit").unwrap();

        let deleted = cleanup_old_logs(dir.path(), APP_LOG_RETENTION_DAYS).unwrap();
        assert_eq!(deleted, 1);
        assert!(!app_dir.join(&old_name).exists());
        assert!(app_dir.join(&new_name).exists());
        assert!(app_dir.join("notes.txt").exists());
        assert!(audit_dir.join(&audit_name).exists());
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("missing"), 14).unwrap(), 0);
    }
}
