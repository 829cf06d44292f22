// Copyright (c) 2026 rezky_nightky

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "nexusfolio.log";
const LOG_RETENTION_DAYS: u64 = 7;

pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NEXUSFOLIO_LOG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("nexusfolio").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn cleanup_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified < cutoff);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

pub fn init() {
    let filter = EnvFilter::try_from_env("NEXUSFOLIO_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!("warning: failed to create log directory {:?}: {}", log_path, e);
    }
    cleanup_old_logs(&log_path, LOG_RETENTION_DAYS);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&log_path, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_only_our_stale_files() {
        let tmp = std::env::temp_dir().join(format!("nexusfolio-logs-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&tmp);

        let ours = tmp.join("nexusfolio.log.2025-01-01");
        let other = tmp.join("other.txt");
        std::fs::write(&ours, "a").unwrap();
        std::fs::write(&other, "c").unwrap();

        cleanup_old_logs(&tmp, 0);
        assert!(!ours.exists());
        assert!(other.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
