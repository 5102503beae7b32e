use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives for a `-v` count; `RUST_LOG` wins when set
fn filter_for(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let directives = match verbose_level {
        0 => "warn",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn,reqwest=info",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal())
}

/// Split `logs/watchcraft.log` into the directory and the rotation prefix `watchcraft`
fn rotation_target(log_path: &Path) -> Result<(PathBuf, String)> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;
    let prefix = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name);
    Ok((log_dir, prefix.to_string()))
}

pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let registry = Registry::default().with(filter_for(verbose_level, quiet));
    let json = json_requested();

    if let Some(log_path) = log_file {
        let (log_dir, prefix) = rotation_target(&log_path)?;
        std::fs::create_dir_all(&log_dir)?;
        // watchcraft.log.2026-10-19, one file per day
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, prefix);

        if json {
            registry
                .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender))
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(appender),
                )
                .init();
        }
    } else if json {
        registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_target_strips_extension() {
        let (dir, prefix) = rotation_target(Path::new("/var/log/watchcraft/watchcraft.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/watchcraft"));
        assert_eq!(prefix, "watchcraft");
    }

    #[test]
    fn test_rotation_target_bare_file_name() {
        let (dir, prefix) = rotation_target(Path::new("session")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(prefix, "session");
    }
}
