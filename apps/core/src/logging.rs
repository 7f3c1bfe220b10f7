use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "powersearch.log";

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// `None` when a subscriber was already installed; the earlier guard still
/// owns the log file.
pub fn init(level: &str, dir: &Path) -> Result<Option<WorkerGuard>, std::io::Error> {
    fs::create_dir_all(dir)?;

    let filter = if level.trim().is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(level)
    };

    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok();

    install_panic_hook();
    if !installed {
        tracing::debug!("tracing subscriber already installed");
        return Ok(None);
    }
    Ok(Some(guard))
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(%location, %payload, "panic");
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::{init, logs_dir};

    #[test]
    fn logs_dir_uses_stable_app_data_layout() {
        let dir = logs_dir();
        assert!(dir
            .to_string_lossy()
            .to_ascii_lowercase()
            .contains("powersearch"));
    }

    #[test]
    fn second_init_returns_no_guard() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("logs");
        let _first = init("debug", &dir).unwrap();
        let second = init("debug", &dir).unwrap();
        assert!(dir.is_dir());
        assert!(second.is_none());
    }
}
