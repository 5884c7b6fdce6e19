use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `level` for this binary and the core library
fn default_directives(level: &str) -> String {
    format!("insure={level},insure_core={level}")
}

/// Initialize logging.
///
/// Events go to stderr so stdout stays clean for reports (and `--json`).
/// With `log_file` set they are appended to that file instead, without
/// ANSI colours.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> color_eyre::Result<()> {
    // RUST_LOG wins over the command-line level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false);
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .wrap_err("failed to install the tracing subscriber")?;

    tracing::debug!(level, log_file = ?log_file, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(default_directives(level)).is_ok(), "{level}");
        }
    }
}
