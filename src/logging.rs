// src/logging.rs

use color_eyre::eyre::{Result, WrapErr};
use lazy_static::lazy_static;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{get_data_dir, LogConfig, LogSink};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Resolves the filter directive: `RUST_LOG`, then `NETPROBE_LOGLEVEL`, then the config.
fn filter_directive(config: &LogConfig) -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), config.level))
}

/// Installs the global subscriber for the sink and verbosity in `config`.
///
/// Called once by the binary at startup; the orchestrator itself never touches it.
pub fn initialize_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::new(filter_directive(config));
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    match config.sink {
        LogSink::Stderr => {
            let stderr_subscriber = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(timer)
                .with_target(false)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(stderr_subscriber)
                .with(ErrorLayer::default())
                .try_init()?;
        }
        LogSink::File => {
            let log_path = match &config.file {
                Some(path) => path.clone(),
                None => get_data_dir().join(LOG_FILE.clone()),
            };
            if let Some(directory) = log_path.parent() {
                std::fs::create_dir_all(directory).wrap_err_with(|| {
                    format!("Unable to create log directory {}", directory.display())
                })?;
            }
            let log_file = std::fs::File::create(&log_path)
                .wrap_err_with(|| format!("Unable to create log file {}", log_path.display()))?;

            let file_subscriber = tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_timer(timer)
                .with_target(false)
                .with_ansi(false)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(file_subscriber)
                .with(ErrorLayer::default())
                .try_init()?;
        }
    }

    Ok(())
}
