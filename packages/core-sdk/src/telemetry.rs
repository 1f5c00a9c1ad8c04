use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::TelemetryConfig;

const LOG_FILE: &str = "stackrelay.log";

/** \brief Keeps the file writer flushing until the process exits. */
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/**
 * \brief Installs the global tracing subscriber.
 *
 * Events go to stdout, and are also appended to `<log_dir>/stackrelay.log`
 * when a log directory is configured. `RUST_LOG` overrides the `info` default.
 */
pub fn init(config: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(false);

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create log dir {} failed", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            FILE_GUARD
                .set(guard)
                .map_err(|_| anyhow!("telemetry already initialized"))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_timer(UtcTime::new(Rfc3339))
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber failed")?;
    Ok(())
}
