//! Logging Infrastructure
//!
//! Console logs go to stderr so they do not interleave with the operator
//! prompt. With a log directory, logs go to a daily rolling file instead.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `log_level` when set.
pub fn init_logger(log_level: &str, json: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let writer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "loyalty-pos"))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .with_ansi(log_dir.is_none())
        .with_writer(writer);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
