use {
    anyhow::Result,
    std::{
        fs::File,
        path::Path,
        sync::Arc,
    },
    tracing::Level,
    tracing_subscriber::{
        filter::Targets,
        fmt::layer,
        layer::SubscriberExt,
        util::SubscriberInitExt,
        Layer,
    },
};

/// Where `--log-file` points unless told otherwise.
pub const DEFAULT_LOG_FILE: &str = "tennis_rl.log";

/// Only events from this crate (and the binary, which shares its name) get
/// through. candle, polars and pyo3 stay quiet.
const LOG_TARGET: &str = "tennis_rl";

fn targets(level: Option<Level>) -> Targets {
    Targets::new().with_target(LOG_TARGET, level.unwrap_or(Level::INFO))
}

/// Log to `path` (without colors) and to stdout, each with its own minimum
/// level. `None` means [`Level::INFO`].
pub fn setup_logging(
    path: &dyn AsRef<Path>,
    min_level_file: Option<Level>,
    min_level_stdout: Option<Level>,
) -> Result<()> {
    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::registry()
        // File writer
        .with(
            layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_filter(targets(min_level_file)),
        )
        // Stdout writer
        .with(
            layer()
                .with_writer(std::io::stdout)
                .compact()
                .pretty()
                .with_line_number(true)
                .with_thread_ids(false)
                .with_target(false)
                .with_filter(targets(min_level_stdout)),
        )
        // Create and set Subscriber
        .try_init()?;

    Ok(())
}
