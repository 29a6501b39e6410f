use std::fs::File;
use std::io;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Sends diagnostics to `log_file` when one is configured. Without it nothing is installed, so the
/// terminal UI is never written to.
pub fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
