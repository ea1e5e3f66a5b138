//! Logger setup shared by the binaries.

use std::time::Instant;

use log::{info, LevelFilter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(#[from] log::SetLoggerError),
}

/// Install a stdout logger that prefixes each line with seconds since start.
///
/// Only the first call in a process succeeds.
pub fn logger_init(min_level: LevelFilter) -> Result<(), LoggerInitError> {
    let start = Instant::now();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let elapsed = start.elapsed().as_secs_f64();
            // Debug and trace lines carry their target
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:>10.3}s {}] {}: {}",
                    elapsed,
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{:>10.3}s {}] {}",
                    elapsed,
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(min_level)
        .chain(std::io::stdout())
        .apply()?;

    info!("Logging initialised at {:?}", min_level);
    Ok(())
}

fn level_to_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info => "INF",
        log::Level::Warn => "WRN",
        log::Level::Error => "ERR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        // Either this call installs the logger or another test already did
        let _ = logger_init(LevelFilter::Warn);
        assert!(logger_init(LevelFilter::Warn).is_err());
    }
}
