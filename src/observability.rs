// In: src/observability.rs

//! Opt-in diagnostic logging for embedding applications.
//!
//! The codecs log through the `log` facade and stay silent unless the host
//! installs a logger. `enable_verbose_logging` wires up a simple `env_logger`
//! backend for hosts that do not bring their own.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide `env_logger` backend at `Info` level.
///
/// Safe to call more than once; only the first call installs anything, and a
/// logger installed by the host beforehand wins. When `log_file` is given the
/// output is appended there instead of stderr.
pub fn enable_verbose_logging(log_file: Option<&str>) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Custom formatter: just print the level and message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(filename) = log_file {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(filename)
                .expect("Could not open log file in append mode");
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
}
