use chrono::SecondsFormat;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{
    fmt::format::{Format, Writer},
    EnvFilter,
};

/// RFC 3339 UTC timestamps, so lines from writers on different hosts sort together.
struct UtcTimer;

impl tracing_subscriber::fmt::time::FormatTime for UtcTimer {
    fn format_time(&self, writer: &mut Writer<'_>) -> std::fmt::Result {
        write!(writer, "{}", chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

/// `directives` in `RUST_LOG` syntax; unparsable entries are skipped.
fn build_filter(directives: &str, log_level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().parse_lossy(directives).add_directive(log_level.into())
}

/// Installs a global fmt subscriber. `RUST_LOG` directives are honoured on top of `log_level`.
///
/// Safe to call more than once, later calls are ignored.
pub fn setup_logger(log_level: LevelFilter) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = build_filter(&directives, log_level);

    let format = Format::default().with_timer(UtcTimer).with_level(true).with_target(true);

    let subscriber =
        tracing_subscriber::fmt().with_env_filter(filter).event_format(format).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Logger has already been set up, continuing...");
    }
}

pub fn setup_info_logger() {
    setup_logger(LevelFilter::INFO);
}
