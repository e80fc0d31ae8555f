use std::{path::Path, sync::LazyLock};

use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Log file prefix for one-shot commands.
pub const CLI_PREFIX: &str = "cli";
/// Log file prefix for runs that track usage.
pub const TRACKER_PREFIX: &str = "tracker";

const DEFAULT_LEVEL: &str = "info";
const KEPT_LOG_FILES: usize = 7;

/// A bare level applies to this crate only, full directives from `RUST_LOG` are kept as given.
fn filter_directive(log_level: Option<LevelFilter>, rust_log: Option<String>) -> String {
    let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
    match (log_level, rust_log) {
        (Some(level), _) => format!("{crate_name}={level}"),
        (None, Some(directive)) if directive.contains('=') => directive,
        (None, Some(level)) if !level.trim().is_empty() => format!("{crate_name}={}", level.trim()),
        _ => format!("{crate_name}={DEFAULT_LEVEL}"),
    }
}

fn crate_filter(log_level: Option<LevelFilter>) -> EnvFilter {
    EnvFilter::new(filter_directive(log_level, std::env::var("RUST_LOG").ok()))
}

/// Logs into `<application_data_path>/logs/<prefix>.<date>`, rotated daily. With `show_std` the
/// same events are mirrored to stderr, stdout belongs to the interactive session.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(appender);

    let console_layer = show_std.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(crate_filter(log_level))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber {e}"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .compact()
        .try_init();
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::filter_directive;

    #[test]
    fn bare_levels_are_scoped_to_the_crate() {
        assert_eq!(filter_directive(None, None), "tesseract=info");
        assert_eq!(filter_directive(None, Some("warn".into())), "tesseract=warn");
        assert_eq!(
            filter_directive(Some(LevelFilter::TRACE), Some("warn".into())),
            "tesseract=trace"
        );
    }

    #[test]
    fn full_directives_are_kept() {
        assert_eq!(
            filter_directive(None, Some("tesseract=debug".into())),
            "tesseract=debug"
        );
        assert_eq!(
            filter_directive(None, Some("tesseract::daemon=trace,info".into())),
            "tesseract::daemon=trace,info"
        );
    }
}
