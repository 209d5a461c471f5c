use core::fmt;
use std::fs::OpenOptions;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracingfmt};

#[macro_export]
macro_rules! unimplemented_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!(
            "unimplemented: {}",
            format_args!($($arg)*),
        );
    }};
}

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

/// Width of the channel column when no `ch` field is present
const CH_COLUMN: &str = "        ";

struct AlignedFormatter;

/// Visitor to extract the `ch` (channel name) field value
struct ChannelVisitor {
    ch: Option<String>,
}

impl tracing::field::Visit for ChannelVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "ch" {
            self.ch = Some(format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "ch" {
            self.ch = Some(value.to_string());
        }
    }
}

/// Transform a source path like "crates/p25-voice/src/framing/assembler.rs"
/// into "[voice/framing] assembler.rs"
fn format_source_path(file_path: &str) -> String {
    let Some(src_idx) = file_path.find("/src/") else {
        return file_path.to_string();
    };
    let before_src = &file_path[..src_idx];
    let after_src = &file_path[src_idx + 5..];

    let crate_name = if let Some(p25_idx) = before_src.rfind("p25-") {
        &before_src[p25_idx + 4..]
    } else {
        before_src.rsplit('/').next().unwrap_or("unknown")
    };

    if let Some(last_slash) = after_src.rfind('/') {
        let module_path = &after_src[..last_slash];
        let filename = &after_src[last_slash + 1..];
        let first_module = module_path.split('/').next().unwrap_or("");
        format!("[{}/{}] {}", crate_name, first_module, filename)
    } else {
        format!("[{}] {}", crate_name, after_src)
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: format::Writer<'_>, event: &tracing::Event<'_>) -> fmt::Result {
        let metadata = event.metadata();

        let mut visitor = ChannelVisitor { ch: None };
        event.record(&mut visitor);
        let has_ch = visitor.ch.is_some();
        let ch_str = visitor.ch.map(|c| format!("{:<8}", c)).unwrap_or_else(|| CH_COLUMN.to_string());

        let (color_level, color_reset) = match *metadata.level() {
            tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
            tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
            tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
            tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
            tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
        };

        // Format: "LEVEL ch [crate/module] file:line: message"
        let location = format!(
            "{}{:<5}{} {} {}:{}:",
            color_level,
            metadata.level(),
            color_reset,
            ch_str,
            format_source_path(metadata.file().unwrap_or("unknown")),
            metadata.line().unwrap_or(0)
        );

        let mut message_buf = String::new();
        let message_writer = format::Writer::new(&mut message_buf);
        ctx.field_format().format_fields(message_writer, event)?;

        // The channel already sits in its own column
        if has_ch {
            if let Some(ch_idx) = message_buf.find("ch=") {
                if let Some(space_idx) = message_buf[ch_idx..].find(' ') {
                    message_buf.replace_range(ch_idx..ch_idx + space_idx + 1, "");
                } else {
                    message_buf.truncate(ch_idx);
                }
            }
        }

        // Arrows mark tx/rx direction and get pulled left
        let mut padding = 64;
        if message_buf.starts_with("->") || message_buf.starts_with("<-") {
            padding -= 3;
        }

        write!(writer, "{:<width$} {}", location, message_buf, width = padding)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

fn directive(s: &'static str) -> Directive {
    s.parse().expect("static log directive must parse")
}

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_stdout_filter() -> EnvFilter {
    EnvFilter::new("info")
        // Per-codeword traffic is far too chatty for stdout
        .add_directive(directive("p25_voice::framing=info"))
        .add_directive(directive("p25_voice::crypto=info"))
        .add_directive(directive("p25_voice::codec=warn"))
        // Call lifecycle
        .add_directive(directive("p25_voice::channel=debug"))
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Sets up logging to stdout and optionally, a verbose log file
/// If an output file is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If no output file is provided, returns None.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = match OpenOptions::new().create(true).append(true).open(&outfile) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", outfile, e);
                return setup_logging(stdout_filter, None);
            }
        };
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(file_writer)
                .with_ansi(false);
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Some(guard)
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);
            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_source_path() {
        assert_eq!(
            format_source_path("crates/p25-voice/src/framing/assembler.rs"),
            "[voice/framing] assembler.rs"
        );
        assert_eq!(format_source_path("crates/p25-core/src/lfsr.rs"), "[core] lfsr.rs");
        assert_eq!(format_source_path("main.rs"), "main.rs");
    }

    #[test]
    fn test_default_filters_build() {
        let _ = get_default_stdout_filter();
        let _ = get_default_logfile_filter();
    }
}
