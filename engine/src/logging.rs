//! Logging via the tracing crate.
//!
//! Every engine request runs inside an `execute` span carrying the request name, so a text line
//! reads `<time> DEBUG execute{request="delegate"}: [m:s:m:detail:42] locked multi-staking token`.

use std::{fmt, io};

use ansi_term::{Color, Style};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{Dispatch, Event, Level, Metadata, Subscriber};
use tracing_subscriber::{
    fmt::{
        format::{self, Writer},
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields, FormattedFields, MakeWriter,
    },
    prelude::*,
    registry::LookupSpan,
    EnvFilter,
};

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Output format for log.
    format: LoggingFormat,
    /// Abbreviate module names.
    ///
    /// If set, text output will abbreviate module names, `foo::bar::baz::bizz` will turn into
    /// `f:b:b:bizz`.
    abbreviate_modules: bool,
    /// Color levels and dim timestamps in text output.
    color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            format: LoggingFormat::default(),
            abbreviate_modules: false,
            color: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a logging config with colored text output.
    pub fn new(format: LoggingFormat, abbreviate_modules: bool) -> Self {
        LoggingConfig {
            format,
            abbreviate_modules,
            color: true,
        }
    }

    /// Enables or disables ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Logging output format.
///
/// Defaults to "text".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    /// Text format.
    #[default]
    Text,
    /// JSON format.
    Json,
}

/// Shortens all but the last segment of a module path to its first letter.
fn abbreviate_module(full_module_path: &str) -> String {
    // Up to six levels deep without allocating.
    let mut parts: SmallVec<[&str; 6]> = full_module_path.split("::").collect();
    let count = parts.len();
    for part in parts.iter_mut().take(count.saturating_sub(1)) {
        if let Some(first) = part.get(0..1) {
            *part = first;
        }
    }
    parts.join(":")
}

fn level_color(level: &Level) -> Color {
    match *level {
        Level::TRACE => Color::Purple,
        Level::DEBUG => Color::Blue,
        Level::INFO => Color::Green,
        Level::WARN => Color::Yellow,
        Level::ERROR => Color::Red,
    }
}

/// Text event format: timestamp, level, span scope, source location, then the event fields.
struct TextFormat {
    abbreviate_modules: bool,
}

impl TextFormat {
    fn location(&self, meta: &Metadata<'_>) -> String {
        let module = meta.module_path().unwrap_or_default();
        let line = meta.line().unwrap_or_default();
        if self.abbreviate_modules {
            return format!("{}:{}", abbreviate_module(module), line);
        }
        let file = meta
            .file()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default();
        format!("{} {}:{}", module, file, line)
    }
}

impl<S, N> FormatEvent<S, N> for TextFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let (dimmed, level_style) = if writer.has_ansi_escapes() {
            (Style::new().dimmed(), level_color(meta.level()).normal())
        } else {
            (Style::new(), Style::new())
        };

        write!(writer, "{}", dimmed.prefix())?;
        SystemTime.format_time(&mut writer)?;
        write!(
            writer,
            "{} {}{:<6}{}",
            dimmed.suffix(),
            level_style.prefix(),
            meta.level().to_string(),
            level_style.suffix()
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                if let Some(fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                writer.write_str(": ")?;
            }
        }

        write!(
            writer,
            "{}[{}]{} ",
            dimmed.prefix(),
            self.location(meta),
            dimmed.suffix()
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builds the dispatcher described by `config`, keeping what `filter` enables and writing through
/// `make_writer`.
pub fn dispatch<W>(config: &LoggingConfig, filter: EnvFilter, make_writer: W) -> Dispatch
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_writer(make_writer)
        .with_env_filter(filter);

    match config.format {
        LoggingFormat::Text => {
            let fields = format::debug_fn(|writer, field, value| {
                if field.name() == "message" {
                    write!(writer, "{:?}", value)
                } else {
                    write!(writer, "{}={:?}", field, value)
                }
            })
            .delimited("; ");
            Dispatch::new(
                builder
                    .with_ansi(config.color)
                    .fmt_fields(fields)
                    .event_format(TextFormat {
                        abbreviate_modules: config.abbreviate_modules,
                    })
                    .finish(),
            )
        }
        LoggingFormat::Json => Dispatch::new(
            builder
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        ),
    }
}

/// Installs the global logger, writing to `stdout` with filtering taken from `RUST_LOG`.
///
/// This function should only be called once during the lifetime of the application.
pub fn init_with_config(config: &LoggingConfig) -> anyhow::Result<()> {
    let dispatch = dispatch(config, EnvFilter::from_default_env(), io::stdout);
    tracing::dispatcher::set_global_default(dispatch)?;
    Ok(())
}
