//! Diagnostics for the `log` crate.
//!
//! [`LensLogger`] writes one line per record to stderr (or any writer),
//! with an optional timestamp and a colored level column. Scan output goes
//! to stdout, so diagnostics never mix into it.
//!
//! A tracing layer with the same formatting is available as
//! `LensTracingLayer` when the `tracing` feature is enabled.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{OffsetDateTime, format_description::OwnedFormatItem};

use crate::sync::lock_recover;

type Sink = Box<dyn Write + Send>;

/// Line-oriented logger for the `log` crate.
///
/// `LensLogger` is `Sync`; the sink and the last-printed timestamp sit behind
/// mutexes with poison recovery, so concurrent records never interleave
/// within a line.
pub struct LensLogger {
    level: LevelFilter,
    show_time: bool,
    omit_repeated_times: bool,
    show_level: bool,
    show_target: bool,
    color: bool,
    time_format: OwnedFormatItem,
    last_time: Mutex<Option<String>>,
    sink: Mutex<Sink>,
}

impl Default for LensLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl LensLogger {
    /// Logger writing to stderr at `Warn`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Logger writing to `writer`.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        let time_format = time::format_description::parse_owned::<2>("[hour]:[minute]:[second]")
            .unwrap_or_else(|_| OwnedFormatItem::Compound(Box::default()));
        Self {
            level: LevelFilter::Warn,
            show_time: true,
            omit_repeated_times: true,
            show_level: true,
            show_target: false,
            color: false,
            time_format,
            last_time: Mutex::new(None),
            sink: Mutex::new(Box::new(writer)),
        }
    }

    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Blank out a timestamp equal to the previous one.
    #[must_use]
    pub fn omit_repeated_times(mut self, omit: bool) -> Self {
        self.omit_repeated_times = omit;
        self
    }

    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    /// Append the record's target (module path) to each line.
    #[must_use]
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Color the level column with ANSI escapes.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Override the time format (`time` crate v2 description syntax).
    /// An unparsable description keeps the current format.
    #[must_use]
    pub fn time_format(mut self, format: &str) -> Self {
        if let Ok(parsed) = time::format_description::parse_owned::<2>(format) {
            self.time_format = parsed;
        }
        self
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn format_time(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format)
            .unwrap_or_else(|_| now.to_string())
    }

    fn level_style(level: Level) -> ContentStyle {
        let (color, attributes) = match level {
            Level::Trace => (None, Attributes::from(Attribute::Dim)),
            Level::Debug => (Some(Color::Blue), Attributes::from(Attribute::Dim)),
            Level::Info => (Some(Color::Green), Attributes::default()),
            Level::Warn => (Some(Color::Yellow), Attributes::default()),
            Level::Error => (Some(Color::Red), Attributes::from(Attribute::Bold)),
        };
        ContentStyle {
            foreground_color: color,
            attributes,
            ..ContentStyle::default()
        }
    }

    fn format_record(&self, record: &Record<'_>) -> String {
        let mut line = String::new();

        if self.show_time {
            let time_str = self.format_time();
            let display = if self.omit_repeated_times {
                let mut last = lock_recover(&self.last_time);
                if last.as_ref() == Some(&time_str) {
                    " ".repeat(time_str.len())
                } else {
                    *last = Some(time_str.clone());
                    time_str
                }
            } else {
                time_str
            };
            line.push_str(&display);
            line.push(' ');
        }

        if self.show_level {
            let padded = format!("{:<5}", record.level());
            if self.color {
                line.push_str(&Self::level_style(record.level()).apply(padded).to_string());
            } else {
                line.push_str(&padded);
            }
            line.push(' ');
        }

        line.push_str(&record.args().to_string());

        if self.show_target && !record.target().is_empty() {
            line.push_str(" [");
            line.push_str(record.target());
            line.push(']');
        }

        line
    }

    fn write_line(&self, line: &str) {
        let mut sink = lock_recover(&self.sink);
        // A failing diagnostics sink has nowhere to report to.
        let _ = writeln!(sink, "{line}");
    }
}

impl Log for LensLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_record(record);
        self.write_line(&line);
    }

    fn flush(&self) {
        let _ = lock_recover(&self.sink).flush();
    }
}

#[cfg(feature = "tracing")]
mod tracing_integration {
    use super::LensLogger;
    use log::Level;
    use std::fmt::Debug;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level as TracingLevel, Subscriber};
    use tracing_subscriber::{Layer, layer::Context};

    /// Tracing layer that formats events like [`LensLogger`].
    pub struct LensTracingLayer {
        logger: LensLogger,
    }

    impl Default for LensTracingLayer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LensTracingLayer {
        #[must_use]
        pub fn new() -> Self {
            Self {
                logger: LensLogger::new(),
            }
        }

        /// Use an existing logger configuration.
        #[must_use]
        pub fn with_logger(logger: LensLogger) -> Self {
            Self { logger }
        }

        /// Install as the global tracing subscriber.
        ///
        /// # Errors
        ///
        /// Fails if a global subscriber is already set.
        pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
            use tracing_subscriber::prelude::*;

            let subscriber = tracing_subscriber::registry().with(self);
            tracing::subscriber::set_global_default(subscriber)
        }
    }

    #[derive(Default)]
    struct EventVisitor {
        message: Option<String>,
        fields: Vec<(String, String)>,
    }

    impl Visit for EventVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            let rendered = format!("{value:?}");
            let rendered = strip_quotes(&rendered).to_string();
            if field.name() == "message" {
                self.message = Some(rendered);
            } else {
                self.fields.push((field.name().to_string(), rendered));
            }
        }
    }

    impl<S> Layer<S> for LensTracingLayer
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let level = map_tracing_level(*metadata.level());
            if level > self.logger.level {
                return;
            }

            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);

            let mut message = visitor.message.unwrap_or_default();
            if !visitor.fields.is_empty() {
                let extra = visitor
                    .fields
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                if message.is_empty() {
                    message = extra;
                } else {
                    message.push(' ');
                    message.push_str(&extra);
                }
            }

            let message_ref = message.as_str();
            let args = format_args!("{message_ref}");
            let record = log::Record::builder()
                .args(args)
                .level(level)
                .target(metadata.target())
                .file(metadata.file())
                .line(metadata.line())
                .module_path(metadata.module_path())
                .build();

            let line = self.logger.format_record(&record);
            self.logger.write_line(&line);
        }
    }

    fn map_tracing_level(level: TracingLevel) -> Level {
        match level {
            TracingLevel::TRACE => Level::Trace,
            TracingLevel::DEBUG => Level::Debug,
            TracingLevel::INFO => Level::Info,
            TracingLevel::WARN => Level::Warn,
            TracingLevel::ERROR => Level::Error,
        }
    }

    fn strip_quotes(value: &str) -> &str {
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            &value[1..value.len() - 1]
        } else {
            value
        }
    }

}

#[cfg(feature = "tracing")]
pub use tracing_integration::LensTracingLayer;
