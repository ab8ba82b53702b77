//! Structured logging.
//!
//! # Responsibilities
//! - Build an explicit [`Logger`] handle from a level and a sink
//! - Render events as one JSON object per line
//! - Resolve level names from configuration

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

const MESSAGE_KEY: &str = "msg";
const LEVEL_KEY: &str = "level";
const TIME_KEY: &str = "time";

/// A cloneable handle to a configured log pipeline.
///
/// Components that log receive a `Logger` instead of relying on the global
/// dispatcher, so each one can be exercised against its own sink.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Build a JSON line logger writing to `make_writer`.
    pub fn new<W>(level: LevelFilter, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(make_writer)
            .event_format(JsonLineFormat)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Build a JSON line logger writing to stdout.
    pub fn stdout(level: LevelFilter) -> Self {
        Self::new(level, std::io::stdout)
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Install this logger as the process-wide default.
    pub fn install_global(&self) -> Result<(), tracing::dispatcher::SetGlobalDefaultError> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Parse a level name. `fatal` and `panic` are accepted as `error`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "panic" | "fatal" | "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Parse a level name, falling back to `info`.
pub fn level_or_default(name: &str) -> LevelFilter {
    parse_level(name).unwrap_or(LevelFilter::INFO)
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warning",
        Level::ERROR => "error",
    }
}

/// Event formatter producing `{"level":..,"msg":..,"time":..,<fields>}` lines.
///
/// Keys are sorted. Event fields that collide with the reserved keys are
/// written as `fields.<name>`. Span context is not rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineFormat;

impl<S, N> FormatEvent<S, N> for JsonLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = visitor.fields;
        record.insert(
            MESSAGE_KEY.to_string(),
            Value::String(visitor.message.unwrap_or_default()),
        );
        record.insert(
            LEVEL_KEY.to_string(),
            Value::from(level_name(event.metadata().level())),
        );
        record.insert(
            TIME_KEY.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
            return;
        }
        let key = match name {
            MESSAGE_KEY | LEVEL_KEY | TIME_KEY => format!("fields.{name}"),
            _ => name.to_string(),
        };
        self.fields.insert(key, value);
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}
