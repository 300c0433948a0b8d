use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::{format::Writer, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span field shown in its own column by the pretty formatter.
const COLLECTION_FIELD: &str = "collection";
const DEFAULT_FILTER: &str = "storefront=info";

/// Fields recorded on a span, stored in the span's extensions.
#[derive(Debug, Clone, Default)]
pub struct SpanFields {
    pub raw_fields: BTreeMap<String, String>,
}

impl SpanFields {
    fn collection(&self) -> Option<&str> {
        self.raw_fields.get(COLLECTION_FIELD).map(String::as_str)
    }
}

impl Visit for SpanFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.raw_fields.insert(field.name().to_string(), unquoted(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.raw_fields.insert(field.name().to_string(), value.to_string());
    }
}

/// Keeps every span's fields around so the formatters can print them with each event.
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut fields = SpanFields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &tracing::span::Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut extensions = span.extensions_mut();
        let mut fields = extensions.remove::<SpanFields>().unwrap_or_default();
        values.record(&mut fields);
        extensions.insert(fields);
    }
}

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";
const BRIGHT: &str = "\x1b[97m";
const COLUMN: &str = "\x1b[92m";
const TIMESTAMP: &str = "\x1b[96m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => DIM,
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    }
}

fn unquoted(value: &dyn std::fmt::Debug) -> String {
    format!("{:?}", value).trim_matches('"').to_string()
}

/// Console formatter: `time | level | collection | service | message (fields)`.
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let level = *event.metadata().level();

        let mut line = PrettyLine::default();
        event.record(&mut line);

        // the enclosing collection span wins over a `collection` field on the event
        let collection = ctx
            .lookup_current()
            .and_then(|span| span.extensions().get::<SpanFields>().and_then(|f| f.collection().map(str::to_string)))
            .or(line.collection)
            .unwrap_or_else(|| "-".to_string());

        let columns = [
            format!("{TIMESTAMP}{}{RESET}", Utc::now().format("%y-%m-%d %H:%M:%S")),
            format!("{}{:<5}{RESET}", level_color(&level), level),
            format!("{COLUMN}{:<12}{RESET}", collection),
            format!("{COLUMN}{:<8}{RESET}", extract_service_name(event.metadata().target())),
        ];
        for column in columns {
            write!(writer, "{} {DIM}|{RESET} ", column)?;
        }
        write!(writer, "{BRIGHT}{}{RESET}", line.message)?;

        if !line.fields.is_empty() {
            write!(writer, " ({})", line.fields.join(", "))?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct PrettyLine {
    message: String,
    fields: Vec<String>,
    collection: Option<String>,
}

impl Visit for PrettyLine {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = unquoted(value);
        match field.name() {
            "message" => self.message = value,
            COLLECTION_FIELD => self.collection = Some(value),
            name => self.fields.push(format!("{DIM}{}={}{RESET}", name, value)),
        }
    }
}

/// One JSON object per event, span fields merged under `fields`.
pub struct JsonEventFormatter;

#[derive(Default)]
struct JsonLine {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonLine {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(message)) => self.message = Some(message),
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for JsonLine {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(unquoted(value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }
}

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let mut line = JsonLine::default();
        event.record(&mut line);

        if let Some(span) = ctx.lookup_current() {
            line.fields.insert("span_name".to_string(), Value::from(span.metadata().name()));
            if let Some(span_fields) = span.extensions().get::<SpanFields>() {
                for (key, value) in &span_fields.raw_fields {
                    line.fields.entry(key.clone()).or_insert_with(|| Value::from(value.as_str()));
                }
            }
        }

        let mut record = Map::new();
        record.insert("timestamp".into(), Value::from(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)));
        record.insert("level".into(), Value::from(meta.level().as_str()));
        record.insert("target".into(), Value::from(meta.target()));
        record.insert("service".into(), Value::from(extract_service_name(meta.target())));
        if let Some(file) = meta.file() {
            record.insert("filename".into(), Value::from(file));
        }
        if let Some(line_number) = meta.line() {
            record.insert("line_number".into(), Value::from(line_number));
        }
        if let Some(message) = line.message {
            record.insert("message".into(), Value::from(message));
        }
        if !line.fields.is_empty() {
            record.insert("fields".into(), Value::Object(line.fields));
        }

        let encoded = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", encoded)
    }
}

/// Installs `color_eyre` and the global subscriber.
///
/// `LOG_FORMAT=json` selects [`JsonEventFormatter`], anything else [`PrettyFormatter`].
pub fn init_logging() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // `RUST_LOG` wins; fall back to the crate at info level
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder().with_default_directive(Level::INFO.into()).parse(DEFAULT_FILTER)?,
    };

    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false).with_file(true).with_line_number(true);
    let fmt_layer = if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        fmt_layer.event_format(JsonEventFormatter).boxed()
    } else {
        fmt_layer.event_format(PrettyFormatter).boxed()
    };

    let subscriber =
        Registry::default().with(env_filter).with(FieldCollectorLayer).with(fmt_layer).with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Maps module paths to short display names for the service column
fn extract_service_name(target: &str) -> &'static str {
    if target.starts_with("storefront::schema") {
        "SCHEMA"
    } else if target.starts_with("storefront::server") {
        "HTTP"
    } else if target.starts_with("storefront::core::client") {
        "STORE"
    } else if target.starts_with("storefront") {
        "-"
    } else {
        "EXTERNAL"
    }
}
