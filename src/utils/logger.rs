use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Parses a `logging.level` value. Accepts trace, debug, info, warn, error.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

#[derive(Default)]
struct JsonFieldVisitor {
    fields: Map<String, Value>,
}

impl Visit for JsonFieldVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

/// Writes one OTel log-data-model JSON object per event.
#[derive(Clone)]
struct OtelJsonEventFormatter {
    service_name: String,
    service_version: String,
}

fn severity_number(level: &Level) -> u64 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

impl OtelJsonEventFormatter {
    fn to_record(&self, event: &Event<'_>) -> Value {
        let metadata = event.metadata();
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let mut attributes = visitor.fields;
        let body = attributes
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| metadata.name().to_string());

        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".to_string(), file.into());
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".to_string(), line.into());
        }
        attributes.insert("code.target".to_string(), metadata.target().into());

        json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "severity_text": metadata.level().as_str(),
            "severity_number": severity_number(metadata.level()),
            "body": body,
            "resource": {
                "service.name": self.service_name,
                "service.version": self.service_version,
            },
            "attributes": attributes,
        })
    }
}

impl<S, N> FormatEvent<S, N> for OtelJsonEventFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let serialized =
            serde_json::to_string(&self.to_record(event)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", serialized)
    }
}

/// Installs the global tracing subscriber described by `logging_config`.
///
/// `RUST_LOG` directives are honoured on top of the configured level.
/// Unknown formats fall back to console output.
pub fn init_logging(logging_config: &LoggingConfig) {
    let level_filter = parse_level(&logging_config.level).unwrap_or(LevelFilter::INFO);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    match logging_config.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().event_format(OtelJsonEventFormatter {
                    service_name: logging_config.service_name.clone(),
                    service_version: logging_config.service_version.clone(),
                }))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::WARN));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_json_formatter_emits_otel_record() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .event_format(OtelJsonEventFormatter {
                    service_name: "sessiontron".to_string(),
                    service_version: "0.1.0".to_string(),
                })
                .with_writer(move || sink.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(operation = "load", "Session store failed");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let record: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(record["severity_text"], "WARN");
        assert_eq!(record["severity_number"], 13);
        assert_eq!(record["body"], "Session store failed");
        assert_eq!(record["resource"]["service.name"], "sessiontron");
        assert_eq!(record["attributes"]["operation"], "load");
    }
}
