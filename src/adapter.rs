//! Access-log format for HTTP middleware.
//!
//! [`AccessLog`] produces a JSON line template in the same shape as the
//! logger's own records. A middleware fills the `${...}` placeholders per
//! request, either itself or through [`AccessLog::render`].
//!
//! The `src` location is captured once, where the adapter is built, so
//! every access line reports that same file and line.

use crate::logger::Logger;
use crate::record::Src;
use crate::sink::LogSink;
use chrono::{DateTime, SecondsFormat, Utc};
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

pub const TIME_RFC3339: &str = "time_rfc3339";
pub const METHOD: &str = "method";
pub const REMOTE_IP: &str = "remote_ip";
pub const URI: &str = "uri";
pub const STATUS: &str = "status";
pub const LATENCY_HUMAN: &str = "latency_human";

/// Per-request values substituted into the template.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    pub time: DateTime<Utc>,
    pub method: String,
    pub remote_ip: String,
    pub uri: String,
    pub status: u16,
    pub latency: Duration,
}

impl AccessEntry {
    /// Entry stamped with the current time.
    pub fn new(
        method: impl Into<String>,
        remote_ip: impl Into<String>,
        uri: impl Into<String>,
        status: u16,
        latency: Duration,
    ) -> Self {
        AccessEntry {
            time: Utc::now(),
            method: method.into(),
            remote_ip: remote_ip.into(),
            uri: uri.into(),
            status,
            latency,
        }
    }
}

/// Access-log template bound to a logger's name and sink.
pub struct AccessLog {
    template: String,
    sink: Arc<dyn LogSink>,
}

impl AccessLog {
    #[track_caller]
    pub fn for_logger(logger: &Logger) -> Self {
        let src = Src::from_location(Location::caller());
        let template = format!(
            concat!(
                r#"{{"time":"${{{time}}}","app":"{app}","level":"info","msg":"${{{method}}}","#,
                r#""data":{{"remote":"${{{remote}}}","uri":"${{{uri}}}","status":${{{status}}},"#,
                r#""latency":"${{{latency}}}"}},"src":{{"file":"{file}","line":{line}}}}}"#,
            ),
            time = TIME_RFC3339,
            app = escape(logger.app_name()),
            method = METHOD,
            remote = REMOTE_IP,
            uri = URI,
            status = STATUS,
            latency = LATENCY_HUMAN,
            file = escape(&src.file),
            line = src.line,
        );

        AccessLog {
            template,
            sink: logger.sink(),
        }
    }

    /// The format string handed to a middleware.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Output the middleware should write rendered lines to.
    pub fn sink(&self) -> Arc<dyn LogSink> {
        Arc::clone(&self.sink)
    }

    /// Substitute every known placeholder in one pass. Unknown
    /// placeholders are kept as-is.
    pub fn render(&self, entry: &AccessEntry) -> String {
        let mut out = String::with_capacity(self.template.len() + 64);
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let tail = &rest[start + 2..];
            let Some(end) = tail.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let tag = &tail[..end];
            match tag {
                TIME_RFC3339 => out.push_str(&entry.time.to_rfc3339_opts(SecondsFormat::Secs, true)),
                METHOD => out.push_str(&escape(&entry.method)),
                REMOTE_IP => out.push_str(&escape(&entry.remote_ip)),
                URI => out.push_str(&escape(&entry.uri)),
                STATUS => out.push_str(&entry.status.to_string()),
                LATENCY_HUMAN => out.push_str(&format!("{:?}", entry.latency)),
                _ => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &tail[end + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Render `entry` and write it to the sink. Write errors are dropped.
    pub fn log(&self, entry: &AccessEntry) {
        let _ = self.sink.write(self.render(entry).as_bytes());
    }
}

/// JSON string escaping without the surrounding quotes.
fn escape(value: &str) -> String {
    let quoted = serde_json::Value::from(value).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::memory_sink::MemorySink;
    use chrono::TimeZone;
    use serde_json::json;

    fn entry() -> AccessEntry {
        AccessEntry {
            time: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            method: "GET".into(),
            remote_ip: "10.0.0.1".into(),
            uri: "/users?id=1".into(),
            status: 404,
            latency: Duration::from_micros(1500),
        }
    }

    #[test]
    fn template_carries_app_and_call_site() {
        let logger = Logger::new("shop", Level::Info);
        let line = line!() + 1;
        let access = AccessLog::for_logger(&logger);

        let expected = format!(
            "{{\"time\":\"${{time_rfc3339}}\",\"app\":\"shop\",\"level\":\"info\",\"msg\":\"${{method}}\",\
             \"data\":{{\"remote\":\"${{remote_ip}}\",\"uri\":\"${{uri}}\",\"status\":${{status}},\
             \"latency\":\"${{latency_human}}\"}},\"src\":{{\"file\":\"src/adapter.rs\",\"line\":{line}}}}}"
        );
        assert_eq!(access.template(), expected);
    }

    #[test]
    fn rendered_line_is_valid_json() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::with_sink("shop", Level::Info, sink.clone());
        let access = AccessLog::for_logger(&logger);

        access.log(&entry());

        let record = &sink.records()[0];
        assert_eq!(record["time"], "2024-01-02T03:04:05Z");
        assert_eq!(record["app"], "shop");
        assert_eq!(record["msg"], "GET");
        assert_eq!(
            record["data"],
            json!({ "remote": "10.0.0.1", "uri": "/users?id=1", "status": 404, "latency": "1.5ms" })
        );
        assert_eq!(record["src"]["file"], "src/adapter.rs");
    }

    #[test]
    fn values_are_escaped_and_not_re_expanded() {
        let logger = Logger::new("a\"b", Level::Info);
        let access = AccessLog::for_logger(&logger);
        let mut e = entry();
        e.uri = "/x\"${status}".into();

        let value: serde_json::Value = serde_json::from_str(&access.render(&e)).unwrap();
        assert_eq!(value["app"], "a\"b");
        assert_eq!(value["data"]["uri"], "/x\"${status}");
    }

    #[test]
    fn unknown_placeholders_survive() {
        let logger = Logger::new("svc", Level::Info);
        let mut access = AccessLog::for_logger(&logger);
        access.template = "${method} ${bogus} ${status".into();
        assert_eq!(access.render(&entry()), "GET ${bogus} ${status");
    }
}
