use std::sync::Arc;
use std::thread;

use fieldlog::{Data, Level, Logger, MemorySink};
use serde_json::json;

fn capture(level: Level) -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Logger::with_sink("orders", level, sink.clone()), sink)
}

#[test]
fn derived_loggers_do_not_touch_the_original() {
    let (logger, sink) = capture(Level::Info);

    logger.with(Data::from([("k", "v1")])).info("a");
    logger.with(Data::from([("k", "v2")])).info("b");

    let records = sink.records();
    assert_eq!(records[0]["msg"], "a");
    assert_eq!(records[0]["data"], json!({ "k": "v1" }));
    assert_eq!(records[1]["msg"], "b");
    assert_eq!(records[1]["data"], json!({ "k": "v2" }));
}

#[test]
fn chained_with_accumulates_repeated_keys() {
    let (logger, sink) = capture(Level::Info);

    logger
        .with(Data::from([("k", "v1")]))
        .with(Data::from([("k", "v2")]))
        .info("chained");

    assert_eq!(sink.records()[0]["data"], json!({ "k": ["v1", "v2"] }));
}

#[test]
fn repeated_key_extends_a_caller_supplied_array() {
    let (logger, sink) = capture(Level::Info);

    logger
        .with(Data::from([("tags", json!(["a", "b"]))]))
        .with(Data::from([("tags", json!("c"))]))
        .info("tagged");

    assert_eq!(sink.records()[0]["data"], json!({ "tags": ["a", "b", "c"] }));
}

#[test]
fn fields_are_consumed_by_exactly_one_record() {
    let (logger, sink) = capture(Level::Debug);
    let scoped = logger.with(Data::new().with("request_id", "r-1").with("attempt", 2));

    scoped.info("first");
    scoped.info("second");

    let records = sink.records();
    assert_eq!(records[0]["data"], json!({ "request_id": "r-1", "attempt": 2 }));
    assert!(records[1].get("data").is_none());
    assert!(scoped.pending_fields().is_empty());
}

#[test]
fn gated_call_drops_pending_fields() {
    let (logger, sink) = capture(Level::Warning);
    let scoped = logger.with(Data::from([("user", 1)]));

    scoped.debug("hidden");
    scoped.error("visible");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "error");
    assert!(records[0].get("data").is_none());
}

#[test]
fn every_severity_method_uses_its_label() {
    let (logger, sink) = capture(Level::Debug);
    logger.debug("m");
    logger.info("m");
    logger.notice("m");
    logger.warn("m");
    logger.error("m");
    logger.critical("m");
    logger.alert("m");
    logger.emergency("m");

    let labels: Vec<String> = sink
        .records()
        .iter()
        .map(|r| r["level"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        labels,
        ["debug", "info", "notice", "warning", "error", "critical", "alert", "emergency"]
    );
}

#[test]
fn macros_format_and_report_call_site() {
    let (logger, sink) = capture(Level::Debug);
    let line = line!() + 1;
    fieldlog::notice!(logger, "user {} logged in after {:.1}s", "ada", 1.5);

    let record = &sink.records()[0];
    assert_eq!(record["msg"], "user ada logged in after 1.5s");
    assert_eq!(record["Src"]["file"], "tests/logger.rs");
    assert_eq!(record["Src"]["line"], line);
}

#[test]
fn method_call_site_is_the_caller() {
    let (logger, sink) = capture(Level::Debug);
    let line = line!() + 1;
    logger.critical("boom");

    let record = &sink.records()[0];
    assert_eq!(record["Src"], json!({ "file": "tests/logger.rs", "line": line }));
}

#[test]
fn concurrent_calls_never_share_a_field_snapshot() {
    let (logger, sink) = capture(Level::Debug);
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..50 {
                    logger
                        .with(Data::new().with("worker", worker).with("i", i))
                        .info("tick");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let records = sink.records();
    assert_eq!(records.len(), 400);
    for record in records {
        assert!(record["data"]["worker"].is_number());
        assert!(record["data"]["i"].is_number());
    }
}

#[test]
fn shared_logger_drains_once_under_contention() {
    let (root, sink) = capture(Level::Debug);
    let scoped = Arc::new(root.with(Data::from([("once", true)])));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scoped = Arc::clone(&scoped);
            thread::spawn(move || scoped.info("race"))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let with_data = sink
        .records()
        .iter()
        .filter(|r| r.get("data").is_some())
        .count();
    assert_eq!(with_data, 1);
}
