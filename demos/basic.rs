use fieldlog::{info, setup_logger, Data};

fn main() {
    // LOG_LEVEL=debug cargo run --example basic
    let logger = setup_logger("basic-demo", "dev");

    info!(logger, "service started on port {}", 8080);

    let request = logger.with(Data::new().with("request_id", "a1b2").with("user_id", 42));
    request.notice("authentication succeeded");

    // Fields were consumed by the previous record.
    request.notice("follow-up without fields");

    logger
        .with(Data::from([("retry", 1)]))
        .with(Data::from([("retry", 2)]))
        .warn("upstream retried");

    logger.debug("only visible with LOG_LEVEL=debug");
}
