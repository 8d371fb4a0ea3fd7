use std::sync::Arc;
use tokio::time::{sleep, Duration};

use fieldlog::remote::{RemoteConfig, RemoteSink};
use fieldlog::setup::init_diagnostics;
use fieldlog::{error, Data, Level, Logger};

#[tokio::main]
async fn main() {
    init_diagnostics();

    // Example: LOG_SINK_URL=http://127.0.0.1:8080/logs
    let url = std::env::var("LOG_SINK_URL").unwrap_or_else(|_| "http://127.0.0.1:8080/logs".to_string());

    let sink = RemoteSink::new(RemoteConfig::new(url)).expect("build remote sink");
    let logger = Logger::with_sink("remote-demo", Level::Info, Arc::new(sink));

    logger.info("remote sink example started");
    error!(
        logger.with(Data::from([("order_id", 123)])),
        "order {} failed",
        123
    );

    // Give the detached POSTs time to finish.
    sleep(Duration::from_secs(2)).await;
}
