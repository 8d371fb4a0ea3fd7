use std::time::Duration;

use fieldlog::{AccessEntry, AccessLog, Level, Logger};

fn main() {
    let logger = Logger::new("access-demo", Level::Info);
    let access = AccessLog::for_logger(&logger);

    println!("middleware format: {}", access.template());

    access.log(&AccessEntry::new("GET", "127.0.0.1", "/health", 200, Duration::from_micros(420)));
    access.log(&AccessEntry::new("POST", "10.1.2.3", "/orders", 201, Duration::from_millis(38)));
}
