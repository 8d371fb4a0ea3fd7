use std::sync::Arc;
use std::time::Instant;

use fieldlog::{Data, Level, Logger, MemorySink};

fn main() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::with_sink("load-demo", Level::Info, sink.clone());

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.with(Data::from([("iteration", i)])).error("load test error");
    }

    let elapsed = start.elapsed();
    println!("sent {} records in {:?} (~{:.0} rec/s), captured {}",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        sink.len()
    );
}
