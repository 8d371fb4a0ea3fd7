use crate::sink::{LogSink, SinkError};
use crate::stdout_sink::StdoutSink;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

/// Overall timeout of one POST.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for establishing the connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for [`RemoteSink`].
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Endpoint receiving one JSON record per POST. An empty URL disables
    /// the network copy.
    pub url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Error type returned when building a [`RemoteSink`].
#[derive(thiserror::Error, Debug)]
pub enum RemoteSinkError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start background runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Sink that writes every record locally and also POSTs a copy to an
/// HTTP endpoint.
///
/// The POST runs as a detached tokio task: `write` never waits for it and
/// its outcome is only reported through `tracing` warnings. Failed
/// deliveries are not retried.
pub struct RemoteSink {
    client: Client,
    url: String,
    local: Arc<dyn LogSink>,
    executor: Executor,
}

impl RemoteSink {
    /// Construct a sink that echoes records to standard output.
    ///
    /// When called inside a tokio runtime, POSTs are spawned onto that
    /// runtime; otherwise the sink starts its own single-worker runtime.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteSinkError> {
        Self::with_local(config, Arc::new(StdoutSink))
    }

    /// Construct a sink that writes the local copy to `local`.
    pub fn with_local(config: RemoteConfig, local: Arc<dyn LogSink>) -> Result<Self, RemoteSinkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(RemoteSink {
            client,
            url: config.url,
            local,
            executor: Executor::detect()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LogSink for RemoteSink {
    fn write(&self, payload: &[u8]) -> Result<usize, SinkError> {
        if !self.url.is_empty() {
            let request = self
                .client
                .post(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .body(payload.to_vec());
            let url = self.url.clone();

            self.executor.spawn(async move {
                match request.send().await {
                    Ok(resp) if resp.status().is_success() => {}
                    Ok(resp) => {
                        tracing::warn!(%url, status = %resp.status(), "remote log sink rejected record");
                    }
                    Err(err) => {
                        tracing::warn!(%url, error = %err, "remote log sink request failed");
                    }
                }
            });
        }

        self.local.write(payload)
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.local.flush()
    }
}

impl std::fmt::Debug for RemoteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSink").field("url", &self.url).finish_non_exhaustive()
    }
}

/// Where detached POSTs run.
enum Executor {
    Ambient(Handle),
    Owned(Option<Runtime>),
}

impl Executor {
    fn detect() -> Result<Self, std::io::Error> {
        match Handle::try_current() {
            Ok(handle) => Ok(Executor::Ambient(handle)),
            Err(_) => {
                let runtime = Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name("fieldlog-remote")
                    .enable_all()
                    .build()?;
                Ok(Executor::Owned(Some(runtime)))
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self {
            Executor::Ambient(handle) => {
                handle.spawn(task);
            }
            Executor::Owned(Some(runtime)) => {
                runtime.spawn(task);
            }
            Executor::Owned(None) => {}
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // A runtime cannot be dropped from async context; detach instead.
        if let Executor::Owned(runtime) = self {
            if let Some(runtime) = runtime.take() {
                runtime.shutdown_background();
            }
        }
    }
}
