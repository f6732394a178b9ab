//! Process runner with graceful shutdown.
//!
//! A [`Runner`] owns a set of named app processes and closers:
//! - app processes run concurrently, each receiving a [`CancellationToken`]
//! - SIGINT/SIGTERM or the first failing process cancels the token
//! - closers run afterwards, bounded by a timeout, whatever the outcome
//!
//! # Example
//!
//! ```no_run
//! use adapter_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_named_process("ticker", |ctx| async move {
//!             ctx.cancelled().await;
//!             Ok(())
//!         })
//!         .with_closer(|| async move { Ok(()) })
//!         .with_closer_timeout(Duration::from_secs(5))
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

type BoxedFuture = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

/// A long-running process; resolves when cancelled or on failure.
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxedFuture + Send>;

/// Cleanup executed after every app process has stopped.
pub type Closer = Box<dyn FnOnce() -> BoxedFuture + Send>;

struct NamedProcess {
    name: String,
    process: AppProcess,
}

pub struct Runner {
    processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a runner with no processes and a 10 second closer timeout.
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds an app process. The name only appears in logs.
    pub fn with_named_process<F, Fut>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.processes.push(NamedProcess {
            name: name.into(),
            process: Box::new(|token| Box::pin(process(token))),
        });
        self
    }

    /// Adds a closer. Closers run concurrently and a failing closer does not
    /// stop the others.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Runs until every process stops, then runs closers and exits the
    /// process: code 1 if an app process failed, 0 otherwise.
    pub async fn run(self) {
        let failed = Self::run_processes(self.processes, self.cancellation_token).await;

        if !self.closers.is_empty() {
            tracing::info!(timeout = ?self.closer_timeout, "Running closers");
            match tokio::time::timeout(self.closer_timeout, Self::run_closers(self.closers)).await {
                Ok(()) => tracing::info!("All closers completed"),
                Err(_) => tracing::error!(timeout = ?self.closer_timeout, "Closers timed out"),
            }
        }

        if failed {
            tracing::error!("Application exiting with error");
            std::process::exit(1);
        }
        tracing::info!("Application exiting normally");
        std::process::exit(0);
    }

    /// Returns true when a process failed or panicked before shutdown began.
    async fn run_processes(processes: Vec<NamedProcess>, token: CancellationToken) -> bool {
        let mut join_set = JoinSet::new();
        for NamedProcess { name, process } in processes {
            let process_token = token.clone();
            join_set.spawn(async move { (name, process(process_token).await) });
        }

        Self::spawn_signal_handlers(token.clone());

        let mut failed = false;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    tracing::info!(process = %name, "App process stopped");
                }
                Ok((name, Err(err))) => {
                    if !token.is_cancelled() {
                        tracing::error!(process = %name, "App process error: {:#}", err);
                        failed = true;
                    }
                }
                Err(err) => {
                    tracing::error!("App process panicked: {}", err);
                    failed = true;
                }
            }
            // One process ending brings the rest down
            token.cancel();
        }

        failed
    }

    fn spawn_signal_handlers(token: CancellationToken) {
        let ctrl_c_token = token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received shutdown signal");
                    ctrl_c_token.cancel();
                }
                Err(err) => tracing::error!("Error setting up signal handler: {}", err),
            }
        });

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    tracing::info!("Received SIGTERM signal");
                    token.cancel();
                }
                Err(err) => tracing::error!("Error setting up SIGTERM handler: {}", err),
            }
        });
    }

    async fn run_closers(closers: Vec<Closer>) {
        let mut closer_set = JoinSet::new();
        for closer in closers {
            closer_set.spawn(closer());
        }

        while let Some(result) = closer_set.join_next().await {
            match result {
                Ok(Ok(())) => tracing::debug!("Closer completed successfully"),
                Ok(Err(err)) => tracing::error!("Closer error: {:#}", err),
                Err(err) => tracing::error!("Closer panicked: {}", err),
            }
        }
    }
}
