//! Bounded background queue for transcribed commands.
//!
//! A fixed pool of workers shares one receiver. Enqueueing never waits: when
//! the queue is full or shut down the job is dropped and logged.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};

use vox_domain::id::UserId;

use crate::infra::db::DbHistoryRepository;
use crate::state::AppInterpreter;
use crate::usecase::command::RunCommandUseCase;

/// A transcript waiting to be interpreted for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandJob {
    pub user_id: UserId,
    pub transcript: String,
}

/// Work performed for each dequeued job. Failures are the handler's to log.
pub trait CommandHandler: Send + Sync + 'static {
    fn handle(&self, job: CommandJob) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub workers: usize,
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            capacity: 64,
        }
    }
}

#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::Sender<CommandJob>,
}

impl CommandQueue {
    /// Spawn the workers on the current runtime. They exit once every
    /// `CommandQueue` clone has been dropped and the queue is drained.
    pub fn start<H: CommandHandler>(handler: Arc<H>, config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let workers = config.workers.max(1);

        for worker_id in 0..workers {
            let rx = Arc::clone(&rx);
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                worker_loop(worker_id, rx, handler).await;
            });
        }
        tracing::info!(workers, capacity = config.capacity, "command queue started");

        Self { tx }
    }

    /// Hand a job to the workers. Returns `false` if it was dropped.
    pub fn enqueue(&self, job: CommandJob) -> bool {
        let user_id = job.user_id;
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(user_id = %user_id, "command queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(user_id = %user_id, "command queue closed, dropping job");
                false
            }
        }
    }
}

async fn worker_loop<H: CommandHandler>(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<CommandJob>>>,
    handler: Arc<H>,
) {
    loop {
        // Hold the lock only while waiting for the next job.
        let job = {
            let mut rx = rx.lock().await;
            match rx.recv().await {
                Some(job) => job,
                None => break,
            }
        };
        let user_id = job.user_id;
        tracing::debug!(worker_id, user_id = %user_id, "processing command job");
        // A panicking job must not take the worker down with it.
        if AssertUnwindSafe(handler.handle(job)).catch_unwind().await.is_err() {
            tracing::error!(worker_id, user_id = %user_id, "command job panicked");
        }
    }
    tracing::debug!(worker_id, "command worker stopped");
}

// ── Interpret-and-record handler ─────────────────────────────────────────────

/// Production handler: runs the interpreter and records the exchange.
pub struct InterpretAndRecord {
    pub history: DbHistoryRepository,
    pub interpreter: Arc<AppInterpreter>,
}

impl CommandHandler for InterpretAndRecord {
    fn handle(&self, job: CommandJob) -> impl Future<Output = ()> + Send {
        async move {
            let usecase = RunCommandUseCase {
                history: self.history.clone(),
                interpreter: &self.interpreter,
            };
            let interpretation = usecase.execute(job.user_id, &job.transcript).await;
            tracing::info!(
                user_id = %job.user_id,
                classification = %interpretation.classification,
                "background command completed"
            );
        }
    }
}
