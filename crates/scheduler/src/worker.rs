use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::SchedulerError;
use crate::executor::RequestExecutor;
use crate::metrics;
use crate::model::{OutboundMessage, PipelineConfig, RunRequest, RunResponse};
use crate::queue::{Job, RequestQueue};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker: usize,
    pub completed: u64,
    pub failed: u64,
}

pub struct WorkerPool<E> {
    executor: Arc<E>,
    queue: Arc<RequestQueue>,
    shutdown: CancellationToken,
    config: PipelineConfig,
}

impl<E> WorkerPool<E>
where
    E: RequestExecutor + 'static,
{
    pub fn new(
        executor: Arc<E>,
        queue: Arc<RequestQueue>,
        shutdown: CancellationToken,
        config: PipelineConfig,
    ) -> Self {
        Self {
            executor,
            queue,
            shutdown,
            config,
        }
    }

    /// Start `config.workers` tasks. Each returns its stats once shutdown is
    /// set and the closed queue is empty.
    pub fn spawn(&self) -> Vec<JoinHandle<WorkerStats>> {
        (0..self.config.workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    executor: Arc::clone(&self.executor),
                    queue: Arc::clone(&self.queue),
                    shutdown: self.shutdown.clone(),
                    poll_interval: self.config.poll_interval,
                };
                tokio::spawn(worker.run())
            })
            .collect()
    }
}

struct Worker<E> {
    id: usize,
    executor: Arc<E>,
    queue: Arc<RequestQueue>,
    shutdown: CancellationToken,
    poll_interval: Duration,
}

impl<E> Worker<E>
where
    E: RequestExecutor + 'static,
{
    async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats {
            worker: self.id,
            ..WorkerStats::default()
        };
        debug!(worker = self.id, "worker started");
        loop {
            if let Some(job) = self.queue.pop_timeout(self.poll_interval).await {
                self.handle(job, &mut stats).await;
                continue;
            }
            if self.queue.is_closed() && self.queue.is_empty() {
                if self.shutdown.is_cancelled() {
                    break;
                }
                let _ = tokio::time::timeout(self.poll_interval, self.shutdown.cancelled()).await;
            }
        }
        debug!(
            worker = self.id,
            completed = stats.completed,
            failed = stats.failed,
            "worker stopped"
        );
        stats
    }

    async fn handle(&self, job: Job, stats: &mut WorkerStats) {
        let started = Instant::now();
        let seq = job.seq;
        let waited_ms = started.duration_since(job.enqueued_at).as_millis() as u64;

        match self.process(job).await {
            Ok(email) => {
                stats.completed += 1;
                metrics::record_completed(started.elapsed());
                debug!(
                    worker = self.id,
                    seq,
                    %email,
                    waited_ms,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request answered"
                );
            }
            Err((email, err)) => {
                stats.failed += 1;
                metrics::record_failed(err.reason());
                let email = email.as_deref().unwrap_or("-");
                match &err {
                    SchedulerError::MalformedRequest(_) => {
                        warn!(worker = self.id, seq, email, %err, "request dropped");
                    }
                    SchedulerError::Connection(_) => {
                        error!(worker = self.id, seq, email, %err, "reply failed, shutting down");
                        self.shutdown.cancel();
                    }
                    _ => {
                        error!(worker = self.id, seq, email, %err, "request failed");
                    }
                }
            }
        }
        self.queue.task_done();
    }

    /// Parse, rank, reply. Errors carry the email once it is known.
    async fn process(&self, job: Job) -> Result<String, (Option<String>, SchedulerError)> {
        let request = RunRequest::from_frame(&job.raw).map_err(|err| (None, err))?;
        let email = request.email.clone();
        let query = request.to_query();

        let executor = Arc::clone(&self.executor);
        let recipe_ids = tokio::task::spawn_blocking(move || executor.execute(&query))
            .await
            .map_err(|err| {
                let err = if err.is_panic() {
                    SchedulerError::Computation(panic_message(err.into_panic()))
                } else {
                    SchedulerError::Internal(err.to_string())
                };
                (Some(email.clone()), err)
            })?
            .map_err(|err| (Some(email.clone()), err))?;

        let message = OutboundMessage::Run(RunResponse {
            recipe_ids,
            email: email.clone(),
        });
        job.reply
            .send(&message)
            .map_err(|err| (Some(email.clone()), err))?;
        Ok(email)
    }
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("ranking panicked: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("ranking panicked: {text}")
    } else {
        "ranking panicked".to_string()
    }
}
