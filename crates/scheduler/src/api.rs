use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::SchedulerError;
use crate::executor::RequestExecutor;
use crate::listener::{Listener, ListenerExit};
use crate::model::PipelineConfig;
use crate::queue::RequestQueue;
use crate::transport::{InboundStream, ReplyHandle};
use crate::worker::{WorkerPool, WorkerStats};

#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub received: u64,
    pub exit: ListenerExit,
    pub workers: Vec<WorkerStats>,
}

impl PipelineReport {
    pub fn completed(&self) -> u64 {
        self.workers.iter().map(|stats| stats.completed).sum()
    }

    pub fn failed(&self) -> u64 {
        self.workers.iter().map(|stats| stats.failed).sum()
    }
}

/// Listener, queue and worker pool for one upstream session.
///
/// The shutdown token is one-shot: once a run has stopped, further runs
/// stop immediately.
pub struct Pipeline<E> {
    executor: Arc<E>,
    config: PipelineConfig,
    shutdown: CancellationToken,
}

impl<E> Pipeline<E>
where
    E: RequestExecutor + 'static,
{
    pub fn new(executor: Arc<E>, config: PipelineConfig) -> Self {
        Self {
            executor,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancelling this token makes the listener stop and the workers drain.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve `inbound` until it disconnects or shutdown is requested, then
    /// drain every queued request before returning.
    pub async fn run<S>(
        &self,
        inbound: S,
        reply: ReplyHandle,
    ) -> Result<PipelineReport, SchedulerError>
    where
        S: InboundStream + 'static,
    {
        if self.config.workers == 0 {
            return Err(SchedulerError::Internal(
                "worker pool needs at least one worker".into(),
            ));
        }

        let queue = Arc::new(RequestQueue::new());
        let pool = WorkerPool::new(
            Arc::clone(&self.executor),
            Arc::clone(&queue),
            self.shutdown.clone(),
            self.config.clone(),
        );
        let workers = pool.spawn();
        info!(
            workers = self.config.workers,
            poll_ms = self.config.poll_interval.as_millis() as u64,
            session = %reply.session(),
            "pipeline started"
        );

        let listener = Listener::new(inbound, reply, Arc::clone(&queue), self.shutdown.clone());
        let listened = tokio::spawn(listener.run()).await;
        if listened.is_err() {
            // The listener normally does this itself on every exit path.
            queue.close();
            self.shutdown.cancel();
        }

        queue.join().await;

        let mut stats = Vec::with_capacity(workers.len());
        for handle in workers {
            match handle.await {
                Ok(worker) => stats.push(worker),
                Err(err) => error!(?err, "worker task aborted"),
            }
        }

        let listener = listened.map_err(|err| SchedulerError::Internal(err.to_string()))??;
        let report = PipelineReport {
            received: listener.received,
            exit: listener.exit,
            workers: stats,
        };
        info!(
            received = report.received,
            completed = report.completed(),
            failed = report.failed(),
            exit = ?report.exit,
            "pipeline stopped"
        );
        Ok(report)
    }
}
