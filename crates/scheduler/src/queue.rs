//! Multi-consumer FIFO between the listener and the worker pool.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::SchedulerError;
use crate::metrics;
use crate::transport::ReplyHandle;

/// One queued request frame and the handle its answer must go to.
#[derive(Debug)]
pub struct Job {
    pub seq: u64,
    pub raw: String,
    pub reply: ReplyHandle,
    pub enqueued_at: Instant,
}

#[derive(Debug, Default)]
pub struct RequestQueue {
    items: Mutex<VecDeque<Job>>,
    available: Notify,
    drained: Notify,
    unfinished: AtomicUsize,
    closed: AtomicBool,
    seq: AtomicU64,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job and wake one waiting worker. Returns the job's sequence.
    pub fn push(&self, raw: String, reply: ReplyHandle) -> Result<u64, SchedulerError> {
        if self.is_closed() {
            return Err(SchedulerError::Internal("push on closed queue".into()));
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.unfinished.fetch_add(1, Ordering::AcqRel);
        let depth = {
            let mut items = self.items.lock();
            items.push_back(Job {
                seq,
                raw,
                reply,
                enqueued_at: Instant::now(),
            });
            items.len()
        };
        metrics::set_queue_depth(depth);
        self.available.notify_one();
        Ok(seq)
    }

    /// Pop the oldest job, waiting at most `timeout` for one to arrive.
    ///
    /// Returns `None` on timeout, or at once when the queue is closed and empty.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<Job> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(job) = self.try_pop() {
                return Some(job);
            }
            if self.is_closed() {
                return None;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }

    fn try_pop(&self) -> Option<Job> {
        let (job, depth) = {
            let mut items = self.items.lock();
            let job = items.pop_front();
            (job, items.len())
        };
        if job.is_some() {
            metrics::set_queue_depth(depth);
            // Hand a pending wakeup on if more work is queued.
            if depth > 0 {
                self.available.notify_one();
            }
        }
        job
    }

    /// Acknowledge one popped job as fully processed.
    pub fn task_done(&self) {
        let previous = self
            .unfinished
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every pushed job has been acknowledged.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Refuse further pushes and wake idle workers so they can observe it.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Pushed but not yet acknowledged, in-flight jobs included.
    pub fn unfinished(&self) -> usize {
        self.unfinished.load(Ordering::Acquire)
    }
}
