use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SchedulerError;
use crate::metrics;
use crate::model::InboundEnvelope;
use crate::queue::RequestQueue;
use crate::transport::{InboundStream, ReplyHandle};

/// Why the listener stopped reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerExit {
    Disconnected,
    ReceiveFault(String),
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct ListenerStats {
    pub received: u64,
    pub exit: ListenerExit,
}

/// Owns the upstream read half. Receives, wraps, enqueues; nothing else.
pub struct Listener<S> {
    inbound: S,
    reply: ReplyHandle,
    queue: Arc<RequestQueue>,
    shutdown: CancellationToken,
}

impl<S: InboundStream> Listener<S> {
    pub fn new(
        inbound: S,
        reply: ReplyHandle,
        queue: Arc<RequestQueue>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inbound,
            reply,
            queue,
            shutdown,
        }
    }

    /// Run until the upstream goes away or shutdown is requested. On every
    /// exit path the queue is closed and the shutdown signal set.
    pub async fn run(mut self) -> Result<ListenerStats, SchedulerError> {
        let result = self.listen().await;
        self.queue.close();
        self.shutdown.cancel();
        info!(session = %self.reply.session(), "listener stopped, workers draining");
        result
    }

    async fn listen(&mut self) -> Result<ListenerStats, SchedulerError> {
        self.handshake().await?;
        info!(session = %self.reply.session(), "upstream handshake complete");

        let mut received = 0;
        let exit = loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break ListenerExit::Cancelled,
                frame = self.inbound.next_frame() => frame,
            };
            match frame {
                Some(Ok(raw)) => {
                    let seq = self.queue.push(raw, self.reply.clone())?;
                    received += 1;
                    metrics::record_received();
                    debug!(seq, depth = self.queue.len(), "request enqueued");
                }
                Some(Err(err)) => {
                    warn!(session = %self.reply.session(), %err, "upstream receive failed");
                    break ListenerExit::ReceiveFault(err.to_string());
                }
                None => {
                    info!(session = %self.reply.session(), "upstream disconnected");
                    break ListenerExit::Disconnected;
                }
            }
        };
        Ok(ListenerStats { received, exit })
    }

    async fn handshake(&mut self) -> Result<(), SchedulerError> {
        let first = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                return Err(SchedulerError::Handshake("shutdown before handshake".into()));
            }
            frame = self.inbound.next_frame() => frame,
        };
        let raw = match first {
            Some(Ok(raw)) => raw,
            Some(Err(err)) => return Err(SchedulerError::Handshake(err.to_string())),
            None => {
                return Err(SchedulerError::Handshake(
                    "upstream closed before handshake".into(),
                ))
            }
        };
        let envelope = InboundEnvelope::parse(&raw)
            .map_err(|err| SchedulerError::Handshake(err.to_string()))?;
        if envelope.is_handshake() {
            Ok(())
        } else {
            Err(SchedulerError::Handshake(format!(
                "expected `connected`, got `{}`",
                envelope.kind
            )))
        }
    }
}
