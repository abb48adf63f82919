//! Upstream connection seams.
//!
//! The listener reads frames through [`InboundStream`] and every job carries
//! a [`ReplyHandle`] back to the connection it arrived on.

use async_trait::async_trait;
use tokio::sync::mpsc;

use zerowaste_core_types::SessionId;

use crate::error::SchedulerError;
use crate::model::OutboundMessage;

pub mod ws;

#[async_trait]
pub trait InboundStream: Send {
    /// Next text frame, `None` once the upstream has gone away.
    async fn next_frame(&mut self) -> Option<Result<String, SchedulerError>>;
}

#[async_trait]
impl<S> InboundStream for Box<S>
where
    S: InboundStream + ?Sized,
{
    async fn next_frame(&mut self) -> Option<Result<String, SchedulerError>> {
        (**self).next_frame().await
    }
}

/// In-memory upstream; dropping every sender reads as a disconnect.
pub struct ChannelInbound {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl ChannelInbound {
    pub fn new() -> (mpsc::UnboundedSender<String>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }
}

#[async_trait]
impl InboundStream for ChannelInbound {
    async fn next_frame(&mut self) -> Option<Result<String, SchedulerError>> {
        self.receiver.recv().await.map(Ok)
    }
}

/// Where a response must go: the session it belongs to and the writer
/// feeding that session's connection.
#[derive(Clone, Debug)]
pub struct ReplyHandle {
    session: SessionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ReplyHandle {
    pub fn new(session: SessionId, sender: mpsc::UnboundedSender<String>) -> Self {
        Self { session, sender }
    }

    /// Handle plus the receiving end a writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(SessionId::new(), sender), receiver)
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn send(&self, message: &OutboundMessage) -> Result<(), SchedulerError> {
        let text = message.to_json()?;
        self.sender.send(text).map_err(|_| {
            SchedulerError::Connection(format!("session {} writer is gone", self.session))
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
