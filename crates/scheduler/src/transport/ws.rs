use async_trait::async_trait;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use zerowaste_core_types::SessionId;

use crate::error::SchedulerError;
use crate::transport::{InboundStream, ReplyHandle};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open upstream session split into its read and write halves.
pub struct WsConnection {
    pub inbound: WsInbound,
    pub reply: ReplyHandle,
    /// Finishes once every [`ReplyHandle`] clone is dropped or a send fails.
    pub writer: JoinHandle<()>,
}

pub struct WsInbound {
    session: SessionId,
    source: SplitStream<Socket>,
}

pub async fn connect(url: &str) -> Result<WsConnection, SchedulerError> {
    let (socket, _) = connect_async(url)
        .await
        .map_err(|err| SchedulerError::Connection(format!("connect {url}: {err}")))?;
    let (mut sink, source) = socket.split();
    let (reply, mut outbound) = ReplyHandle::channel();
    let session = reply.session().clone();
    info!(%session, %url, "upstream socket open");

    let writer_session = session.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(err) = sink.send(Message::Text(text)).await {
                warn!(session = %writer_session, %err, "upstream send failed");
                return;
            }
        }
        if let Err(err) = sink.close().await {
            debug!(session = %writer_session, %err, "upstream close failed");
        }
    });

    Ok(WsConnection {
        inbound: WsInbound { session, source },
        reply,
        writer,
    })
}

#[async_trait]
impl InboundStream for WsInbound {
    async fn next_frame(&mut self) -> Option<Result<String, SchedulerError>> {
        while let Some(message) = self.source.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => warn!(session = %self.session, "dropping non-utf8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(session = %self.session, ?frame, "upstream sent close");
                    return None;
                }
                Ok(_) => continue,
                Err(err) => return Some(Err(SchedulerError::Connection(err.to_string()))),
            }
        }
        None
    }
}
