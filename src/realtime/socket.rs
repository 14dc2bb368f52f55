use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{EventHub, RealtimeConnection, RealtimeTransport};
use crate::services::{AdminError, ServiceResult};

/// WebSocket transport for native builds (CLI, tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct SocketTransport;

pub struct SocketConnection {
    reader: JoinHandle<()>,
}

impl RealtimeConnection for SocketConnection {
    fn close(&mut self) {
        self.reader.abort();
    }

    fn is_open(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl Drop for SocketConnection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl RealtimeTransport for SocketTransport {
    type Connection = SocketConnection;

    async fn open(&self, url: &str, hub: EventHub) -> ServiceResult<SocketConnection> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|err| AdminError::Network(format!("realtime connect to {url}: {err}")))?;
        let (mut write, mut read) = stream.split();
        let reader = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        hub.dispatch_text(&text);
                    }
                    Ok(Message::Ping(payload)) => {
                        if let Err(err) = write.send(Message::Pong(payload)).await {
                            tracing::debug!(error = %err, "failed to answer ping");
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "realtime stream error");
                        break;
                    }
                }
            }
            tracing::debug!("realtime reader stopped");
        });
        Ok(SocketConnection { reader })
    }
}
