//! Relay client over `tokio-tungstenite`
//!
//! Speaks the same `{"event", "data"}` framing as the server. Used by the
//! `trackit-watch` tool and the end-to-end relay tests.

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use trackit_common::events::{names, Frame};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Frame encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct RelayClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RelayClient {
    /// Connect to a relay endpoint such as `ws://127.0.0.1:5730/ws`
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url).await?;
        tracing::debug!(url, "Connected to relay");
        Ok(Self { stream })
    }

    pub async fn send(&mut self, event: &str, data: &impl Serialize) -> Result<(), ClientError> {
        let text = Frame::new(event, data)?.to_text()?;
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    pub async fn join_class(&mut self, class_id: &str) -> Result<(), ClientError> {
        self.send(names::JOIN_CLASS, &json!({ "classId": class_id })).await
    }

    pub async fn join_session(&mut self, session_id: &str) -> Result<(), ClientError> {
        self.send(names::JOIN_SESSION, &json!({ "sessionId": session_id }))
            .await
    }

    /// Next relay frame; `None` once the server closes the connection
    ///
    /// Control frames and text that is not a relay frame are skipped.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, ClientError> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => match Frame::from_text(&text) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => tracing::debug!(error = %e, "Skipping non-relay text frame"),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
