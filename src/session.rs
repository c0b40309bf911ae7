//! Terminal session over a WebSocket transport.
//!
//! [`Session`] owns the client side of one connection to the terminal
//! server: it negotiates the `tty` sub-protocol, sends the one-time
//! [`SessionInit`] handshake, and exchanges channel-tagged frames. The
//! drivers in [`crate::bench`] wrap every inbound wait in their own
//! deadlines; `Session` itself never blocks unboundedly except inside
//! those waits.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};

use crate::config::{BenchConfig, SUBPROTOCOL};
use crate::error::Result;
use crate::protocol::{Frame, PromptDetector, SessionInit};

/// One inbound transport event, already passed through the frame codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A data-channel payload (tag `0x30`, tag stripped).
    Data(Bytes),
    /// A message the measurement logic does not interpret: text frames,
    /// control traffic, short messages, or non-data channel tags.
    Ignored,
    /// The connection ended.
    Closed,
}

/// A live terminal session.
pub struct Session {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Session {
    /// Connect to the terminal endpoint with the `tty` sub-protocol.
    ///
    /// The transport's message-size cap is raised to
    /// [`BenchConfig::max_message_size`] so large terminal bursts are
    /// not rejected mid-run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) if the
    /// connection or upgrade fails.
    pub async fn connect(config: &BenchConfig) -> Result<Self> {
        let mut request = config.endpoint.url().into_client_request()?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(config.max_message_size);
        ws_config.max_frame_size = Some(config.max_message_size);

        let (stream, _response) = connect_async_with_config(request, Some(ws_config), false).await?;
        tracing::debug!(url = %config.endpoint.url(), "connected");
        Ok(Self { stream })
    }

    /// Send the session handshake, then wait for the shell prompt.
    ///
    /// The readiness wait is bounded by
    /// [`Timeouts::readiness`](crate::config::Timeouts::readiness) and
    /// its expiry is non-fatal: the shell may simply have an unusual
    /// banner, and the driver's own deadlines will surface any real
    /// problem.
    ///
    /// # Errors
    ///
    /// Returns an error only when the handshake cannot be sent or the
    /// transport fails during the wait.
    pub async fn bootstrap(&mut self, config: &BenchConfig) -> Result<()> {
        let init = SessionInit::new(config.auth_token.clone(), config.columns, config.rows);
        self.stream.send(Message::Binary(init.to_bytes()?)).await?;

        let mut detector = PromptDetector::readiness();
        let wait = async {
            while let Some(payload) = self.next_data().await? {
                if detector.scan(&payload) {
                    break;
                }
            }
            Ok(())
        };
        match timeout(config.timeouts.readiness, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(
                    deadline = ?config.timeouts.readiness,
                    "no shell prompt before deadline, proceeding"
                );
                Ok(())
            }
        }
    }

    /// Send a data-channel frame with the given payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) if the send
    /// fails.
    pub async fn send_data(&mut self, payload: &[u8]) -> Result<()> {
        self.stream.send(Message::Binary(Frame::data(payload))).await?;
        Ok(())
    }

    /// Send the interrupt frame (Ctrl-C) on the data channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) if the send
    /// fails.
    pub async fn send_interrupt(&mut self) -> Result<()> {
        self.stream.send(Message::Binary(Frame::interrupt())).await?;
        Ok(())
    }

    /// Receive the next transport message.
    ///
    /// Decoding happens here: binary messages go through the frame
    /// codec, everything that is not a data frame comes back as
    /// [`Inbound::Ignored`]. A closed connection is [`Inbound::Closed`],
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) on a
    /// transport failure other than an orderly close.
    pub async fn recv(&mut self) -> Result<Inbound> {
        match self.stream.next().await {
            None => Ok(Inbound::Closed),
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => Ok(Inbound::Closed),
            Some(Err(err)) => Err(err.into()),
            Some(Ok(Message::Binary(data))) => Ok(match Frame::decode(Bytes::from(data)) {
                Some(frame) if frame.is_data() => Inbound::Data(frame.into_payload()),
                _ => Inbound::Ignored,
            }),
            Some(Ok(Message::Close(_))) => Ok(Inbound::Closed),
            Some(Ok(_)) => Ok(Inbound::Ignored),
        }
    }

    /// Receive the next data-channel payload, skipping everything else.
    ///
    /// Returns `None` once the connection is closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) on a
    /// transport failure.
    pub async fn next_data(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.recv().await? {
                Inbound::Data(payload) => return Ok(Some(payload)),
                Inbound::Ignored => continue,
                Inbound::Closed => return Ok(None),
            }
        }
    }

    /// Close the session.
    ///
    /// An already-closed connection is not an error.
    pub async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            match err {
                WsError::ConnectionClosed | WsError::AlreadyClosed => {}
                other => tracing::debug!(error = %other, "close failed"),
            }
        }
    }
}
