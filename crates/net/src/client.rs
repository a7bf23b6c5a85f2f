//! TCP client for the platform adapter link
//!
//! Requests are correlated with responses by sequence number; events arrive
//! unprompted and are handed to the caller on a channel. There is no retry
//! or backoff here: when the link drops, pending requests fail and the event
//! stream ends.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Event, Message, Request, Response};

enum ClientCommand {
    Request {
        seq: u64,
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    Disconnect,
}

/// Handle for talking to the platform adapter
pub struct AdapterClient {
    cmd_tx: mpsc::Sender<ClientCommand>,
    next_seq: AtomicU64,
}

impl AdapterClient {
    /// Connect and authenticate with the adapter.
    ///
    /// Returns the client handle and the stream of platform events. The
    /// event receiver yields `None` once the connection is gone.
    pub async fn connect(addr: SocketAddr, token: &str) -> Result<(Self, mpsc::Receiver<Event>)> {
        let stream = TcpStream::connect(addr).await?;
        let (mut reader, mut writer) = tokio::io::split(stream);

        // Authenticate before anything else
        write_frame(
            &mut writer,
            &Message::Hello {
                token: token.to_string(),
            },
        )
        .await?;

        match read_frame::<_, Message>(&mut reader).await? {
            Message::HelloAccepted => {}
            Message::HelloRejected { reason } => return Err(Error::Rejected(reason)),
            other => {
                return Err(Error::Protocol(format!(
                    "Unexpected handshake reply: {:?}",
                    other
                )))
            }
        }

        info!(addr = %addr, "Connected to platform adapter");

        let (event_tx, event_rx) = mpsc::channel(64);
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        tokio::spawn(connection_task(reader, writer, event_tx, cmd_rx));

        Ok((
            Self {
                cmd_tx,
                next_seq: AtomicU64::new(1),
            },
            event_rx,
        ))
    }

    /// Send a request and wait for the matching response.
    ///
    /// A remote `Response::Error` surfaces as `Error::Remote`.
    pub async fn request(&self, request: Request) -> Result<Response> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.cmd_tx
            .send(ClientCommand::Request {
                seq,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;

        let response = reply_rx.await.map_err(|_| Error::ConnectionClosed)?;

        match response {
            Response::Error { message } => Err(Error::Remote(message)),
            other => Ok(other),
        }
    }

    /// Close the link
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Disconnect).await;
    }
}

/// Main connection task
async fn connection_task(
    mut reader: ReadHalf<TcpStream>,
    mut writer: WriteHalf<TcpStream>,
    event_tx: mpsc::Sender<Event>,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
) {
    let mut pending: HashMap<u64, oneshot::Sender<Response>> = HashMap::new();

    loop {
        tokio::select! {
            // Incoming message from the adapter
            result = read_frame::<_, Message>(&mut reader) => {
                match result {
                    Ok(Message::Response { seq, response }) => {
                        match pending.remove(&seq) {
                            Some(reply) => {
                                let _ = reply.send(response);
                            }
                            None => {
                                warn!(seq, "Response with no pending request");
                            }
                        }
                    }
                    Ok(Message::Event { event }) => {
                        if event_tx.send(event).await.is_err() {
                            debug!("Event receiver dropped");
                            break;
                        }
                    }
                    Ok(Message::Ping) => {
                        if let Err(e) = write_frame(&mut writer, &Message::Pong).await {
                            warn!(error = %e, "Write error");
                            break;
                        }
                    }
                    Ok(Message::Pong) => {
                        debug!("Received pong");
                    }
                    Ok(other) => {
                        debug!(message = ?other, "Ignoring unexpected message");
                    }
                    Err(Error::ConnectionClosed) => {
                        debug!("Adapter closed connection");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Read error");
                        break;
                    }
                }
            }

            // Outgoing command
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Request { seq, request, reply }) => {
                        let msg = Message::Request { seq, request };
                        if let Err(e) = write_frame(&mut writer, &msg).await {
                            warn!(error = %e, "Write error");
                            break;
                        }
                        pending.insert(seq, reply);
                    }
                    Some(ClientCommand::Disconnect) | None => {
                        debug!("Disconnect requested");
                        break;
                    }
                }
            }
        }
    }

    // Dropping the pending map fails outstanding requests with
    // ConnectionClosed; dropping event_tx ends the event stream.
    info!("Disconnected from platform adapter");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use usher_core::{RoleId, UserId};

    /// Minimal in-test adapter: accepts one connection, answers the
    /// handshake, echoes canned responses, and pushes one event.
    async fn spawn_fake_adapter() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (mut reader, mut writer) = tokio::io::split(stream);

            // Handshake
            match read_frame::<_, Message>(&mut reader).await.unwrap() {
                Message::Hello { token } if token == "secret" => {
                    write_frame(&mut writer, &Message::HelloAccepted)
                        .await
                        .unwrap();
                }
                _ => {
                    write_frame(
                        &mut writer,
                        &Message::HelloRejected {
                            reason: "bad token".to_string(),
                        },
                    )
                    .await
                    .unwrap();
                    return;
                }
            }

            // Push an event before answering any request
            write_frame(
                &mut writer,
                &Message::Event {
                    event: Event::PanelRequested {
                        channel: usher_core::ChannelId(5),
                        user: UserId(9),
                    },
                },
            )
            .await
            .unwrap();

            // Answer requests until the peer hangs up
            while let Ok(msg) = read_frame::<_, Message>(&mut reader).await {
                if let Message::Request { seq, request } = msg {
                    let response = match request {
                        Request::HasRole { .. } => Response::RoleCheck { value: true },
                        Request::DeleteChannel { .. } => Response::Error {
                            message: "unknown channel".to_string(),
                        },
                        _ => Response::Ack,
                    };
                    write_frame(&mut writer, &Message::Response { seq, response })
                        .await
                        .unwrap();
                }
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_connect_and_request() {
        let addr = spawn_fake_adapter().await;
        let (client, mut events) = AdapterClient::connect(addr, "secret").await.unwrap();

        // The pushed event arrives on the event stream
        match events.recv().await {
            Some(Event::PanelRequested { user, .. }) => assert_eq!(user, UserId(9)),
            other => panic!("unexpected event: {:?}", other),
        }

        // Request/response correlation
        let response = client
            .request(Request::HasRole {
                user: UserId(9),
                role: RoleId(1),
            })
            .await
            .unwrap();
        assert!(matches!(response, Response::RoleCheck { value: true }));

        // Remote errors surface as Error::Remote
        let err = client
            .request(Request::DeleteChannel {
                channel: usher_core::ChannelId(404),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));

        client.disconnect().await;
    }

    #[tokio::test]
    async fn test_bad_token_rejected() {
        let addr = spawn_fake_adapter().await;
        let result = AdapterClient::connect(addr, "wrong").await;
        assert!(matches!(result, Err(Error::Rejected(_))));
    }
}
