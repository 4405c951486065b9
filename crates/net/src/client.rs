//! Push channel client
//!
//! Subscribes to one conversation and turns the server's push events into
//! [`SourceEvent`]s for the session that owns the message buffer.

use std::net::SocketAddr;
use std::sync::Arc;

use spaceroom_core::{MessageRecord, Presence, UserId, UserProfile};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::PushEvent;

/// Capacity of the event and command channels
const CHANNEL_CAPACITY: usize = 64;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Event delivered to the session for the subscribed conversation
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A page of message history
    History(Vec<MessageRecord>),
    /// A live message
    Message(MessageRecord),
    /// Directory update for a user
    Profile(UserProfile),
    /// Presence change for a user
    Presence { user_id: UserId, presence: Presence },
    /// Connection lost
    Disconnected,
}

enum ClientCommand {
    Send(PushEvent),
    Disconnect,
}

/// Client handle for one conversation subscription
pub struct PushClient {
    conversation_id: String,
    state: Arc<RwLock<ConnectionState>>,
    event_rx: mpsc::Receiver<SourceEvent>,
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl PushClient {
    /// Connect to a push server over TCP and subscribe
    pub async fn connect(
        addr: SocketAddr,
        conversation_id: impl Into<String>,
        user_id: UserId,
    ) -> Result<Self> {
        info!(addr = %addr, "Connecting to push channel");
        let stream = TcpStream::connect(addr).await?;
        Self::attach(stream, conversation_id, user_id).await
    }

    /// Subscribe over an already established stream
    pub async fn attach<S>(
        stream: S,
        conversation_id: impl Into<String>,
        user_id: UserId,
    ) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let conversation_id = conversation_id.into();
        let (reader, mut writer) = tokio::io::split(stream);

        let subscribe = PushEvent::Subscribe {
            conversation_id: conversation_id.clone(),
            user_id: user_id.clone(),
        };
        write_frame(&mut writer, &subscribe).await?;
        info!(conversation_id = %conversation_id, user_id = %user_id, "Subscribed");

        let state = Arc::new(RwLock::new(ConnectionState::Connected));
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(write_task(writer, cmd_rx));
        tokio::spawn(read_task(
            reader,
            conversation_id.clone(),
            state.clone(),
            event_tx,
            cmd_tx.clone(),
        ));

        Ok(Self {
            conversation_id,
            state,
            event_rx,
            cmd_tx,
        })
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Get the next event, `None` once the reader has stopped
    pub async fn next_event(&mut self) -> Option<SourceEvent> {
        self.event_rx.recv().await
    }

    /// Submit a locally created message to the server
    pub async fn submit(&self, message: MessageRecord) -> Result<()> {
        if *self.state.read().await == ConnectionState::Disconnected {
            return Err(Error::NotConnected);
        }
        let event = PushEvent::Message {
            conversation_id: self.conversation_id.clone(),
            message,
        };
        self.cmd_tx
            .send(ClientCommand::Send(event))
            .await
            .map_err(|_| Error::NotConnected)
    }

    /// Close the connection
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Disconnect).await;
    }

    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.read().await
    }
}

async fn write_task<S: AsyncWrite>(
    mut writer: WriteHalf<S>,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            ClientCommand::Send(event) => {
                if let Err(e) = write_frame(&mut writer, &event).await {
                    warn!(error = %e, "Write error");
                    break;
                }
            }
            ClientCommand::Disconnect => {
                debug!("Disconnect requested");
                break;
            }
        }
    }
}

async fn read_task<S: AsyncRead>(
    mut reader: ReadHalf<S>,
    conversation_id: String,
    state: Arc<RwLock<ConnectionState>>,
    event_tx: mpsc::Sender<SourceEvent>,
    cmd_tx: mpsc::Sender<ClientCommand>,
) {
    loop {
        let event = tokio::select! {
            result = read_frame(&mut reader) => result,
            // Writer gone: disconnect was requested or the socket failed
            _ = cmd_tx.closed() => break,
        };

        match event {
            Ok(PushEvent::Ping) => {
                let _ = cmd_tx.send(ClientCommand::Send(PushEvent::Pong)).await;
            }
            Ok(event) => {
                if let Some(source_event) = event.into_source_event(&conversation_id) {
                    if event_tx.send(source_event).await.is_err() {
                        debug!("Event receiver dropped");
                        break;
                    }
                }
            }
            Err(Error::ConnectionClosed) => {
                debug!("Server closed connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "Read error");
                break;
            }
        }
    }

    *state.write().await = ConnectionState::Disconnected;
    let _ = event_tx.send(SourceEvent::Disconnected).await;
    info!(conversation_id = %conversation_id, "Push channel disconnected");
}

impl PushEvent {
    /// Session event for the subscribed conversation.
    ///
    /// Returns `None` for control events and for events scoped to another
    /// conversation.
    pub fn into_source_event(self, conversation_id: &str) -> Option<SourceEvent> {
        if let Some(scope) = self.conversation_id() {
            if scope != conversation_id {
                debug!(scope, "Ignoring event for another conversation");
                return None;
            }
        }

        match self {
            PushEvent::History { messages, .. } => {
                debug!(count = messages.len(), "Received history page");
                Some(SourceEvent::History(messages))
            }
            PushEvent::Message { message, .. } => Some(SourceEvent::Message(message)),
            PushEvent::Profile(profile) => Some(SourceEvent::Profile(profile)),
            PushEvent::Presence { user_id, presence } => {
                Some(SourceEvent::Presence { user_id, presence })
            }
            PushEvent::Subscribe { .. } | PushEvent::Ping | PushEvent::Pong => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spaceroom_core::{ConfirmedId, UserRole};
    use tokio::io::DuplexStream;

    fn message(id: &str) -> MessageRecord {
        MessageRecord::confirmed(
            ConfirmedId::new(id),
            UserId::from("prof"),
            "hello".to_string(),
            Utc::now(),
        )
    }

    async fn pair() -> (PushClient, DuplexStream) {
        let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);
        let client = PushClient::attach(client_side, "course-42", UserId::from("me"))
            .await
            .unwrap();

        match read_frame(&mut server_side).await.unwrap() {
            PushEvent::Subscribe {
                conversation_id,
                user_id,
            } => {
                assert_eq!(conversation_id, "course-42");
                assert_eq!(user_id, UserId::from("me"));
            }
            other => panic!("Expected subscribe, got {:?}", other),
        }
        (client, server_side)
    }

    #[tokio::test]
    async fn test_events_are_forwarded() {
        let (mut client, mut server) = pair().await;

        write_frame(
            &mut server,
            &PushEvent::History {
                conversation_id: "course-42".to_string(),
                messages: vec![message("c1")],
            },
        )
        .await
        .unwrap();
        write_frame(
            &mut server,
            &PushEvent::Profile(UserProfile::new(
                UserId::from("prof"),
                "Dr. Vega",
                UserRole::Instructor,
            )),
        )
        .await
        .unwrap();

        assert!(matches!(
            client.next_event().await,
            Some(SourceEvent::History(m)) if m.len() == 1
        ));
        assert!(matches!(
            client.next_event().await,
            Some(SourceEvent::Profile(p)) if p.display_name == "Dr. Vega"
        ));
    }

    #[tokio::test]
    async fn test_other_conversations_are_dropped() {
        let (mut client, mut server) = pair().await;

        write_frame(
            &mut server,
            &PushEvent::Message {
                conversation_id: "course-7".to_string(),
                message: message("c1"),
            },
        )
        .await
        .unwrap();
        write_frame(
            &mut server,
            &PushEvent::Message {
                conversation_id: "course-42".to_string(),
                message: message("c2"),
            },
        )
        .await
        .unwrap();

        match client.next_event().await {
            Some(SourceEvent::Message(m)) => assert_eq!(m.confirmed_key(), Some("c2")),
            other => panic!("Expected message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_presence_is_forwarded() {
        let (mut client, mut server) = pair().await;

        write_frame(
            &mut server,
            &PushEvent::Presence {
                user_id: UserId::from("prof"),
                presence: Presence::Online,
            },
        )
        .await
        .unwrap();

        match client.next_event().await {
            Some(SourceEvent::Presence { user_id, presence }) => {
                assert_eq!(user_id, UserId::from("prof"));
                assert_eq!(presence, Presence::Online);
            }
            other => panic!("Expected presence, got {:?}", other),
        }
    }

    #[test]
    fn test_control_events_are_not_forwarded() {
        assert!(PushEvent::Pong.into_source_event("course-42").is_none());
        let subscribe = PushEvent::Subscribe {
            conversation_id: "course-42".to_string(),
            user_id: UserId::from("me"),
        };
        assert!(subscribe.into_source_event("course-42").is_none());
    }

    #[tokio::test]
    async fn test_ping_is_answered() {
        let (_client, mut server) = pair().await;

        write_frame(&mut server, &PushEvent::Ping).await.unwrap();
        assert!(matches!(
            read_frame(&mut server).await.unwrap(),
            PushEvent::Pong
        ));
    }

    #[tokio::test]
    async fn test_submit_sends_message() {
        let (client, mut server) = pair().await;

        client.submit(message("c5")).await.unwrap();
        match read_frame(&mut server).await.unwrap() {
            PushEvent::Message {
                conversation_id,
                message,
            } => {
                assert_eq!(conversation_id, "course-42");
                assert_eq!(message.confirmed_key(), Some("c5"));
            }
            other => panic!("Expected message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_close_disconnects() {
        let (mut client, server) = pair().await;
        drop(server);

        assert!(matches!(
            client.next_event().await,
            Some(SourceEvent::Disconnected)
        ));
        assert_eq!(client.connection_state().await, ConnectionState::Disconnected);
        assert!(matches!(
            client.submit(message("c1")).await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_over_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let subscribe = read_frame(&mut stream).await.unwrap();
            assert_eq!(subscribe.conversation_id(), Some("course-42"));
            write_frame(
                &mut stream,
                &PushEvent::Message {
                    conversation_id: "course-42".to_string(),
                    message: message("c1"),
                },
            )
            .await
            .unwrap();
        });

        let mut client = PushClient::connect(addr, "course-42", UserId::from("me"))
            .await
            .unwrap();
        assert!(matches!(
            client.next_event().await,
            Some(SourceEvent::Message(m)) if m.confirmed_key() == Some("c1")
        ));
        server.await.unwrap();
    }
}
