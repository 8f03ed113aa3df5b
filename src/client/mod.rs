pub mod session;
pub mod transport;
pub mod view;

use futures::StreamExt;
use self::session::ChatSession;
use std::error::Error;
use std::sync::Arc;
use self::transport::RelayTransport;

/// Owns a session and a transport and drives whole turns: append the user
/// message, stream the relay response, fold every event into the session.
pub struct ChatClient {
    session: ChatSession,
    transport: Arc<dyn RelayTransport>,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn RelayTransport>) -> Self {
        Self {
            session: ChatSession::new(),
            transport,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Submit one message and wait for the full response. Empty input and
    /// in-flight turns are no-ops; transport and stream failures fail the
    /// turn and are returned to the caller.
    pub async fn submit(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let Some(request) = self.session.begin_submit(text) else {
            return Ok(());
        };

        let mut events = match self.transport.send_chat(request).await {
            Ok(events) => events,
            Err(e) => {
                self.session.fail_turn(e.to_string());
                return Err(e);
            }
        };

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => self.session.apply_event(event),
                Err(e) => {
                    self.session.fail_turn(e.to_string());
                    return Err(e);
                }
            }
        }

        self.session.complete_turn();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ ChatRequest, Role };
    use crate::stream::StreamEvent;
    use async_trait::async_trait;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use super::session::ChatStatus;
    use super::transport::EventStream;

    struct ScriptedTransport {
        events: Vec<StreamEvent>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(events: Vec<StreamEvent>) -> Self {
            Self {
                events,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RelayTransport for ScriptedTransport {
        async fn send_chat(
            &self,
            _request: ChatRequest,
        ) -> Result<EventStream, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items: Vec<Result<StreamEvent, Box<dyn Error + Send + Sync>>> =
                self.events.clone().into_iter().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl RelayTransport for FailingTransport {
        async fn send_chat(
            &self,
            _request: ChatRequest,
        ) -> Result<EventStream, Box<dyn Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    fn reply(text: &str) -> Vec<StreamEvent> {
        vec![
            StreamEvent::Start {
                message_id: "m1".into(),
                message_metadata: None,
            },
            StreamEvent::TextStart { id: "0".into() },
            StreamEvent::TextDelta {
                id: "0".into(),
                delta: text.into(),
            },
            StreamEvent::TextEnd { id: "0".into() },
            StreamEvent::Finish {
                message_metadata: None,
            },
        ]
    }

    #[tokio::test]
    async fn submit_drives_a_full_turn() {
        let transport = Arc::new(ScriptedTransport::new(reply("pong")));
        let mut client = ChatClient::new(transport.clone());

        client.submit("ping").await.unwrap();

        let session = client.session();
        assert_eq!(session.status(), ChatStatus::Ready);
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation().messages[0].role, Role::User);
        assert_eq!(session.conversation().messages[1].role, Role::Assistant);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_submit_makes_no_network_call() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let mut client = ChatClient::new(transport.clone());

        client.submit("").await.unwrap();
        client.submit("   ").await.unwrap();

        assert!(client.session().conversation().is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_fails_the_turn() {
        let mut client = ChatClient::new(Arc::new(FailingTransport));

        let result = client.submit("hello").await;

        assert!(result.is_err());
        assert_eq!(client.session().status(), ChatStatus::Failed);
        assert_eq!(client.session().last_error(), Some("connection refused"));
        // the user message stays in the conversation, error-marked
        assert_eq!(client.session().conversation().len(), 1);
    }

    #[tokio::test]
    async fn stream_error_event_surfaces_on_the_session() {
        let events = vec![
            StreamEvent::Start {
                message_id: "m1".into(),
                message_metadata: None,
            },
            StreamEvent::Error {
                error_text: "model unavailable".into(),
            },
        ];
        let mut client = ChatClient::new(Arc::new(ScriptedTransport::new(events)));

        client.submit("hello").await.unwrap();

        assert_eq!(client.session().status(), ChatStatus::Failed);
        assert_eq!(client.session().last_error(), Some("model unavailable"));
    }
}
