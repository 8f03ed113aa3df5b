use crate::models::chat::{ ChatRequest, ContentPart, Conversation, Message };
use crate::stream::StreamEvent;
use log::{ debug, warn };
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatStatus {
    /// No turn in flight; submissions are accepted.
    Ready,
    /// A request was sent, no event has arrived yet. The loading indicator
    /// is shown exactly while in this state.
    Submitted,
    /// Events are arriving and the assistant message is growing.
    Streaming,
    /// The last turn ended in an error; `last_error` holds the reason.
    Failed,
}

#[derive(Debug, Default)]
struct TurnState {
    message_index: Option<usize>,
    part_index_by_id: HashMap<String, usize>,
}

/// Client-side conversation state machine. Owns the append-only message
/// sequence and the input buffer, and folds stream events into the in-flight
/// assistant message. Holds no I/O; the transport drives it.
pub struct ChatSession {
    conversation: Conversation,
    input: String,
    status: ChatStatus,
    turn: Option<TurnState>,
    last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::new(),
            input: String::new(),
            status: ChatStatus::Ready,
            turn: None,
            last_error: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, ChatStatus::Submitted | ChatStatus::Streaming)
    }

    /// Start a turn. Returns the request to send, or `None` when the text is
    /// empty or a turn is already in flight; in both cases nothing is
    /// appended and nothing should be sent. On success the user message is
    /// appended, the input buffer is cleared and the status moves to
    /// `Submitted`.
    pub fn begin_submit(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_busy() {
            warn!("Ignoring submission while a response is in flight");
            return None;
        }

        self.conversation.push(Message::user(text));
        self.input.clear();
        self.last_error = None;
        self.status = ChatStatus::Submitted;
        self.turn = Some(TurnState::default());

        Some(ChatRequest {
            messages: self.conversation.messages.clone(),
        })
    }

    /// Fold one stream event into the conversation. Events arriving with no
    /// turn in flight are dropped.
    pub fn apply_event(&mut self, event: StreamEvent) {
        let Some(turn) = self.turn.as_mut() else {
            debug!("Dropping stream event with no turn in flight");
            return;
        };

        match event {
            StreamEvent::Start { message_id, .. } => {
                self.conversation.push(Message::assistant(message_id));
                turn.message_index = Some(self.conversation.messages.len() - 1);
                self.status = ChatStatus::Streaming;
            }
            StreamEvent::TextStart { id } => {
                // an upstream that skips the start frame still gets a message
                let index = match turn.message_index {
                    Some(index) => index,
                    None => {
                        self.conversation.push(Message::assistant(Uuid::new_v4().to_string()));
                        let index = self.conversation.messages.len() - 1;
                        turn.message_index = Some(index);
                        index
                    }
                };
                self.status = ChatStatus::Streaming;
                let message = &mut self.conversation.messages[index];
                message.parts.push(ContentPart::text(""));
                turn.part_index_by_id.insert(id, message.parts.len() - 1);
            }
            StreamEvent::TextDelta { id, delta } => {
                let Some(index) = turn.message_index else {
                    debug!("Dropping delta that arrived before any message started");
                    return;
                };
                let Some(&part_index) = turn.part_index_by_id.get(&id) else {
                    debug!("Dropping delta for unknown part id {}", id);
                    return;
                };
                if let Some(ContentPart::Text { text }) =
                    self.conversation.messages[index].parts.get_mut(part_index)
                {
                    text.push_str(&delta);
                }
            }
            StreamEvent::TextEnd { id } => {
                turn.part_index_by_id.remove(&id);
            }
            StreamEvent::Error { error_text } => {
                warn!("Stream reported an error: {}", error_text);
                self.last_error = Some(error_text);
                self.status = ChatStatus::Failed;
            }
            StreamEvent::Finish { .. } => {
                debug!("Stream finished");
            }
            StreamEvent::Other(value) => {
                debug!("Ignoring unhandled stream event: {}", value);
            }
        }
    }

    /// End the turn. A failed turn stays `Failed` so the surface can mark
    /// it; anything else returns to `Ready`.
    pub fn complete_turn(&mut self) {
        self.turn = None;
        if self.status != ChatStatus::Failed {
            self.status = ChatStatus::Ready;
        }
    }

    pub fn fail_turn(&mut self, reason: impl Into<String>) {
        self.turn = None;
        self.last_error = Some(reason.into());
        self.status = ChatStatus::Failed;
    }
}
