use super::session::{ ChatSession, ChatStatus };
use crate::models::chat::{ ContentPart, Conversation, Role };
use log::debug;
use serde_json::Value;

/// Placeholder shown instead of the message list while the conversation has
/// no messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const EMPTY_STATE: EmptyState = EmptyState {
    icon: "\u{1f4ac}",
    title: "No messages yet",
    description: "Start a conversation to see messages here",
};

#[derive(Clone, Debug, PartialEq)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub blocks: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConversationView {
    Empty(EmptyState),
    Messages(Vec<MessageView>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub view: ConversationView,
    /// True exactly while a sent request has produced no event yet.
    pub show_loader: bool,
}

/// Project the session into what a rendering surface draws: text blocks per
/// message in arrival order, the empty-state placeholder, and the loading
/// indicator flag. Parts other than text render nothing, by explicit choice.
pub fn render(session: &ChatSession) -> ViewModel {
    ViewModel {
        view: render_conversation(session.conversation()),
        show_loader: session.status() == ChatStatus::Submitted,
    }
}

pub fn render_conversation(conversation: &Conversation) -> ConversationView {
    if conversation.is_empty() {
        ConversationView::Empty(EMPTY_STATE)
    } else {
        let messages = conversation
            .messages
            .iter()
            .map(|message| {
                let mut blocks = Vec::new();
                for part in &message.parts {
                    match part {
                        ContentPart::Text { text } => blocks.push(text.clone()),
                        ContentPart::Other(value) => {
                            debug!("Skipping unrenderable content part: {}", part_type(value));
                        }
                    }
                }
                MessageView {
                    id: message.id.clone(),
                    role: message.role,
                    blocks,
                }
            })
            .collect();
        ConversationView::Messages(messages)
    }
}

fn part_type(value: &Value) -> &str {
    value.get("type").and_then(|t| t.as_str()).unwrap_or("unknown")
}
