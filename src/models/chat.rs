use chrono::Utc;
use serde::{ Serialize, Deserialize };
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One typed fragment of a message. The wire format tags each part with a
/// `type` field; anything other than `text` is carried through untouched so
/// callers decide what to do with it instead of losing it at parse time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text {
        text: String,
    },
    #[serde(untagged)]
    Other(Value),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<ContentPart>,
    pub timestamp: i64,
}

impl Message {
    pub fn new(id: String, role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            id,
            role,
            parts,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Role::User, vec![ContentPart::text(text)])
    }

    pub fn assistant(id: String) -> Self {
        Self::new(id, Role::Assistant, Vec::new())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Role::System, vec![ContentPart::text(text)])
    }
}

/// Append-only, in-memory message sequence for one session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Body posted to the relay. The relay itself never parses this; the upstream
/// reads the `messages` array and extracts the latest user text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}
