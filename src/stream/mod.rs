use serde::{ Serialize, Deserialize };
use serde_json::Value;
use thiserror::Error;

/// Terminal sentinel sent by the upstream as the last `data:` frame.
pub const DONE_SENTINEL: &str = "[DONE]";
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Events carried by the UI message stream, one JSON object per SSE frame.
/// Unknown event types decode into `Other` so a newer upstream does not break
/// the consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    #[serde(rename_all = "camelCase")]
    Start {
        message_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_metadata: Option<Value>,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        error_text: String,
    },
    #[serde(rename_all = "camelCase")]
    Finish {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_metadata: Option<Value>,
    },
    #[serde(untagged)]
    Other(Value),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("event frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("malformed event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Encode a single event as an SSE `data:` frame, the framing the upstream
/// uses on the wire.
pub fn encode_event(event: &StreamEvent) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", serde_json::to_string(event)?))
}

/// Incremental SSE decoder. Feed it raw body chunks in whatever sizes the
/// transport delivers them; it reassembles lines, collects `data:` fields
/// until the blank line that ends an event, and stops at the `[DONE]`
/// sentinel. A frame that fails to decode yields an error for that frame
/// only; the decoder itself stays usable.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, StreamError>> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.buffer.extend_from_slice(chunk);

        while !self.done {
            let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') else {
                break;
            };
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if line.is_empty() {
                if let Some(result) = self.take_event() {
                    events.push(result);
                }
                continue;
            }

            match std::str::from_utf8(&line) {
                Ok(text) => {
                    if let Some(rest) = text.strip_prefix("data:") {
                        self.data_lines.push(rest.trim_start().to_string());
                    }
                    // other SSE fields (event:, id:, retry:, comments) carry
                    // nothing in this protocol
                }
                Err(e) => events.push(Err(StreamError::Utf8(e))),
            }
        }

        events
    }

    fn take_event(&mut self) -> Option<Result<StreamEvent, StreamError>> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        if data == DONE_SENTINEL {
            self.done = true;
            return None;
        }
        Some(serde_json::from_str(&data).map_err(StreamError::Parse))
    }
}
