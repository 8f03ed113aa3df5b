use crate::models::chat::ChatRequest;
use crate::stream::{ SseDecoder, StreamEvent };
use async_trait::async_trait;
use futures::{ Stream, StreamExt };
use reqwest::Client as HttpClient;
use std::error::Error as StdError;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

pub type EventStream = Pin<
    Box<dyn Stream<Item = Result<StreamEvent, Box<dyn StdError + Send + Sync>>> + Send>
>;

/// Seam between the session and the wire so the turn driver can be exercised
/// without a running relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send_chat(
        &self,
        request: ChatRequest,
    ) -> Result<EventStream, Box<dyn StdError + Send + Sync>>;
}

/// Talks to the relay's `POST /chat` and decodes the event-stream body into
/// `StreamEvent`s as chunks arrive.
pub struct HttpRelayTransport {
    http: HttpClient,
    chat_url: String,
}

impl HttpRelayTransport {
    pub fn new(relay_base_url: impl Into<String>) -> Self {
        let base = relay_base_url.into();
        Self {
            http: HttpClient::new(),
            chat_url: format!("{}/chat", base.trim_end_matches('/')),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send_chat(
        &self,
        request: ChatRequest,
    ) -> Result<EventStream, Box<dyn StdError + Send + Sync>> {
        let (tx, rx) = mpsc::channel(32);
        let client = self.http.clone();
        let url = self.chat_url.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&request).send().await {
                Ok(resp) => {
                    if let Err(e) = resp.error_for_status_ref() {
                        let _ = tx.send(Err(Box::new(e) as _)).await;
                        return;
                    }
                    let mut decoder = SseDecoder::new();
                    let mut bytes = resp.bytes_stream();
                    while let Some(chunk) = bytes.next().await {
                        match chunk {
                            Ok(buf) => {
                                for event in decoder.push(&buf) {
                                    let item = event
                                        .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>);
                                    if tx.send(item).await.is_err() {
                                        return;
                                    }
                                }
                                if decoder.is_done() {
                                    return;
                                }
                            }
                            Err(e) => {
                                let _ = tx.send(Err(Box::new(e) as _)).await;
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(Box::new(e) as _)).await;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
