use axum::body::Body;
use axum::http::{ header, HeaderName, HeaderValue, StatusCode };
use axum::response::{ IntoResponse, Response };
use log::debug;
use reqwest::Client as HttpClient;
use std::error::Error;
use url::Url;

/// Marker header telling the stream consumer which framing the body uses.
pub const STREAM_MARKER_HEADER: &str = "x-vercel-ai-ui-message-stream";
pub const STREAM_PROTOCOL_VERSION: &str = "v1";
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
pub const NO_STORE_CACHE_CONTROL: &str = "no-store";

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub upstream_base_url: String,
    pub chat_path: String,
}

/// Stateless forwarder to the upstream chat service. Holds only the shared
/// HTTP client and the resolved upstream URL; every request is a single
/// attempt with no timeout and no retry.
pub struct Relay {
    http: HttpClient,
    chat_url: String,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Url::parse(&config.upstream_base_url)
            .map_err(|e| format!("invalid upstream base URL '{}': {}", config.upstream_base_url, e))?;
        let path = if config.chat_path.starts_with('/') {
            config.chat_path.clone()
        } else {
            format!("/{}", config.chat_path)
        };
        let chat_url = format!("{}{}", config.upstream_base_url.trim_end_matches('/'), path);
        Ok(Self {
            http: HttpClient::new(),
            chat_url,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Forward the inbound body byte-for-byte to the upstream chat route.
    pub async fn forward_chat(&self, body: String) -> Result<reqwest::Response, reqwest::Error> {
        debug!("Forwarding chat request to {}", self.chat_url);
        self.http
            .post(&self.chat_url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
    }
}

/// Turn the upstream response into the outbound one: mirror the status, copy
/// the headers minus hop-by-hop ones, force the three headers the stream
/// consumer requires, and pipe the body through without buffering.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut builder = Response::builder().status(status);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in upstream.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
        );
        headers.insert(
            HeaderName::from_static(STREAM_MARKER_HEADER),
            HeaderValue::from_static(STREAM_PROTOCOL_VERSION),
        );
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE_CACHE_CONTROL),
        );
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|_| {
            (StatusCode::BAD_GATEWAY, "Failed to build relay response").into_response()
        })
}

fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
