use axum::body::Body;
use axum::http::{ header, Request, StatusCode };
use chat_relay::relay::{ Relay, RelayConfig, STREAM_MARKER_HEADER };
use chat_relay::server::api;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{ body_string, header as header_eq, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

fn router_for(upstream_base: &str) -> axum::Router {
    let relay = Relay::new(RelayConfig {
        upstream_base_url: upstream_base.to_string(),
        chat_path: "/chat".to_string(),
    })
    .unwrap();
    api::router(Arc::new(relay))
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn success_response_keeps_status_and_rewrites_the_three_headers() {
    let upstream = MockServer::start().await;
    let sse_body = "data: {\"type\":\"start\",\"messageId\":\"m1\"}\n\ndata: [DONE]\n\n";
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cache-control", "public, max-age=60")
                .insert_header("x-vercel-ai-ui-message-stream", "v0")
                .insert_header("x-session-id", "s1")
                .set_body_raw(sse_body, "application/octet-stream"),
        )
        .mount(&upstream)
        .await;

    let response = router_for(&upstream.uri())
        .oneshot(chat_request("{\"messages\":[]}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/event-stream");
    assert_eq!(headers.get(STREAM_MARKER_HEADER).unwrap(), "v1");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    // unrelated upstream headers pass through
    assert_eq!(headers.get("x-session-id").unwrap(), "s1");
    assert_eq!(body_bytes(response).await, sse_body.as_bytes());
}

#[tokio::test]
async fn request_body_reaches_the_upstream_byte_for_byte() {
    let upstream = MockServer::start().await;
    let payload = "{\"messages\":[{\"id\":\"u1\",\"role\":\"user\",\"parts\":[{\"type\":\"text\",\"text\":\"hi\"}]}]}";
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header_eq("content-type", "application/json"))
        .and(body_string(payload))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/plain"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = router_for(&upstream.uri())
        .oneshot(chat_request(payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upstream_error_status_and_body_are_relayed_unchanged() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("upstream exploded", "text/plain"))
        .mount(&upstream)
        .await;

    let response = router_for(&upstream.uri())
        .oneshot(chat_request("{\"messages\":[]}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(body_bytes(response).await, b"upstream exploded");
}

#[tokio::test]
async fn unreachable_upstream_surfaces_an_error_not_an_empty_200() {
    // grab a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = router_for(&format!("http://{}", addr))
        .oneshot(chat_request("{\"messages\":[]}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_bytes(response).await;
    assert!(!body.is_empty());
}

#[tokio::test]
async fn health_endpoint_answers() {
    let response = router_for("http://127.0.0.1:9")
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(body, br#"{"status":"ok"}"#);
}
