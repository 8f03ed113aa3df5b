use crate::cli::Args;
use crate::relay::{ self, Relay };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::State,
    response::IntoResponse,
    http::StatusCode,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Clone)]
struct AppState {
    relay: Arc<Relay>,
}

pub fn router(relay: Arc<Relay>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    addr: &str,
    relay: Arc<Relay>,
    args: Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(relay);

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS relay server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await?;
    } else {
        info!("Starting HTTP relay server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn chat_handler(State(state): State<AppState>, body: String) -> axum::response::Response {
    match state.relay.forward_chat(body).await {
        Ok(upstream) => relay::relay_response(upstream),
        Err(e) => {
            error!("Upstream chat request failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Upstream chat request failed: {}", e),
            ).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "ok" })
}
