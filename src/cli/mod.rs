use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the relay server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Base URL of the upstream chat service (e.g., http://127.0.0.1:8000).
    #[arg(long, env = "UPSTREAM_BASE_URL")]
    pub upstream_base_url: String,

    /// Route on the upstream base URL that accepts chat requests.
    #[arg(long, env = "UPSTREAM_CHAT_PATH", default_value = "/chat")]
    pub upstream_chat_path: String,

    /// Optional path to the TLS certificate file (PEM format) for serving HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for serving HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
