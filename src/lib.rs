pub mod cli;
pub mod client;
pub mod models;
pub mod relay;
pub mod server;
pub mod stream;

use cli::Args;
use log::info;
use relay::{ Relay, RelayConfig };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Upstream Base URL: {}", args.upstream_base_url);
    info!("Upstream Chat Path: {}", args.upstream_chat_path);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = Arc::new(
        Relay::new(RelayConfig {
            upstream_base_url: args.upstream_base_url.clone(),
            chat_path: args.upstream_chat_path.clone(),
        })?
    );
    let addr = args.server_addr.clone();
    info!("Starting relay server on: {}", addr);
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
