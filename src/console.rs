use chat_relay::client::session::{ ChatSession, ChatStatus };
use chat_relay::client::transport::{ HttpRelayTransport, RelayTransport };
use chat_relay::client::view::{ self, ConversationView };
use chat_relay::stream::StreamEvent;
use clap::Parser;
use dotenv::dotenv;
use futures::StreamExt;
use log::error;
use std::error::Error;
use std::io::{ self, Write };

/// Minimal terminal front end over the chat client library: reads a line,
/// submits it through the relay, prints the response as it streams in.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct ClientArgs {
    /// Base URL of the relay endpoint.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:4000")]
    relay_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = ClientArgs::parse();

    let transport = HttpRelayTransport::new(args.relay_url.clone());
    let mut session = ChatSession::new();

    if let ConversationView::Empty(empty) = view::render(&session).view {
        println!("{} {}", empty.icon, empty.title);
        println!("{}", empty.description);
    }
    println!("Connected to {}. Type a message and press enter; /quit exits.", args.relay_url);

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if line == "/quit" {
            break;
        }

        session.set_input(line.clone());
        let Some(request) = session.begin_submit(&line) else {
            continue;
        };

        if view::render(&session).show_loader {
            println!("...");
        }

        let mut events = match transport.send_chat(request).await {
            Ok(events) => events,
            Err(e) => {
                session.fail_turn(e.to_string());
                error!("Request failed: {}", e);
                continue;
            }
        };

        let mut printed_any = false;
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let StreamEvent::TextDelta { delta, .. } = &event {
                        print!("{}", delta);
                        io::stdout().flush()?;
                        printed_any = true;
                    }
                    session.apply_event(event);
                }
                Err(e) => {
                    session.fail_turn(e.to_string());
                    error!("Stream failed: {}", e);
                    break;
                }
            }
        }
        session.complete_turn();
        if printed_any {
            println!();
        }
        if session.status() == ChatStatus::Failed {
            if let Some(reason) = session.last_error() {
                eprintln!("[error] {}", reason);
            }
        }
    }

    Ok(())
}
