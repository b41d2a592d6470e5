//! Nagare relay server.
//!
//! Relays direct and group messages between WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin nagare-server
//! cargo run --bin nagare-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use nagare_server::{
    config::{DEFAULT_MAX_MESSAGE_SIZE, ServerConfig},
    domain::DEFAULT_OUTBOUND_QUEUE_CAPACITY,
    ui::{Server, state::AppState},
};
use nagare_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "nagare-server")]
#[command(about = "WebSocket relay server for direct and group messaging", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Outbound queue length per connection; a client whose queue fills up is disconnected
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Maximum size of one inbound WebSocket frame in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Config
    // 2. AppState (repositories, session registry, use cases)
    // 3. Server

    // 1. Validate configuration
    let config = match ServerConfig::new(
        args.host,
        args.port,
        args.queue_capacity,
        args.max_message_size,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Starting with {:?}", config);

    // 2. Wire the in-memory hub
    let app_state = AppState::in_memory(&config, Arc::new(SystemClock));

    // 3. Create and run the server
    let server = Server::new(app_state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
