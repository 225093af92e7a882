//! ludod Server Binary
//!
//! Runs the HTTP server hosting live ludo rooms, with WebSocket push for
//! real-time play.

use clap::Parser;

/// Authoritative multiplayer ludo session server.
#[derive(Parser)]
#[command(name = "ludod")]
struct Cli {
    /// Listen port; falls back to the PORT environment variable, then 8080.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    ludo_core::log();
    ludo_core::kys();
    let cli = Cli::parse();
    let port = cli
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8080);
    ludo_server::run(port).await.unwrap();
}
