use anyhow::Context;
use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_relay::{RelayService, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two-party WebRTC signaling relay.
#[derive(Parser, Debug)]
#[command(name = "huddle-relay", version)]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    listen: SocketAddr,

    /// STUN/TURN server URL handed to clients (repeatable).
    #[arg(long = "ice-server", default_value = "stun:stun.l.google.com:19302")]
    ice_servers: Vec<String>,

    /// TURN username, if the ICE servers need one.
    #[arg(long)]
    turn_username: Option<String>,

    /// TURN credential, if the ICE servers need one.
    #[arg(long)]
    turn_credential: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let ice_servers = vec![IceServerConfig {
        urls: args.ice_servers,
        username: args.turn_username,
        credential: args.turn_credential,
    }];

    let relay = RelayService::new(ice_servers);
    let app = router(relay);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("signaling relay listening on http://{}", args.listen);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
