//! One negotiation participant.
//!
//! Run a relay (`huddle-relay`), start this twice, and hand each process the
//! address the other one printed. The first instance prompts for its
//! counterpart's address on stdin; the second gets both the address and
//! `--initiate` on the command line:
//!
//! ```text
//! cargo run --example participant
//! cargo run --example participant -- --peer <ADDRESS_A> --initiate
//! ```
//!
//! Paste address B into the first terminal before starting the second, so the
//! offer has somewhere to land.

use clap::Parser;
use huddle_core::Address;
use huddle_peer::{ChannelEvent, NoMedia, RtcBackend, Session, SignalChannel, WsChannel};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    /// Relay WebSocket URL.
    #[arg(long, default_value = "ws://127.0.0.1:3000/signal")]
    relay: String,

    /// Counterpart's relay-assigned address.
    #[arg(long)]
    peer: Option<String>,

    /// Send the offer (the other side must be waiting already).
    #[arg(long)]
    initiate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let (channel, mut events) = WsChannel::connect(&args.relay).await?;
    println!("local address: {}", channel.local_address());

    // The relay pushes its ICE configuration right after Welcome.
    let ice_servers = match events.recv().await {
        Some(ChannelEvent::IceConfig { ice_servers }) => ice_servers,
        _ => Vec::new(),
    };

    let peer = match args.peer {
        Some(peer) => peer,
        None => {
            println!("peer address: ");
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let remote = Address::from(peer);

    let (peer_tx, peer_rx) = mpsc::channel(64);
    let backend = Box::new(RtcBackend::new(ice_servers, peer_tx).await?);
    let channel = Arc::new(channel);

    let session = if args.initiate {
        Session::start(channel, events, backend, peer_rx, remote, &NoMedia).await?
    } else {
        Session::join(channel, events, backend, peer_rx, remote, &NoMedia).await?
    };

    info!("session running until the connection or channel closes");
    session.run().await?;
    Ok(())
}
