//! # Gift Server - Demo Client
//!
//! Walks through the complete gifting flow against a running server:
//! two devices log in, the sender tops up a resource, gifts part of it to
//! the friend, and the friend receives the live `GiftEvent` push.
//!
//! ```bash
//! gift_client --url ws://127.0.0.1:5000/ --resource coins --amount 100 --gift 50
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gift-client")]
#[command(about = "Gift Server - Login, top-up and gifting walkthrough")]
struct Args {
    /// Server WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:5000/")]
    url: String,

    /// Device id of the player sending the gift
    #[arg(long, default_value = "device-111")]
    sender_device: String,

    /// Device id of the player receiving the gift
    #[arg(long, default_value = "device-222")]
    friend_device: String,

    /// Resource type to top up and gift
    #[arg(short, long, default_value = "coins")]
    resource: String,

    /// Amount credited to the sender before gifting
    #[arg(short, long, default_value = "100")]
    amount: i64,

    /// Amount gifted to the friend
    #[arg(short, long, default_value = "50")]
    gift: i64,

    /// Seconds to wait for each reply or push
    #[arg(long, default_value = "5")]
    wait: u64,
}

/// Outbound envelope `{"Type": ..., "Payload": {...}}`.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Payload")]
    payload: Value,
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One device's connection to the server.
struct Session {
    name: &'static str,
    socket: Socket,
    wait: Duration,
}

impl Session {
    async fn connect(name: &'static str, url: &str, wait: Duration) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("{name}: failed to connect to {url}"))?;
        info!("🔗 {} connected to {}", name, url);
        Ok(Self { name, socket, wait })
    }

    async fn send(&mut self, kind: &str, payload: Value) -> Result<()> {
        let text = serde_json::to_string(&Envelope { kind, payload })?;
        info!("📤 {} → {}", self.name, text);
        self.socket.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Next JSON text frame, answering pings on the way.
    async fn next_json(&mut self) -> Result<Value> {
        loop {
            let frame = timeout(self.wait, self.socket.next())
                .await
                .map_err(|_| anyhow!("{}: nothing received within {:?}", self.name, self.wait))?
                .ok_or_else(|| anyhow!("{}: connection closed by server", self.name))??;

            match frame {
                Message::Text(text) => {
                    info!("📥 {} ← {}", self.name, text.as_str());
                    return serde_json::from_str(text.as_str())
                        .with_context(|| format!("{}: server sent a non-JSON reply", self.name));
                }
                Message::Ping(data) => self.socket.send(Message::Pong(data)).await?,
                Message::Close(frame) => bail!("{}: server closed the connection: {:?}", self.name, frame),
                _ => {}
            }
        }
    }

    /// Sends a request and returns its reply, failing on an error status.
    async fn request(&mut self, kind: &str, payload: Value) -> Result<Value> {
        self.send(kind, payload).await?;
        loop {
            let reply = self.next_json().await?;
            if reply.get("EventType").is_some() {
                // A push that arrived ahead of the reply.
                info!("🎁 {} received {}", self.name, reply);
                continue;
            }
            return match reply.get("Status").and_then(Value::as_str) {
                Some("Success") => Ok(reply),
                _ => Err(anyhow!("{}: {} failed: {}", self.name, kind, reply)),
            };
        }
    }

    async fn login(&mut self, device_id: &str) -> Result<String> {
        let reply = self.request("Login", json!({ "UDID": device_id })).await?;
        let player_id = reply
            .get("PlayerId")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("{}: login reply without PlayerId", self.name))?
            .to_string();
        info!("🎮 {} logged in as {}", self.name, player_id);
        Ok(player_id)
    }

    async fn close(mut self) {
        if let Err(e) = self.socket.close(None).await {
            warn!("{}: close failed: {}", self.name, e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    if args.gift <= 0 {
        bail!("--gift must be positive");
    }
    let wait = Duration::from_secs(args.wait);

    info!("🚀 Starting Gift Client Walkthrough");
    info!("   • Server: {}", args.url);
    info!("   • Resource: {} (top-up {}, gift {})", args.resource, args.amount, args.gift);

    let mut sender = Session::connect("sender", &args.url, wait).await?;
    let mut friend = Session::connect("friend", &args.url, wait).await?;

    let sender_id = sender.login(&args.sender_device).await?;
    let friend_id = friend.login(&args.friend_device).await?;

    let topped_up = sender
        .request(
            "UpdateResources",
            json!({
                "PlayerId": sender_id,
                "ResourceType": args.resource,
                "ResourceValue": args.amount,
            }),
        )
        .await?;
    info!("💰 Sender balance: {}", topped_up["Amount"]);

    let gifted = sender
        .request(
            "SendGift",
            json!({
                "SenderPlayerId": sender_id,
                "FriendPlayerId": friend_id,
                "ResourceType": args.resource,
                "ResourceValue": args.gift,
            }),
        )
        .await?;
    info!("✅ {}", gifted["Message"]);

    let event = friend.next_json().await?;
    if event.get("EventType").and_then(Value::as_str) != Some("GiftEvent") {
        bail!("friend expected a GiftEvent, got {event}");
    }
    info!(
        "🎁 Friend received {} {} from {}",
        event["ResourceValue"], event["ResourceType"], event["FromPlayerId"]
    );

    sender.close().await;
    friend.close().await;

    info!("✅ Gift Client Walkthrough Complete!");
    Ok(())
}
