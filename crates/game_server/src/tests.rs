// End-to-end tests over real WebSocket connections
#[cfg(test)]
mod tests {
    use crate::*;
    use futures::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    struct TestServer {
        server: Arc<GameServer>,
        addr: SocketAddr,
        shutdown: ShutdownState,
        task: JoinHandle<Result<(), ServerError>>,
    }

    async fn spawn_server(config: ServerConfig) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let server = Arc::new(create_server_with_config(config));
        let shutdown = ShutdownState::new();

        let task = {
            let server = server.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { server.serve(listener, shutdown).await })
        };

        TestServer {
            server,
            addr,
            shutdown,
            task,
        }
    }

    impl TestServer {
        /// Waits until the server has processed every disconnect.
        async fn wait_for_connections(&self, expected: usize) {
            for _ in 0..100 {
                if self.server.connection_count().await == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            panic!("connection count never reached {expected}");
        }
    }

    struct TestClient {
        ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    }

    impl TestClient {
        async fn connect(addr: SocketAddr) -> Self {
            let (ws, _) = connect_async(format!("ws://{addr}/")).await.expect("websocket handshake");
            Self { ws }
        }

        async fn send_raw(&mut self, text: &str) {
            self.ws.send(Message::Text(text.to_string().into())).await.expect("send frame");
        }

        async fn next_frame(&mut self) -> Option<Message> {
            tokio::time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("frame within timeout")
                .map(|frame| frame.expect("valid frame"))
        }

        async fn recv_text(&mut self) -> String {
            loop {
                match self.next_frame().await {
                    Some(Message::Text(text)) => return text.as_str().to_string(),
                    Some(Message::Ping(_)) | Some(Message::Pong(_)) => continue,
                    other => panic!("expected text frame, got {other:?}"),
                }
            }
        }

        async fn recv_json(&mut self) -> Value {
            serde_json::from_str(&self.recv_text().await).expect("JSON frame")
        }

        async fn request(&mut self, message: Value) -> Value {
            self.send_raw(&message.to_string()).await;
            self.recv_json().await
        }

        async fn login(&mut self, udid: &str) -> String {
            let reply = self.request(json!({"Type": "Login", "Payload": {"UDID": udid}})).await;
            assert_eq!(reply["Status"], "Success", "login failed: {reply}");
            reply["PlayerId"].as_str().expect("player id").to_string()
        }

        async fn update(&mut self, player_id: &str, resource_type: &str, value: i64) -> Value {
            self.request(json!({
                "Type": "UpdateResources",
                "Payload": {"PlayerId": player_id, "ResourceType": resource_type, "ResourceValue": value}
            }))
            .await
        }

        async fn gift(&mut self, sender: &str, friend: &str, resource_type: &str, value: i64) -> Value {
            self.request(json!({
                "Type": "SendGift",
                "Payload": {
                    "SenderPlayerId": sender,
                    "FriendPlayerId": friend,
                    "ResourceType": resource_type,
                    "ResourceValue": value
                }
            }))
            .await
        }

        async fn close(mut self) {
            let _ = self.ws.close(None).await;
            while let Ok(Some(Ok(_))) = tokio::time::timeout(RECV_TIMEOUT, self.ws.next()).await {}
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_login_is_rejected() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;

        let first = client.login("device-111").await;
        let again = client.request(json!({"Type": "Login", "Payload": {"UDID": "device-111"}})).await;
        assert_eq!(again, json!({"Status": "Error", "Message": "Player is already connected"}));

        let other = client.login("device-222").await;
        assert_ne!(first, other);
        assert_eq!(server.server.registry().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_resources_and_overdraw() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;
        let player = client.login("device-111").await;

        assert_eq!(
            client.update(&player, "coins", 100).await,
            json!({"Status": "Success", "ResourceType": "coins", "Amount": 100})
        );
        assert_eq!(
            client.update(&player, "coins", -150).await,
            json!({"Status": "Error", "Message": "Insufficient coins"})
        );
        assert_eq!(
            client.update("unknown-id", "coins", 10).await,
            json!({"Status": "Error", "Message": "Player not found"})
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_gift_transfers_and_pushes_event() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut sender = TestClient::connect(server.addr).await;
        let mut friend = TestClient::connect(server.addr).await;

        let p1 = sender.login("device-111").await;
        let p2 = friend.login("device-222").await;
        sender.update(&p1, "coins", 100).await;

        assert_eq!(
            sender.gift(&p1, &p2, "coins", 50).await,
            json!({"Status": "Success", "Message": "Gift sent successfully"})
        );
        assert_eq!(
            friend.recv_json().await,
            json!({"EventType": "GiftEvent", "FromPlayerId": p1, "ResourceType": "coins", "ResourceValue": 50})
        );

        let registry = server.server.registry();
        assert_eq!(registry.get_player(&p1).unwrap().ledger().balance("coins").await, 50);
        assert_eq!(registry.get_player(&p2).unwrap().ledger().balance("coins").await, 50);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_resource_changes_nothing() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;
        let p1 = client.login("device-111").await;
        let p2 = client.login("device-222").await;
        client.update(&p1, "coins", 100).await;

        let expected = json!({"Status": "Error", "Message": "Invalid resource type"});
        assert_eq!(client.gift(&p1, &p2, "unobtainium", 10).await, expected);
        assert_eq!(client.update(&p1, "unobtainium", 10).await, expected);

        let registry = server.server.registry();
        let sender = registry.get_player(&p1).unwrap();
        assert_eq!(sender.ledger().balance("coins").await, 100);
        assert_eq!(sender.ledger().balance("unobtainium").await, 0);
        assert!(registry.get_player(&p2).unwrap().ledger().snapshot().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_repeated_gift_moves_funds_twice() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;
        let p1 = client.login("device-111").await;
        let p2 = client.login("device-222").await;
        client.update(&p1, "rolls", 30).await;

        // Both players share this connection, so each gift pushes an event before its reply.
        for _ in 0..2 {
            let message = json!({
                "Type": "SendGift",
                "Payload": {"SenderPlayerId": p1, "FriendPlayerId": p2, "ResourceType": "rolls", "ResourceValue": 10}
            });
            client.send_raw(&message.to_string()).await;
            assert_eq!(client.recv_json().await["EventType"], "GiftEvent");
            assert_eq!(client.recv_json().await["Status"], "Success");
        }

        let registry = server.server.registry();
        let sender = registry.get_player(&p1).unwrap().ledger().balance("rolls").await;
        let friend = registry.get_player(&p2).unwrap().ledger().balance("rolls").await;
        assert_eq!((sender, friend), (10, 20));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_envelope_errors_are_plain_text() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;

        client.send_raw("this is not json").await;
        assert_eq!(client.recv_text().await, "Invalid message format");

        client.send_raw(r#"{"Payload":{"UDID":"device-1"}}"#).await;
        assert_eq!(client.recv_text().await, "Invalid message format");

        client.send_raw(r#"{"Type":"Teleport","Payload":{}}"#).await;
        assert_eq!(client.recv_text().await, "Unknown message type");

        // The connection keeps serving after bad frames.
        client.login("device-1").await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_frame_limits_reject_before_dispatch() {
        let config = ServerConfig {
            security: config::SecurityConfig {
                max_string_length: 16,
                ..Default::default()
            },
            ..Default::default()
        };
        let server = spawn_server(config).await;
        let mut client = TestClient::connect(server.addr).await;

        let long_udid = "d".repeat(64);
        client
            .send_raw(&json!({"Type": "Login", "Payload": {"UDID": long_udid}}).to_string())
            .await;
        assert_eq!(client.recv_text().await, "Invalid message format");
        assert!(server.server.registry().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ping_is_answered() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;

        client.ws.send(Message::Ping(vec![1, 2, 3].into())).await.expect("send ping");
        match client.next_frame().await {
            Some(Message::Pong(data)) => assert_eq!(data.as_ref(), &[1, 2, 3]),
            other => panic!("expected pong, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disconnect_detaches_player_by_default() {
        let server = spawn_server(ServerConfig::default()).await;

        let mut first = TestClient::connect(server.addr).await;
        let player = first.login("device-111").await;
        first.close().await;
        server.wait_for_connections(0).await;

        let registry = server.server.registry();
        let kept = registry.get_player(&player).expect("player survives disconnect");
        assert!(kept.connection().is_none());

        let mut second = TestClient::connect(server.addr).await;
        let reply = second.request(json!({"Type": "Login", "Payload": {"UDID": "device-111"}})).await;
        assert_eq!(reply["Message"], "Player is already connected");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disconnect_evicts_when_configured() {
        let server = spawn_server(ServerConfig {
            evict_on_disconnect: true,
            ..Default::default()
        })
        .await;

        let mut first = TestClient::connect(server.addr).await;
        let player = first.login("device-111").await;
        first.close().await;
        server.wait_for_connections(0).await;

        assert!(server.server.registry().get_player(&player).is_none());

        let mut second = TestClient::connect(server.addr).await;
        let again = second.login("device-111").await;
        assert_ne!(again, player);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_gift_to_disconnected_friend_still_succeeds() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut sender = TestClient::connect(server.addr).await;
        let mut friend = TestClient::connect(server.addr).await;

        let p1 = sender.login("device-111").await;
        let p2 = friend.login("device-222").await;
        friend.close().await;
        server.wait_for_connections(1).await;

        sender.update(&p1, "coins", 20).await;
        assert_eq!(
            sender.gift(&p1, &p2, "coins", 20).await,
            json!({"Status": "Success", "Message": "Gift sent successfully"})
        );
        let friend = server.server.registry().get_player(&p2).unwrap();
        assert_eq!(friend.ledger().balance("coins").await, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_connections_do_not_lose_updates() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut owner = TestClient::connect(server.addr).await;
        let player = owner.login("device-111").await;

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let addr = server.addr;
            let player = player.clone();
            tasks.push(tokio::spawn(async move {
                let mut client = TestClient::connect(addr).await;
                for _ in 0..10 {
                    let reply = client.update(&player, "coins", 1).await;
                    assert_eq!(reply["Status"], "Success");
                }
            }));
        }
        for task in tasks {
            task.await.expect("client task panicked");
        }

        let ledger_owner = server.server.registry().get_player(&player).unwrap();
        assert_eq!(ledger_owner.ledger().balance("coins").await, 80);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connection_limit_closes_extra_clients() {
        let server = spawn_server(ServerConfig {
            max_connections: 1,
            ..Default::default()
        })
        .await;

        let mut admitted = TestClient::connect(server.addr).await;
        admitted.login("device-1").await;

        let mut refused = TestClient::connect(server.addr).await;
        match tokio::time::timeout(RECV_TIMEOUT, refused.ws.next()).await.expect("close within timeout") {
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {}
            other => panic!("expected the extra client to be closed, got {other:?}"),
        }
        assert_eq!(server.server.connection_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_closes_connections_and_stops_loop() {
        let server = spawn_server(ServerConfig::default()).await;
        let mut client = TestClient::connect(server.addr).await;
        client.login("device-1").await;

        server.server.shutdown().await.expect("shutdown");
        match client.next_frame().await {
            Some(Message::Close(_)) | None => {}
            other => panic!("expected close, got {other:?}"),
        }

        let result = tokio::time::timeout(Duration::from_secs(15), server.task)
            .await
            .expect("server stopped")
            .expect("server task did not panic");
        assert!(result.is_ok());
        assert!(server.shutdown.is_shutdown_complete());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:5000");
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.valid_resource_types, vec!["coins", "rolls"]);
        assert!(!config.evict_on_disconnect);
        assert_eq!(config.security.max_message_size, 64 * 1024);
    }
}
