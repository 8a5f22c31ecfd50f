//! End-to-end scenarios against a real bound `TcpListener`, exercised through the
//! client crate's own `Connection` rather than raw sockets, matching the contracts
//! listed in the message codec table and the chat/already-joined/no-maps supplements.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use client::network::Connection;
use server::map_catalog::{BuiltinMaps, MapCatalog, MapSource};
use server::registry::ClientRegistry;
use server::router::Router;
use shared::message::{InputMask, Message};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Spins up a real server bound to an ephemeral port, backed by the builtin two-map
/// catalog and a fast tick interval so tests don't wait on the default 60 Hz cadence.
/// The accept loop runs for the lifetime of the test process on a background task,
/// which is fine for an ephemeral-port test server.
async fn spawn_server(tick_interval: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let registry = Arc::new(Mutex::new(ClientRegistry::new()));
    let instances = Arc::new(Mutex::new(HashMap::new()));
    let catalog = Arc::new(MapCatalog::load(&BuiltinMaps));
    let router = Router::new(registry, instances, catalog, shared::PLAYER_SPEED, tick_interval);

    tokio::spawn(async move {
        loop {
            let (socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => continue,
            };
            tokio::spawn(server::connection::run(socket, router.clone()));
        }
    });

    addr
}

async fn connect_and_welcome(addr: &str) -> (Connection, String) {
    let mut conn = Connection::connect(addr).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::Welcome { your_id, available_maps } => {
            assert_eq!(available_maps.len(), 2);
            (conn, your_id)
        }
        other => panic!("expected welcome, got {other:?}"),
    }
}

async fn join_default_map(conn: &mut Connection) -> (shared::message::MapPayload, Message) {
    conn.send(&Message::Join { map: None }).await.unwrap();
    let map = match conn.recv().await.unwrap() {
        Message::MapData { map } => map,
        other => panic!("expected map_data, got {other:?}"),
    };
    let game_state = conn.recv().await.unwrap();
    assert!(matches!(game_state, Message::GameState { .. }));
    (map, game_state)
}

/// Drains messages until the next `game_update`, skipping earlier snapshots that may
/// have landed before the input was applied.
async fn recv_next_game_update(conn: &mut Connection) -> Message {
    loop {
        let msg = conn.recv().await.expect("connection closed unexpectedly");
        if matches!(msg, Message::GameUpdate { .. }) {
            return msg;
        }
    }
}

#[tokio::test]
async fn welcome_is_sent_before_anything_else_and_lists_both_maps() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (_conn, your_id) = connect_and_welcome(&addr).await;
    assert!(!your_id.is_empty());
}

#[tokio::test]
async fn join_yields_map_data_then_game_state_in_order() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, your_id) = connect_and_welcome(&addr).await;

    let (map, game_state) = join_default_map(&mut conn).await;
    assert_eq!(map.id, "m1");
    match game_state {
        Message::GameState { your_player, players } => {
            assert_eq!(your_player.id, your_id);
            assert_eq!(players.len(), 1);
            assert!(players.contains_key(&your_id));
        }
        other => panic!("expected game_state, got {other:?}"),
    }
}

#[tokio::test]
async fn joining_a_named_map_resolves_that_map() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, _id) = connect_and_welcome(&addr).await;

    conn.send(&Message::Join { map: Some("m2".to_string()) }).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::MapData { map } => assert_eq!(map.id, "m2"),
        other => panic!("expected map_data, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_map_id_falls_back_to_default() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, _id) = connect_and_welcome(&addr).await;

    conn.send(&Message::Join { map: Some("does_not_exist".to_string()) }).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::MapData { map } => assert_eq!(map.id, "m1"),
        other => panic!("expected map_data, got {other:?}"),
    }
}

#[tokio::test]
async fn movement_advances_position_and_snapshot_reflects_it() {
    let tick = Duration::from_millis(16);
    let addr = spawn_server(tick).await;
    let (mut conn, your_id) = connect_and_welcome(&addr).await;
    join_default_map(&mut conn).await;

    conn.send(&Message::In { seq: 1, k: InputMask::RIGHT, dt: 1.0 / 60.0, ack: None })
        .await
        .unwrap();

    let snapshot = recv_next_game_update(&mut conn).await;
    match snapshot {
        Message::GameUpdate { players, .. } => {
            let me = players.get(&your_id).unwrap();
            assert!(me.x > 100.0, "expected x to have advanced from spawn, got {}", me.x);
            assert_eq!(me.last_input_seq, 1);
        }
        other => panic!("expected game_update, got {other:?}"),
    }
}

#[tokio::test]
async fn diagonal_movement_is_not_faster_than_cardinal() {
    let tick = Duration::from_millis(16);
    let addr = spawn_server(tick).await;
    let (mut conn, your_id) = connect_and_welcome(&addr).await;
    join_default_map(&mut conn).await;

    conn.send(&Message::In {
        seq: 1,
        k: InputMask::UP | InputMask::RIGHT,
        dt: 1.0 / 60.0,
        ack: None,
    })
    .await
    .unwrap();

    let snapshot = recv_next_game_update(&mut conn).await;
    if let Message::GameUpdate { players, .. } = snapshot {
        let me = players.get(&your_id).unwrap();
        let dx = me.x - 100.0;
        let dy = 100.0 - me.y;
        let dist = (dx * dx + dy * dy).sqrt();
        let expected = shared::PLAYER_SPEED * (1.0 / 60.0);
        assert!((dist - expected).abs() < 1.0, "dist={dist} expected={expected}");
    } else {
        panic!("expected game_update");
    }
}

#[tokio::test]
async fn collision_with_a_wall_rejects_movement_into_it() {
    let tick = Duration::from_millis(16);
    let addr = spawn_server(tick).await;
    let (mut conn, your_id) = connect_and_welcome(&addr).await;
    join_default_map(&mut conn).await;

    // Forest's wall spans (200,100)-(300,200); push the player straight at it for
    // longer than one tick so it actually reaches the boundary.
    for seq in 1..=40u32 {
        conn.send(&Message::In { seq, k: InputMask::RIGHT, dt: 1.0 / 60.0, ack: None })
            .await
            .unwrap();
        sleep(Duration::from_millis(2)).await;
    }

    let mut last_x = 0.0;
    for _ in 0..5 {
        if let Message::GameUpdate { players, .. } = recv_next_game_update(&mut conn).await {
            last_x = players.get(&your_id).unwrap().x;
        }
    }
    assert!(last_x <= 200.0, "player penetrated the wall: x={last_x}");
}

#[tokio::test]
async fn disconnect_broadcasts_player_left_to_remaining_members() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut a, _id_a) = connect_and_welcome(&addr).await;
    join_default_map(&mut a).await;

    let (mut b, id_b) = connect_and_welcome(&addr).await;
    join_default_map(&mut b).await;

    match a.recv().await.unwrap() {
        Message::PlayerJoined { player } => assert_eq!(player.id, id_b),
        other => panic!("expected player_joined, got {other:?}"),
    }

    drop(b);

    let mut saw_left = false;
    for _ in 0..20 {
        if let Some(Message::PlayerLeft { player_id }) = a.try_recv() {
            assert_eq!(player_id, id_b);
            saw_left = true;
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(saw_left, "expected player_left after b disconnected");
}

#[tokio::test]
async fn chat_within_an_instance_reaches_other_members_not_the_sender() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut a, _id_a) = connect_and_welcome(&addr).await;
    join_default_map(&mut a).await;
    let (mut b, id_b) = connect_and_welcome(&addr).await;
    join_default_map(&mut b).await;

    // drain the player_joined broadcast to `a` before sending chat.
    assert!(matches!(a.recv().await.unwrap(), Message::PlayerJoined { .. }));

    b.send(&Message::Chat { from: None, text: "hi".to_string() }).await.unwrap();

    let mut received = None;
    for _ in 0..20 {
        if let Some(msg) = a.try_recv() {
            received = Some(msg);
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    match received {
        Some(Message::Chat { from, text }) => {
            assert_eq!(from.as_deref(), Some(id_b.as_str()));
            assert_eq!(text, "hi");
        }
        other => panic!("expected chat, got {other:?}"),
    }
    assert!(b.try_recv().is_none(), "sender should not receive its own chat");
}

#[tokio::test]
async fn chat_with_no_instance_broadcasts_globally() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut a, _id_a) = connect_and_welcome(&addr).await;
    let (mut b, id_b) = connect_and_welcome(&addr).await;

    b.send(&Message::Chat { from: None, text: "lobby".to_string() }).await.unwrap();

    let mut received = None;
    for _ in 0..20 {
        if let Some(msg) = a.try_recv() {
            received = Some(msg);
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    match received {
        Some(Message::Chat { from, text }) => {
            assert_eq!(from.as_deref(), Some(id_b.as_str()));
            assert_eq!(text, "lobby");
        }
        other => panic!("expected chat, got {other:?}"),
    }
}

#[tokio::test]
async fn joining_twice_is_rejected_without_state_change() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, _id) = connect_and_welcome(&addr).await;
    join_default_map(&mut conn).await;

    conn.send(&Message::Join { map: None }).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::Error { reason } => assert_eq!(reason, "already_joined"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_catalog_rejects_join_with_no_maps_available() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    struct Empty;
    impl MapSource for Empty {
        fn load(&self) -> Vec<shared::MapDescriptor> {
            vec![]
        }
    }
    let registry = Arc::new(Mutex::new(ClientRegistry::new()));
    let instances = Arc::new(Mutex::new(HashMap::new()));
    let catalog = Arc::new(MapCatalog::load(&Empty));
    let router = Router::new(registry, instances, catalog, shared::PLAYER_SPEED, Duration::from_millis(10));

    tokio::spawn(async move {
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::spawn(server::connection::run(socket, router.clone()));
        }
    });

    let (mut conn, _id) = connect_and_welcome(&addr).await;
    conn.send(&Message::Join { map: None }).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::Error { reason } => assert_eq!(reason, "no_maps_available"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, _id) = connect_and_welcome(&addr).await;
    conn.send(&Message::Ping).await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), Message::Pong);
}

#[tokio::test]
async fn list_maps_returns_both_builtin_maps() {
    let addr = spawn_server(Duration::from_millis(10)).await;
    let (mut conn, _id) = connect_and_welcome(&addr).await;
    conn.send(&Message::ListMaps).await.unwrap();
    match conn.recv().await.unwrap() {
        Message::MapsList { maps } => {
            assert_eq!(maps.len(), 2);
            assert_eq!(maps.get("m1").map(String::as_str), Some("Forest"));
        }
        other => panic!("expected maps_list, got {other:?}"),
    }
}
