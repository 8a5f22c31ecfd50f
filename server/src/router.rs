//! Instance Router: dispatches one decoded [`Message`] from a connected client to the
//! right place — an instance, the registry, or straight back to the sender. This is the
//! routing table the connection task's read loop consults for every line it decodes; it
//! owns no sockets itself.

use std::collections::HashMap;
use std::sync::Arc;

use shared::map::MapDescriptor;
use shared::message::InputMask;
use shared::Message;
use tokio::sync::{mpsc::UnboundedSender, Mutex};

use crate::error::ProtocolError;
use crate::instance::InstanceHandle;
use crate::map_catalog::MapCatalog;
use crate::registry::ClientRegistry;

/// Shared state every connection task routes against. Cloned (cheaply, via `Arc`) into
/// each connection.
#[derive(Clone)]
pub struct Router {
    registry: Arc<Mutex<ClientRegistry>>,
    instances: Arc<Mutex<HashMap<String, InstanceHandle>>>,
    catalog: Arc<MapCatalog>,
    player_speed: f32,
    tick_interval: std::time::Duration,
}

impl Router {
    pub fn new(
        registry: Arc<Mutex<ClientRegistry>>,
        instances: Arc<Mutex<HashMap<String, InstanceHandle>>>,
        catalog: Arc<MapCatalog>,
        player_speed: f32,
        tick_interval: std::time::Duration,
    ) -> Self {
        Self {
            registry,
            instances,
            catalog,
            player_speed,
            tick_interval,
        }
    }

    /// Lazily creates (or reuses) the running instance for `map_id`.
    async fn instance_for(&self, map: &MapDescriptor) -> InstanceHandle {
        let mut instances = self.instances.lock().await;
        if let Some(handle) = instances.get(&map.id) {
            return handle.clone();
        }
        let handle = crate::instance::spawn(map.clone(), self.player_speed, self.tick_interval);
        instances.insert(map.id.clone(), handle.clone());
        handle
    }

    /// Handles a `join`. Rejects a client that already belongs to an instance, resolves
    /// the requested map (falling back to the default, per §4.2), and returns the
    /// instance handle the connection should retain for subsequent input routing.
    /// `map_data` and `game_state` are sent to the client's own outbound channel by the
    /// instance itself, ahead of any broadcast traffic — the connection task does not
    /// send them.
    pub async fn join(
        &self,
        client_id: &str,
        requested_map: Option<&str>,
    ) -> Result<InstanceHandle, ProtocolError> {
        if self.registry.lock().await.instance_of(client_id).is_some() {
            return Err(ProtocolError::AlreadyJoined);
        }

        let map = self
            .catalog
            .resolve(requested_map)
            .cloned()
            .ok_or(ProtocolError::NoMapsAvailable)?;

        let handle = self.instance_for(&map).await;

        let outbound = {
            let registry = self.registry.lock().await;
            registry
                .outbound_of(client_id)
                .ok_or(ProtocolError::InputOnNoPlayer)?
        };

        handle
            .join(client_id.to_string(), outbound)
            .await
            .ok_or(ProtocolError::NoMapsAvailable)?;

        self.registry
            .lock()
            .await
            .set_instance(client_id, Some(map.id.clone()));

        Ok(handle)
    }

    /// Routes one input frame to the sender's instance. Logs and drops it if the sender
    /// has not joined one (§7: a protocol violation, not a fatal one).
    pub fn input(&self, client_id: &str, seq: u32, k: InputMask, dt: f32, handle: Option<&InstanceHandle>) {
        match handle {
            Some(handle) => handle.input(client_id.to_string(), seq, k, dt),
            None => log::warn!("client {client_id} sent input before joining an instance"),
        }
    }

    /// Routes a chat message: instance-scoped if the sender has joined one, global
    /// (registry-wide) broadcast otherwise (§2b).
    pub async fn chat(&self, client_id: &str, text: String, handle: Option<&InstanceHandle>) {
        match handle {
            Some(handle) => handle.chat(client_id.to_string(), text),
            None => {
                self.registry.lock().await.broadcast_except(
                    client_id,
                    Message::Chat {
                        from: Some(client_id.to_string()),
                        text,
                    },
                );
            }
        }
    }

    pub fn list_maps(&self) -> Message {
        Message::MapsList {
            maps: self.catalog.list(),
        }
    }

    /// Cleanup path for a disconnecting client: notifies its instance (if any) and
    /// removes it from the registry. Safe to call at most once per connection.
    pub async fn leave(&self, client_id: &str, handle: Option<&InstanceHandle>) {
        if let Some(handle) = handle {
            handle.leave(client_id.to_string());
        }
        self.registry.lock().await.remove(client_id);
    }

    pub async fn register(&self, outbound: UnboundedSender<Message>) -> String {
        self.registry.lock().await.register(outbound)
    }

    /// Signals every currently running instance to stop its tick loop. Part of the
    /// shutdown sequence (§5): called after the accept socket is closed and before
    /// connections are torn down, so no instance keeps ticking into an empty room.
    pub async fn stop_all_instances(&self) {
        for handle in self.instances.lock().await.values() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_catalog::{BuiltinMaps, MapCatalog, MapSource};
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    fn router(catalog: MapCatalog) -> Router {
        Router::new(
            Arc::new(Mutex::new(ClientRegistry::new())),
            Arc::new(Mutex::new(HashMap::new())),
            Arc::new(catalog),
            shared::PLAYER_SPEED,
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn join_resolves_default_map_and_sends_map_data_then_game_state() {
        let router = router(MapCatalog::load(&BuiltinMaps));
        let (tx, mut rx) = unbounded_channel();
        let client_id = router.register(tx).await;

        let _handle = router.join(&client_id, None).await.unwrap();

        match rx.recv().await.unwrap() {
            Message::MapData { map } => assert_eq!(map.id, "m1"),
            other => panic!("expected map_data, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            Message::GameState { your_player, players } => {
                assert_eq!(your_player.id, client_id);
                assert_eq!(players.len(), 1);
            }
            other => panic!("expected game_state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_twice_is_rejected_as_already_joined() {
        let router = router(MapCatalog::load(&BuiltinMaps));
        let (tx, _rx) = unbounded_channel();
        let client_id = router.register(tx).await;

        router.join(&client_id, None).await.unwrap();
        let second = router.join(&client_id, None).await;
        assert!(matches!(second, Err(ProtocolError::AlreadyJoined)));
    }

    #[tokio::test]
    async fn join_with_empty_catalog_fails() {
        struct Empty;
        impl MapSource for Empty {
            fn load(&self) -> Vec<MapDescriptor> {
                vec![]
            }
        }
        let router = router(MapCatalog::load(&Empty));
        let (tx, _rx) = unbounded_channel();
        let client_id = router.register(tx).await;

        let result = router.join(&client_id, None).await;
        assert!(matches!(result, Err(ProtocolError::NoMapsAvailable)));
    }

    #[tokio::test]
    async fn chat_without_instance_broadcasts_globally() {
        let router = router(MapCatalog::load(&BuiltinMaps));
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, mut rx2) = unbounded_channel();
        let id1 = router.register(tx1).await;
        let _id2 = router.register(tx2).await;

        router.chat(&id1, "hello".to_string(), None).await;

        match rx2.try_recv().unwrap() {
            Message::Chat { from, text } => {
                assert_eq!(from.as_deref(), Some(id1.as_str()));
                assert_eq!(text, "hello");
            }
            other => panic!("expected chat, got {other:?}"),
        }
    }

    #[test]
    fn list_maps_returns_full_catalog() {
        let router = router(MapCatalog::load(&BuiltinMaps));
        match router.list_maps() {
            Message::MapsList { maps } => assert_eq!(maps.len(), 2),
            other => panic!("expected maps_list, got {other:?}"),
        }
    }
}
