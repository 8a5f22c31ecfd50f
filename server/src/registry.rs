//! Client Registry: the process-wide mapping from client id to its outbound channel and
//! current instance membership. The single owning coordinator design notes call for —
//! state lives here, behind one lock, rather than scattered across global singletons.

use std::collections::HashMap;

use shared::Message;
use tokio::sync::mpsc::UnboundedSender;

struct ClientEntry {
    outbound: UnboundedSender<Message>,
    instance_id: Option<String>,
}

/// Each entry holds the `UnboundedSender` half of that client's writer task rather than
/// a raw socket address — sending into it is how the registry (or anyone holding a
/// clone) delivers a message.
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<String, ClientEntry>,
    next_id: u64,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers a newly accepted connection and returns its assigned id, `"p{N}"`.
    pub fn register(&mut self, outbound: UnboundedSender<Message>) -> String {
        let id = format!("p{}", self.next_id);
        self.next_id += 1;
        self.clients.insert(
            id.clone(),
            ClientEntry {
                outbound,
                instance_id: None,
            },
        );
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.clients.remove(id).and_then(|e| e.instance_id)
    }

    pub fn instance_of(&self, id: &str) -> Option<String> {
        self.clients.get(id).and_then(|e| e.instance_id.clone())
    }

    pub fn set_instance(&mut self, id: &str, instance_id: Option<String>) {
        if let Some(entry) = self.clients.get_mut(id) {
            entry.instance_id = instance_id;
        }
    }

    /// Clones out the outbound sender for `id`, if registered. Used by the router to
    /// hand a fresh client's channel to the instance it is about to join.
    pub fn outbound_of(&self, id: &str) -> Option<UnboundedSender<Message>> {
        self.clients.get(id).map(|e| e.outbound.clone())
    }

    pub fn send_to(&self, id: &str, message: Message) {
        if let Some(entry) = self.clients.get(id) {
            let _ = entry.outbound.send(message);
        }
    }

    /// Sends `message` to every registered client except `exclude`. Used for global
    /// chat (§2b): a `chat` from a client with no instance.
    pub fn broadcast_except(&self, exclude: &str, message: Message) {
        for (id, entry) in &self.clients {
            if id != exclude {
                let _ = entry.outbound.send(message.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
