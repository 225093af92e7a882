use ludo_core::SUBSCRIBER_BUFFER;
use ludo_gameroom::Event;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Per-room subscriber sets with bounded outbound buffers.
///
/// Delivery is at-most-once per subscriber and preserves enqueue order: a
/// broadcast walks the room's senders in one pass, and each subscriber's
/// channel is drained in order by its writer task. A subscriber that cannot
/// keep up loses its buffer slot fight and is evicted rather than blocking
/// the room.
pub struct Hub {
    rooms: RwLock<HashMap<String, HashMap<u64, mpsc::Sender<String>>>>,
    serial: AtomicU64,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            serial: AtomicU64::new(0),
        }
    }
    /// Registers a subscriber; the receiver side belongs to its writer task.
    pub async fn subscribe(&self, code: &str) -> (u64, mpsc::Receiver<String>) {
        let id = self.serial.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.rooms
            .write()
            .await
            .entry(code.to_string())
            .or_default()
            .insert(id, tx);
        log::debug!("[hub] subscriber {} joined room {}", id, code);
        (id, rx)
    }
    /// Drops a subscriber, closing its buffer. Idempotent.
    pub async fn unsubscribe(&self, code: &str, id: u64) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(code) {
            Some(subscribers) => {
                let removed = subscribers.remove(&id).is_some();
                if subscribers.is_empty() {
                    rooms.remove(code);
                }
                if removed {
                    log::debug!("[hub] subscriber {} left room {}", id, code);
                }
                removed
            }
            None => false,
        }
    }
    /// Serializes the event once and enqueues a copy to every live
    /// subscriber of the room. Full or closed buffers evict their owner.
    pub async fn broadcast(&self, code: &str, event: &Event) {
        let json = event.to_json();
        let mut dead = Vec::new();
        {
            let rooms = self.rooms.read().await;
            let Some(subscribers) = rooms.get(code) else {
                return;
            };
            for (id, tx) in subscribers {
                match tx.try_send(json.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::warn!("[hub] subscriber {} lagging, evicting", id);
                        dead.push(*id);
                    }
                    Err(TrySendError::Closed(_)) => dead.push(*id),
                }
            }
        }
        for id in dead {
            self.unsubscribe(code, id).await;
        }
        log::debug!("[hub] {} -> room {}", event.name(), code);
    }
    pub async fn subscriber_count(&self, code: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(code)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludo_gameroom::Session;

    fn event() -> Event {
        let session = Session::new("00000001", "H", "Host", 2).unwrap();
        Event::GameStarted {
            game: session.snapshot(),
        }
    }

    #[tokio::test]
    async fn delivers_in_order() {
        let hub = Hub::new();
        let (_, mut rx) = hub.subscribe("00000001").await;
        for _ in 0..3 {
            hub.broadcast("00000001", &event()).await;
        }
        for _ in 0..3 {
            let json = rx.recv().await.unwrap();
            assert!(json.contains("\"type\":\"game_started\""));
        }
    }
    #[tokio::test]
    async fn broadcast_reaches_only_the_room() {
        let hub = Hub::new();
        let (_, mut here) = hub.subscribe("00000001").await;
        let (_, mut there) = hub.subscribe("00000002").await;
        hub.broadcast("00000001", &event()).await;
        assert!(here.recv().await.is_some());
        assert!(there.try_recv().is_err());
    }
    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let hub = Hub::new();
        let (id, _rx) = hub.subscribe("00000001").await;
        assert!(hub.unsubscribe("00000001", id).await);
        assert!(!hub.unsubscribe("00000001", id).await);
        assert_eq!(hub.subscriber_count("00000001").await, 0);
    }
    #[tokio::test]
    async fn full_buffer_evicts_subscriber() {
        let hub = Hub::new();
        let (_, rx) = hub.subscribe("00000001").await;
        for _ in 0..=SUBSCRIBER_BUFFER {
            hub.broadcast("00000001", &event()).await;
        }
        assert_eq!(hub.subscriber_count("00000001").await, 0);
        drop(rx);
    }
    #[tokio::test]
    async fn closed_receiver_evicts_on_next_broadcast() {
        let hub = Hub::new();
        let (_, rx) = hub.subscribe("00000001").await;
        drop(rx);
        hub.broadcast("00000001", &event()).await;
        assert_eq!(hub.subscriber_count("00000001").await, 0);
    }
}
