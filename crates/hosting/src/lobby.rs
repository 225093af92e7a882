use ludo_gameroom::Phase;
use ludo_gameroom::RoomError;
use ludo_gameroom::Session;
use ludo_gameroom::validate;
use ludo_rules::CryptoDice;
use ludo_rules::Dice;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared handle to one room's serialized state.
pub type RoomHandle = Arc<RwLock<Session>>;

/// Aggregate room counts for the stats endpoint.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyStats {
    pub total_rooms: usize,
    pub waiting: usize,
    pub playing: usize,
    pub ended: usize,
    pub total_players: usize,
}

/// The live code→room registry.
///
/// Owns the shared dice source so request handlers, bots, and tests all
/// roll from the same seam.
pub struct Lobby {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    dice: Arc<dyn Dice>,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}

impl Lobby {
    pub fn new() -> Self {
        Self::with_dice(Arc::new(CryptoDice))
    }
    /// Registry rolling from a caller-supplied dice source.
    pub fn with_dice(dice: Arc<dyn Dice>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            dice,
        }
    }
    pub fn dice(&self) -> &dyn Dice {
        self.dice.as_ref()
    }
    /// Opens a room under a fresh 8-digit code, host already seated.
    pub async fn create(
        &self,
        host_id: &str,
        host_name: &str,
        max_players: usize,
    ) -> Result<(String, RoomHandle), RoomError> {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = fresh_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(&code, host_id, host_name, max_players)?;
        let handle: RoomHandle = Arc::new(RwLock::new(session));
        rooms.insert(code.clone(), handle.clone());
        log::info!("[lobby] room {} created by {}", code, host_id);
        Ok((code, handle))
    }
    pub async fn get(&self, code: &str) -> Result<RoomHandle, RoomError> {
        validate::code(code)?;
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or(RoomError::RoomNotFound)
    }
    pub async fn remove(&self, code: &str) -> bool {
        self.rooms.write().await.remove(code).is_some()
    }
    /// Snapshot of the current room set, for the background drivers.
    pub async fn all(&self) -> Vec<(String, RoomHandle)> {
        self.rooms
            .read()
            .await
            .iter()
            .map(|(code, handle)| (code.clone(), handle.clone()))
            .collect()
    }
    pub async fn stats(&self) -> LobbyStats {
        let mut stats = LobbyStats::default();
        for (_, handle) in self.all().await {
            let session = handle.read().await;
            stats.total_rooms += 1;
            stats.total_players += session.player_count();
            match session.phase() {
                Phase::Waiting => stats.waiting += 1,
                Phase::Playing | Phase::Paused => stats.playing += 1,
                Phase::Ended => stats.ended += 1,
            }
        }
        stats
    }
    /// Removes every room the sweep policy marks expendable as of now.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }
    pub async fn sweep_at(&self, now: Instant) -> usize {
        let mut doomed = Vec::new();
        for (code, handle) in self.all().await {
            if handle.read().await.expendable(now) {
                doomed.push(code);
            }
        }
        let mut rooms = self.rooms.write().await;
        let mut removed = 0;
        for code in doomed {
            if rooms.remove(&code).is_some() {
                log::info!("[sweep] room {} removed", code);
                removed += 1;
            }
        }
        removed
    }
}

/// A fresh 8-digit decimal code from the CSPRNG, leading zeros kept.
fn fresh_code() -> String {
    format!("{:08}", rand::rng().random_range(0..100_000_000u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludo_core::CODE_LEN;
    use ludo_core::EMPTY_TTL;
    use ludo_core::IDLE_TTL;
    use std::time::Duration;

    #[test]
    fn codes_are_eight_digits() {
        for _ in 0..100 {
            let code = fresh_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
    #[tokio::test]
    async fn create_get_remove() {
        let lobby = Lobby::new();
        let (code, _) = lobby.create("H", "Host", 4).await.unwrap();
        assert!(lobby.get(&code).await.is_ok());
        assert_eq!(
            lobby.get("99999999").await.unwrap_err(),
            RoomError::RoomNotFound
        );
        assert_eq!(
            lobby.get("nonsense").await.unwrap_err(),
            RoomError::Validation("malformed room code".into())
        );
        assert!(lobby.remove(&code).await);
        assert!(!lobby.remove(&code).await);
    }
    #[tokio::test]
    async fn create_validates_input() {
        let lobby = Lobby::new();
        assert!(lobby.create("H", "Host", 1).await.is_err());
        assert!(lobby.create("bad id", "Host", 4).await.is_err());
        assert!(lobby.create("H", "   ", 4).await.is_err());
    }
    #[tokio::test]
    async fn stats_count_by_phase() {
        let lobby = Lobby::new();
        let (_, waiting) = lobby.create("H", "Host", 2).await.unwrap();
        let (_, playing) = lobby.create("H", "Host", 2).await.unwrap();
        {
            let mut session = playing.write().await;
            session.join("P", "Pat").unwrap();
            session.set_ready("H", true).unwrap();
            session.set_ready("P", true).unwrap();
            session.start("H").unwrap();
        }
        let stats = lobby.stats().await;
        assert_eq!(stats.total_rooms, 2);
        assert_eq!(stats.waiting, 1);
        assert_eq!(stats.playing, 1);
        assert_eq!(stats.ended, 0);
        assert_eq!(stats.total_players, 3);
        drop(waiting);
    }
    #[tokio::test]
    async fn sweep_removes_idle_and_empty_rooms() {
        let lobby = Lobby::new();
        let now = Instant::now();
        let (fresh, _) = lobby.create("H", "Host", 2).await.unwrap();
        let (emptied, handle) = lobby.create("G", "Gone", 2).await.unwrap();
        handle.write().await.leave("G").unwrap();
        assert_eq!(lobby.sweep_at(now).await, 0);
        assert_eq!(
            lobby.sweep_at(now + EMPTY_TTL + Duration::from_secs(1)).await,
            1
        );
        assert!(lobby.get(&emptied).await.is_err());
        assert!(lobby.get(&fresh).await.is_ok());
        assert_eq!(
            lobby.sweep_at(now + IDLE_TTL + Duration::from_secs(1)).await,
            1
        );
        assert!(lobby.get(&fresh).await.is_err());
    }
}
