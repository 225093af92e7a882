use super::ChatMessage;
use super::Snapshot;
use ludo_core::Millis;
use ludo_core::Roll;
use serde::Serialize;

/// Messages pushed to every subscriber of a room.
///
/// Serialized as `{type, data, timestamp}`: the tag pair comes from serde's
/// adjacent tagging, the timestamp is stamped at send time. Every variant
/// carries the post-operation [`Snapshot`] under `data.game` so clients can
/// re-render from any single message.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    PlayerJoined {
        player_id: String,
        player_name: String,
        game: Snapshot,
    },
    PlayerLeft {
        player_id: String,
        game: Snapshot,
    },
    PlayerKicked {
        player_id: String,
        game: Snapshot,
    },
    PlayerReady {
        player_id: String,
        ready: bool,
        game: Snapshot,
    },
    GameStarted {
        game: Snapshot,
    },
    GamePaused {
        player_id: String,
        game: Snapshot,
    },
    GameResumed {
        player_id: String,
        game: Snapshot,
    },
    DiceRolled {
        player_id: String,
        roll: Roll,
        three_sixes: bool,
        valid_moves: Vec<usize>,
        game: Snapshot,
    },
    PieceMoved {
        player_id: String,
        piece_id: u8,
        roll: Roll,
        captured: bool,
        game: Snapshot,
    },
    TurnSkipped {
        player_id: String,
        game: Snapshot,
    },
    TurnTimeout {
        player_id: String,
        game: Snapshot,
    },
    GameEnded {
        winner: String,
        game: Snapshot,
    },
    ChatMessage {
        message: ChatMessage,
        game: Snapshot,
    },
    SpectatorJoined {
        spectator_id: String,
        spectator_name: String,
        game: Snapshot,
    },
    Rematch {
        game: Snapshot,
    },
    PlayerConnected {
        player_id: String,
        game: Snapshot,
    },
    PlayerDisconnected {
        player_id: String,
        game: Snapshot,
    },
}

/// The `{type, data, timestamp}` wire envelope.
#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    event: &'a Event,
    timestamp: Millis,
}

impl Event {
    /// Wire tag of this event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "player_joined",
            Self::PlayerLeft { .. } => "player_left",
            Self::PlayerKicked { .. } => "player_kicked",
            Self::PlayerReady { .. } => "player_ready",
            Self::GameStarted { .. } => "game_started",
            Self::GamePaused { .. } => "game_paused",
            Self::GameResumed { .. } => "game_resumed",
            Self::DiceRolled { .. } => "dice_rolled",
            Self::PieceMoved { .. } => "piece_moved",
            Self::TurnSkipped { .. } => "turn_skipped",
            Self::TurnTimeout { .. } => "turn_timeout",
            Self::GameEnded { .. } => "game_ended",
            Self::ChatMessage { .. } => "chat_message",
            Self::SpectatorJoined { .. } => "spectator_joined",
            Self::Rematch { .. } => "rematch",
            Self::PlayerConnected { .. } => "player_connected",
            Self::PlayerDisconnected { .. } => "player_disconnected",
        }
    }
    /// Serializes the envelope, stamping the send time.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&Envelope {
            event: self,
            timestamp: ludo_core::now_millis(),
        })
        .expect("serialize event")
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;
    use std::collections::BTreeMap;

    fn snapshot() -> Snapshot {
        Snapshot {
            code: "00000000".into(),
            state: Phase::Playing,
            max_players: 2,
            current_turn: Some("p1".into()),
            last_roll: Some(6),
            has_rolled: true,
            consecutive_sixes: 1,
            winner: None,
            host_id: "p1".into(),
            paused_by: None,
            capture_grants_extra_turn: true,
            players: BTreeMap::new(),
            spectators: BTreeMap::new(),
        }
    }

    #[test]
    fn envelope_shape() {
        let event = Event::DiceRolled {
            player_id: "p1".into(),
            roll: 6,
            three_sixes: false,
            valid_moves: vec![0, 2],
            game: snapshot(),
        };
        let wire: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(wire["type"], "dice_rolled");
        assert_eq!(wire["data"]["roll"], 6);
        assert_eq!(wire["data"]["three_sixes"], false);
        assert_eq!(wire["data"]["valid_moves"], serde_json::json!([0, 2]));
        assert_eq!(wire["data"]["game"]["code"], "00000000");
        assert!(wire["timestamp"].is_u64());
    }
    #[test]
    fn tags_match_names() {
        let event = Event::GameEnded {
            winner: "p1".into(),
            game: snapshot(),
        };
        let wire: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(wire["type"], event.name());
        assert_eq!(wire["data"]["winner"], "p1");
    }
}
