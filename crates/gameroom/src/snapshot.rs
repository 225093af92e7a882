use super::Phase;
use ludo_core::Roll;
use ludo_core::StretchIndex;
use ludo_core::TurnOrder;
use ludo_rules::Color;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Authoritative wire view of a session, returned by `GET state` and
/// carried by every push event.
///
/// Maps are ordered so the same state always serializes to the same bytes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub code: String,
    pub state: Phase,
    pub max_players: usize,
    pub current_turn: Option<String>,
    pub last_roll: Option<Roll>,
    pub has_rolled: bool,
    pub consecutive_sixes: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub host_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_by: Option<String>,
    pub capture_grants_extra_turn: bool,
    pub players: BTreeMap<String, PlayerView>,
    pub spectators: BTreeMap<String, SpectatorView>,
}

/// Wire view of one seated player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub color: Color,
    pub pieces: Vec<PieceView>,
    pub turn_order: TurnOrder,
    pub ready: bool,
    pub host: bool,
    pub bot: bool,
}

/// Wire view of one piece, in the position encoding of `ludo_rules::Spot`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
    pub id: u8,
    pub position: i16,
    pub home_stretch_index: StretchIndex,
    pub at_home: bool,
    pub on_safe_cell: bool,
    pub finished: bool,
}

/// Wire view of one spectator.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorView {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let piece = PieceView {
            id: 0,
            position: -1,
            home_stretch_index: 0,
            at_home: true,
            on_safe_cell: false,
            finished: false,
        };
        let player = PlayerView {
            id: "host".into(),
            name: "Host".into(),
            color: Color::Red,
            pieces: vec![piece; 4],
            turn_order: 0,
            ready: true,
            host: true,
            bot: false,
        };
        Snapshot {
            code: "01234567".into(),
            state: Phase::Waiting,
            max_players: 4,
            current_turn: None,
            last_roll: None,
            has_rolled: false,
            consecutive_sixes: 0,
            winner: None,
            host_id: "host".into(),
            paused_by: None,
            capture_grants_extra_turn: true,
            players: BTreeMap::from([("host".into(), player)]),
            spectators: BTreeMap::new(),
        }
    }

    #[test]
    fn round_trips_byte_identically() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("winner"));
        assert!(!json.contains("pausedBy"));
        assert!(json.contains("\"currentTurn\":null"));
        assert!(json.contains("\"captureGrantsExtraTurn\":true"));
    }
    #[test]
    fn field_names_are_camel_case() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"maxPlayers\":4"));
        assert!(json.contains("\"hasRolled\":false"));
        assert!(json.contains("\"consecutiveSixes\":0"));
        assert!(json.contains("\"turnOrder\":0"));
        assert!(json.contains("\"homeStretchIndex\":0"));
        assert!(json.contains("\"state\":\"waiting\""));
        assert!(json.contains("\"color\":\"red\""));
    }
}
