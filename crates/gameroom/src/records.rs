use ludo_core::Millis;
use ludo_core::Roll;
use serde::Deserialize;
use serde::Serialize;

/// Append-only record of one applied move.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub player_id: String,
    pub piece_id: u8,
    pub roll: Roll,
    /// Wire-encoded positions (-1 home, 0..L-1 track, sentinels beyond).
    pub from_pos: i16,
    pub to_pos: i16,
    pub was_from_home: bool,
    pub was_capture: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_player_id: Option<String>,
    pub timestamp: Millis,
}

/// Append-only record of one chat line, from a player or a spectator.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub timestamp: Millis,
    pub is_spectator: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn move_record_wire_shape() {
        let record = MoveRecord {
            player_id: "p1".into(),
            piece_id: 0,
            roll: 6,
            from_pos: -1,
            to_pos: 0,
            was_from_home: true,
            was_capture: false,
            captured_player_id: None,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"playerId\":\"p1\""));
        assert!(json.contains("\"wasFromHome\":true"));
        assert!(!json.contains("capturedPlayerId"));
        let back: MoveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
    #[test]
    fn chat_message_wire_shape() {
        let message = ChatMessage {
            author_id: "s1".into(),
            author_name: "Sam".into(),
            text: "hello".into(),
            timestamp: 1_700_000_000_000,
            is_spectator: true,
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"authorName\":\"Sam\""));
        assert!(json.contains("\"isSpectator\":true"));
    }
}
