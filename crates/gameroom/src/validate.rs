use super::RoomError;
use ludo_core::CHAT_MAX;
use ludo_core::CODE_LEN;
use ludo_core::IDENT_MAX;
use ludo_core::MAX_PLAYERS;
use ludo_core::MIN_PLAYERS;
use ludo_core::NAME_MAX;

/// Trims and bounds a display name to 1..=30 characters.
pub fn name(raw: &str) -> Result<String, RoomError> {
    let trimmed = raw.trim();
    match trimmed.chars().count() {
        0 => Err(RoomError::Validation("name is empty".into())),
        n if n > NAME_MAX => Err(RoomError::Validation("name too long".into())),
        _ => Ok(trimmed.to_string()),
    }
}

/// Client-supplied opaque tokens: 1..=64 chars in `[A-Za-z0-9_-]`.
pub fn identifier(raw: &str) -> Result<(), RoomError> {
    if raw.is_empty() || raw.len() > IDENT_MAX {
        return Err(RoomError::Validation("identifier length".into()));
    }
    raw.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .then_some(())
        .ok_or_else(|| RoomError::Validation("identifier charset".into()))
}

/// Trims and bounds a chat message to 1..=500 characters.
pub fn chat(raw: &str) -> Result<String, RoomError> {
    let trimmed = raw.trim();
    match trimmed.chars().count() {
        0 => Err(RoomError::Validation("message is empty".into())),
        n if n > CHAT_MAX => Err(RoomError::Validation("message too long".into())),
        _ => Ok(trimmed.to_string()),
    }
}

/// Room codes are exactly eight decimal digits.
pub fn code(raw: &str) -> Result<(), RoomError> {
    (raw.len() == CODE_LEN && raw.bytes().all(|b| b.is_ascii_digit()))
        .then_some(())
        .ok_or_else(|| RoomError::Validation("malformed room code".into()))
}

/// Declared player cap must be 2..=6.
pub fn max_players(n: usize) -> Result<(), RoomError> {
    ((MIN_PLAYERS..=MAX_PLAYERS).contains(&n))
        .then_some(())
        .ok_or_else(|| RoomError::Validation("max players out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(name("  Pat  ").unwrap(), "Pat");
        assert!(name("   ").is_err());
        assert!(name(&"x".repeat(31)).is_err());
        assert_eq!(name(&"x".repeat(30)).unwrap().len(), 30);
    }
    #[test]
    fn identifiers_enforce_charset() {
        assert!(identifier("abc_DEF-123").is_ok());
        assert!(identifier("").is_err());
        assert!(identifier("space here").is_err());
        assert!(identifier("héllo").is_err());
        assert!(identifier(&"a".repeat(64)).is_ok());
        assert!(identifier(&"a".repeat(65)).is_err());
    }
    #[test]
    fn chat_bounds() {
        assert_eq!(chat(" hi ").unwrap(), "hi");
        assert!(chat("").is_err());
        assert!(chat(&"x".repeat(501)).is_err());
        assert!(chat(&"x".repeat(500)).is_ok());
    }
    #[test]
    fn codes_are_eight_digits() {
        assert!(code("01234567").is_ok());
        assert!(code("0123456").is_err());
        assert!(code("012345678").is_err());
        assert!(code("01234a67").is_err());
    }
    #[test]
    fn player_cap_bounds() {
        assert!(max_players(1).is_err());
        assert!(max_players(2).is_ok());
        assert!(max_players(6).is_ok());
        assert!(max_players(7).is_err());
    }
}
