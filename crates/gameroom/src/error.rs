/// Everything a session operation can refuse with.
///
/// Rule-level errors surface to the caller unchanged and leave the session
/// untouched; the server layer maps them onto HTTP statuses via
/// [`RoomError::status`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomError {
    /// No live room under the given code.
    RoomNotFound,
    /// The id names neither a player nor a spectator of the room.
    PlayerNotFound,
    /// Malformed input: bad name, bad identifier, bad player cap, chat too long.
    Validation(String),
    /// The room already carries its declared maximum of players.
    RoomFull,
    /// Join attempted after the game left the lobby.
    GameAlreadyStarted,
    /// Operation requires the waiting state.
    NotWaiting,
    /// Operation requires the playing state.
    NotPlaying,
    /// Operation cannot run while the game is paused.
    GamePaused,
    /// Resume called on a game that is not paused.
    GameNotPaused,
    /// Rematch requires an ended game.
    NotEnded,
    /// Start requires every player to be ready.
    PlayersNotReady,
    /// Start requires at least two players.
    NotEnoughPlayers,
    /// The acting player does not hold the turn.
    NotYourTurn,
    /// Moving or skipping before the die was rolled.
    MustRollFirst,
    /// Rolling twice within one turn.
    AlreadyRolled,
    /// Operation reserved to the host.
    NotHost,
    /// The host tried to kick themselves.
    CannotKickSelf,
    /// The requested move is not in the legal set.
    IllegalMove(String),
}

impl RoomError {
    /// HTTP status for this error: 404 for missing entities, 400 otherwise.
    pub fn status(&self) -> u16 {
        match self {
            Self::RoomNotFound | Self::PlayerNotFound => 404,
            _ => 400,
        }
    }
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomNotFound => write!(f, "room not found"),
            Self::PlayerNotFound => write!(f, "player not found"),
            Self::Validation(s) => write!(f, "invalid input: {}", s),
            Self::RoomFull => write!(f, "room is full"),
            Self::GameAlreadyStarted => write!(f, "game already started"),
            Self::NotWaiting => write!(f, "game is not in the lobby"),
            Self::NotPlaying => write!(f, "game is not in progress"),
            Self::GamePaused => write!(f, "game is paused"),
            Self::GameNotPaused => write!(f, "game is not paused"),
            Self::NotEnded => write!(f, "game has not ended"),
            Self::PlayersNotReady => write!(f, "not all players are ready"),
            Self::NotEnoughPlayers => write!(f, "not enough players"),
            Self::NotYourTurn => write!(f, "not your turn"),
            Self::MustRollFirst => write!(f, "roll the dice first"),
            Self::AlreadyRolled => write!(f, "already rolled this turn"),
            Self::NotHost => write!(f, "only the host may do that"),
            Self::CannotKickSelf => write!(f, "the host cannot kick themselves"),
            Self::IllegalMove(s) => write!(f, "illegal move: {}", s),
        }
    }
}

impl std::error::Error for RoomError {}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn status_mapping() {
        assert_eq!(RoomError::RoomNotFound.status(), 404);
        assert_eq!(RoomError::PlayerNotFound.status(), 404);
        assert_eq!(RoomError::NotYourTurn.status(), 400);
        assert_eq!(RoomError::Validation("x".into()).status(), 400);
        assert_eq!(RoomError::IllegalMove("x".into()).status(), 400);
    }
}
