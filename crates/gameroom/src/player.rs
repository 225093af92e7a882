use ludo_core::PIECES;
use ludo_core::TurnOrder;
use ludo_rules::Color;
use ludo_rules::Spot;

/// One of a player's four tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Piece {
    pub(crate) id: u8,
    pub(crate) spot: Spot,
}

impl Piece {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            spot: Spot::Home,
        }
    }
    pub fn id(&self) -> u8 {
        self.id
    }
    pub fn spot(&self) -> Spot {
        self.spot
    }
}

/// A seated participant with pieces on the board.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) color: Color,
    pub(crate) pieces: [Piece; PIECES],
    pub(crate) order: TurnOrder,
    pub(crate) ready: bool,
    pub(crate) host: bool,
    pub(crate) bot: bool,
}

impl Player {
    pub fn new(id: &str, name: &str, color: Color, order: TurnOrder) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color,
            pieces: std::array::from_fn(|i| Piece::new(i as u8)),
            order,
            ready: false,
            host: false,
            bot: false,
        }
    }
    /// A bot seat: always ready, never blocks start.
    pub fn bot(id: &str, name: &str, color: Color, order: TurnOrder) -> Self {
        Self {
            ready: true,
            bot: true,
            ..Self::new(id, name, color, order)
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn color(&self) -> Color {
        self.color
    }
    pub fn order(&self) -> TurnOrder {
        self.order
    }
    pub fn is_ready(&self) -> bool {
        self.ready
    }
    pub fn is_host(&self) -> bool {
        self.host
    }
    pub fn is_bot(&self) -> bool {
        self.bot
    }
    pub fn pieces(&self) -> &[Piece; PIECES] {
        &self.pieces
    }
    /// Copy of the piece positions, in piece-id order.
    pub fn spots(&self) -> [Spot; PIECES] {
        std::array::from_fn(|i| self.pieces[i].spot)
    }
    /// All four pieces finished means this player has won.
    pub fn is_done(&self) -> bool {
        self.pieces.iter().all(|p| p.spot.finished())
    }
    /// Returns every piece to the yard, for rematches.
    pub(crate) fn reset(&mut self) {
        for piece in &mut self.pieces {
            piece.spot = Spot::Home;
        }
    }
}

/// A watcher: chats, never acts.
#[derive(Clone, Debug)]
pub struct Spectator {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl Spectator {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_player_starts_at_home() {
        let player = Player::new("p1", "Pat", Color::Red, 0);
        assert!(player.pieces().iter().all(|p| p.spot().at_home()));
        assert!(!player.is_ready());
        assert!(!player.is_bot());
        assert!(!player.is_done());
    }
    #[test]
    fn bots_are_born_ready() {
        let bot = Player::bot("bot-1", "Bot 1", Color::Green, 1);
        assert!(bot.is_ready());
        assert!(bot.is_bot());
    }
    #[test]
    fn done_requires_all_four() {
        let mut player = Player::new("p1", "Pat", Color::Red, 0);
        for piece in &mut player.pieces {
            piece.spot = Spot::Finished;
        }
        assert!(player.is_done());
        player.pieces[2].spot = Spot::Stretch(5);
        assert!(!player.is_done());
    }
}
