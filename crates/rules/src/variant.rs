use super::*;
use ludo_core::Cell;
use serde::Deserialize;
use serde::Serialize;

/// Board geometry descriptor, chosen at room creation from the player cap.
///
/// Both variants share the identical state machine and rule pipeline; all
/// geometry reads route through this table. Safe cells are the start cells
/// plus the star cell eight past each start.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 52-cell ring for up to four players.
    Classic,
    /// 72-cell ring for five or six players.
    Grand,
}

impl Variant {
    /// Selects the geometry for a room's declared player cap.
    pub fn for_players(max: usize) -> Self {
        if max <= 4 { Self::Classic } else { Self::Grand }
    }
    /// Cells in the shared main track.
    pub fn track_len(&self) -> Cell {
        match self {
            Self::Classic => 52,
            Self::Grand => 72,
        }
    }
    /// Colors seatable on this board, in assignment order.
    pub fn palette(&self) -> &'static [Color] {
        match self {
            Self::Classic => &Color::ALL[..4],
            Self::Grand => &Color::ALL[..6],
        }
    }
    /// Cell a color's pieces enter the track on when leaving home.
    pub fn start(&self, color: Color) -> Cell {
        let spacing = self.track_len() / self.palette().len() as Cell;
        self.seat(color) as Cell * spacing
    }
    /// Last main-track cell before a color turns into its home stretch.
    /// Two cells short of the own start, so a full lap is L-2 steps.
    pub fn entry(&self, color: Color) -> Cell {
        (self.start(color) + self.track_len() - 2) % self.track_len()
    }
    /// Whether a main-track cell is immune from capture.
    pub fn is_safe(&self, cell: Cell) -> bool {
        self.palette()
            .iter()
            .any(|&c| cell == self.start(c) || cell == (self.start(c) + 8) % self.track_len())
    }
    /// A color's index in the palette.
    pub fn seat(&self, color: Color) -> usize {
        self.palette()
            .iter()
            .position(|&c| c == color)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn variant_from_player_cap() {
        assert_eq!(Variant::for_players(2), Variant::Classic);
        assert_eq!(Variant::for_players(4), Variant::Classic);
        assert_eq!(Variant::for_players(5), Variant::Grand);
        assert_eq!(Variant::for_players(6), Variant::Grand);
    }
    #[test]
    fn classic_geometry() {
        let v = Variant::Classic;
        assert_eq!(v.track_len(), 52);
        assert_eq!(v.palette().len(), 4);
        assert_eq!(v.start(Color::Red), 0);
        assert_eq!(v.start(Color::Green), 13);
        assert_eq!(v.start(Color::Yellow), 26);
        assert_eq!(v.start(Color::Blue), 39);
        assert_eq!(v.entry(Color::Red), 50);
        assert_eq!(v.entry(Color::Green), 11);
    }
    #[test]
    fn grand_geometry() {
        let v = Variant::Grand;
        assert_eq!(v.track_len(), 72);
        assert_eq!(v.palette().len(), 6);
        assert_eq!(v.start(Color::Purple), 60);
        assert_eq!(v.entry(Color::Red), 70);
        assert_eq!(v.entry(Color::Purple), 58);
    }
    #[test]
    fn starts_and_stars_are_safe() {
        let v = Variant::Classic;
        assert!(v.is_safe(0));
        assert!(v.is_safe(8));
        assert!(v.is_safe(13));
        assert!(v.is_safe(21));
        assert!(v.is_safe(39));
        assert!(v.is_safe(47));
        assert!(!v.is_safe(5));
        assert!(!v.is_safe(51));
    }
}
