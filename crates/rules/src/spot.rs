use super::*;
use ludo_core::Cell;
use ludo_core::STRETCH_LEN;
use ludo_core::StretchIndex;

/// Wire encoding of a piece at home.
pub const HOME_POSITION: i16 = -1;
/// Wire sentinel for a piece inside its home stretch; the stretch index is
/// authoritative there.
pub const STRETCH_POSITION: i16 = 100;
/// Wire sentinel for a finished piece.
pub const FINISHED_POSITION: i16 = STRETCH_POSITION + STRETCH_LEN as i16;

/// Where a single piece stands. Exactly one of the four states holds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Spot {
    /// In the owner's yard, off the track.
    Home,
    /// On the shared main track.
    Track(Cell),
    /// Inside the owner's private home stretch, index 1..=5.
    Stretch(StretchIndex),
    /// Done; equivalent to stretch index 6.
    Finished,
}

impl Spot {
    pub fn at_home(&self) -> bool {
        matches!(self, Self::Home)
    }
    pub fn on_track(&self) -> bool {
        matches!(self, Self::Track(_))
    }
    pub fn in_stretch(&self) -> bool {
        matches!(self, Self::Stretch(_))
    }
    pub fn finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
    /// Main-track cell, if on the track.
    pub fn cell(&self) -> Option<Cell> {
        match self {
            Self::Track(c) => Some(*c),
            _ => None,
        }
    }
    /// Wire position: -1 home, 0..L-1 track, sentinels for stretch and finish.
    pub fn position(&self) -> i16 {
        match self {
            Self::Home => HOME_POSITION,
            Self::Track(c) => *c as i16,
            Self::Stretch(_) => STRETCH_POSITION,
            Self::Finished => FINISHED_POSITION,
        }
    }
    /// Home-stretch index: 0 off the stretch, 1..=5 inside, 6 finished.
    pub fn stretch_index(&self) -> StretchIndex {
        match self {
            Self::Stretch(i) => *i,
            Self::Finished => STRETCH_LEN,
            _ => 0,
        }
    }
    /// Capture immunity: every stretch cell trivially, safe track cells by table.
    pub fn is_safe(&self, variant: Variant) -> bool {
        match self {
            Self::Home => false,
            Self::Track(c) => variant.is_safe(*c),
            Self::Stretch(_) => true,
            Self::Finished => true,
        }
    }
}

impl std::fmt::Display for Spot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Track(c) => write!(f, "cell {}", c),
            Self::Stretch(i) => write!(f, "stretch {}", i),
            Self::Finished => write!(f, "finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn wire_encoding() {
        assert_eq!(Spot::Home.position(), -1);
        assert_eq!(Spot::Track(17).position(), 17);
        assert_eq!(Spot::Stretch(3).position(), STRETCH_POSITION);
        assert_eq!(Spot::Finished.position(), FINISHED_POSITION);
        assert!(Spot::Finished.position() >= STRETCH_POSITION);
    }
    #[test]
    fn stretch_indices() {
        assert_eq!(Spot::Home.stretch_index(), 0);
        assert_eq!(Spot::Track(4).stretch_index(), 0);
        assert_eq!(Spot::Stretch(2).stretch_index(), 2);
        assert_eq!(Spot::Finished.stretch_index(), STRETCH_LEN);
    }
    #[test]
    fn exactly_one_state() {
        for spot in [Spot::Home, Spot::Track(9), Spot::Stretch(1), Spot::Finished] {
            let states = [
                spot.at_home(),
                spot.on_track(),
                spot.in_stretch(),
                spot.finished(),
            ];
            assert_eq!(states.iter().filter(|s| **s).count(), 1);
        }
    }
    #[test]
    fn stretch_is_always_safe() {
        assert!(Spot::Stretch(1).is_safe(Variant::Classic));
        assert!(Spot::Finished.is_safe(Variant::Classic));
        assert!(!Spot::Track(5).is_safe(Variant::Classic));
        assert!(Spot::Track(8).is_safe(Variant::Classic));
    }
}
