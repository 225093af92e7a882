use super::*;
use ludo_core::Cell;
use ludo_core::PIECES;
use ludo_core::Roll;
use ludo_core::STRETCH_LEN;
use serde::Deserialize;
use serde::Serialize;

/// Outcome of advancing one piece by one roll.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Advance {
    /// Leaves home onto the owner's start cell. Requires a six.
    LeaveHome(Cell),
    /// Stays on the main track, landing on the carried cell.
    StayOnTrack(Cell),
    /// Turns off the track into the home stretch at the carried index.
    EnterStretch(ludo_core::StretchIndex),
    /// Moves deeper into the stretch, not yet finishing.
    AdvanceStretch(ludo_core::StretchIndex),
    /// Lands exactly on the final stretch cell.
    Finish,
    /// Overshoot, home without a six, or already finished.
    Illegal,
}

impl Advance {
    /// The spot the piece occupies after this advance, if it is legal.
    pub fn destination(&self) -> Option<Spot> {
        match self {
            Self::LeaveHome(c) => Some(Spot::Track(*c)),
            Self::StayOnTrack(c) => Some(Spot::Track(*c)),
            Self::EnterStretch(i) => Some(Spot::Stretch(*i)),
            Self::AdvanceStretch(i) => Some(Spot::Stretch(*i)),
            Self::Finish => Some(Spot::Finished),
            Self::Illegal => None,
        }
    }
    pub fn is_legal(&self) -> bool {
        !matches!(self, Self::Illegal)
    }
}

/// Stretch-entry eligibility. The reference server treats every on-track
/// position as having completed its lap; the strict reading requires the
/// piece to have passed its own start cell first. Kept as a policy so rooms
/// can pick either.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LapRule {
    /// Any on-track cell may turn into the stretch when the roll crosses
    /// the entry.
    #[default]
    EveryPosition,
    /// Only cells outside the forward window from start to entry qualify,
    /// the positional approximation of "has crossed its own start again".
    AfterFullLap,
}

impl LapRule {
    /// Whether a piece on `cell` may turn into its home stretch.
    pub fn eligible(&self, variant: Variant, color: Color, cell: Cell) -> bool {
        match self {
            Self::EveryPosition => true,
            Self::AfterFullLap => {
                let track = variant.track_len();
                let ahead = (cell + track - variant.start(color)) % track;
                let lap = (variant.entry(color) + track - variant.start(color)) % track;
                !(ahead > 0 && ahead < lap)
            }
        }
    }
}

/// Advances one piece of `color` from `spot` by `roll`.
///
/// Stretch movement forbids overshoot: the final cell must be hit exactly.
/// Track movement turns into the stretch when the roll crosses the entry
/// cell of an eligible piece, and wraps the ring otherwise.
pub fn advance(variant: Variant, color: Color, spot: Spot, roll: Roll, lap: LapRule) -> Advance {
    match spot {
        Spot::Finished => Advance::Illegal,
        Spot::Home if roll == 6 => Advance::LeaveHome(variant.start(color)),
        Spot::Home => Advance::Illegal,
        Spot::Stretch(index) => match index + roll {
            target if target > STRETCH_LEN => Advance::Illegal,
            target if target == STRETCH_LEN => Advance::Finish,
            target => Advance::AdvanceStretch(target),
        },
        Spot::Track(cell) => {
            let track = variant.track_len();
            let to_entry = (variant.entry(color) + track - cell) % track;
            if lap.eligible(variant, color, cell) && roll as Cell > to_entry {
                match roll - to_entry as Roll {
                    target if target > STRETCH_LEN => Advance::Illegal,
                    target if target == STRETCH_LEN => Advance::Finish,
                    target => Advance::EnterStretch(target),
                }
            } else {
                Advance::StayOnTrack((cell + roll as Cell) % track)
            }
        }
    }
}

/// Piece ids of `color` that have at least one legal move for `roll`.
pub fn legal_moves(
    variant: Variant,
    color: Color,
    pieces: &[Spot; PIECES],
    roll: Roll,
    lap: LapRule,
) -> Vec<usize> {
    pieces
        .iter()
        .enumerate()
        .filter(|(_, spot)| advance(variant, color, **spot, roll, lap).is_legal())
        .map(|(id, _)| id)
        .collect()
}

/// Opponent pieces captured by a landing on main-track `cell`.
///
/// Safe cells never yield captures, even when opponents sit there. Only
/// on-track pieces are capturable; home, stretch, and finished pieces are
/// untouchable by construction.
pub fn captures<'a, I>(variant: Variant, cell: Cell, others: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = (&'a str, &'a [Spot; PIECES])>,
{
    if variant.is_safe(cell) {
        return Vec::new();
    }
    others
        .into_iter()
        .flat_map(|(player, pieces)| {
            pieces
                .iter()
                .enumerate()
                .filter(move |(_, spot)| **spot == Spot::Track(cell))
                .map(move |(id, _)| (player, id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: Variant = Variant::Classic;
    const LAP: LapRule = LapRule::EveryPosition;

    #[test]
    fn six_leaves_home() {
        assert_eq!(
            advance(V, Color::Red, Spot::Home, 6, LAP),
            Advance::LeaveHome(0)
        );
        assert_eq!(
            advance(V, Color::Green, Spot::Home, 6, LAP),
            Advance::LeaveHome(13)
        );
    }
    #[test]
    fn home_without_six_is_illegal() {
        for roll in 1..=5 {
            assert_eq!(advance(V, Color::Red, Spot::Home, roll, LAP), Advance::Illegal);
        }
    }
    #[test]
    fn finished_piece_never_moves() {
        assert_eq!(advance(V, Color::Red, Spot::Finished, 6, LAP), Advance::Illegal);
    }
    #[test]
    fn track_movement_wraps() {
        assert_eq!(
            advance(V, Color::Green, Spot::Track(50), 4, LAP),
            Advance::StayOnTrack(2)
        );
    }
    #[test]
    fn stretch_requires_exact_finish() {
        assert_eq!(
            advance(V, Color::Red, Spot::Stretch(3), 3, LAP),
            Advance::Finish
        );
        assert_eq!(
            advance(V, Color::Red, Spot::Stretch(3), 4, LAP),
            Advance::Illegal
        );
        assert_eq!(
            advance(V, Color::Red, Spot::Stretch(3), 2, LAP),
            Advance::AdvanceStretch(5)
        );
    }
    #[test]
    fn entry_crossing_turns_into_stretch() {
        // Red's entry is cell 50; from 48, a roll of 3 crosses it by one.
        assert_eq!(
            advance(V, Color::Red, Spot::Track(48), 3, LAP),
            Advance::EnterStretch(1)
        );
        assert_eq!(
            advance(V, Color::Red, Spot::Track(48), 2, LAP),
            Advance::StayOnTrack(50)
        );
    }
    #[test]
    fn entry_overshoot_is_illegal() {
        // From the entry cell itself, six past it lands exactly on the finish.
        assert_eq!(
            advance(V, Color::Red, Spot::Track(50), 6, LAP),
            Advance::Finish
        );
        // Inside the stretch the same six overshoots into nothing.
        assert_eq!(advance(V, Color::Red, Spot::Stretch(1), 6, LAP), Advance::Illegal);
    }
    #[test]
    fn lap_rule_gates_entry() {
        // Cell 20 is midway through Red's first lap: strictly between start
        // and entry, so the strict rule keeps it on the track.
        let strict = LapRule::AfterFullLap;
        assert!(!strict.eligible(V, Color::Red, 20));
        assert_eq!(
            advance(V, Color::Red, Spot::Track(49), 3, strict),
            Advance::StayOnTrack(0)
        );
        // The start and entry cells themselves stay eligible.
        assert!(strict.eligible(V, Color::Red, 0));
        assert!(strict.eligible(V, Color::Red, 50));
        assert!(LapRule::EveryPosition.eligible(V, Color::Red, 20));
    }
    #[test]
    fn all_home_six_moves_all() {
        let pieces = [Spot::Home; 4];
        assert_eq!(legal_moves(V, Color::Red, &pieces, 6, LAP), vec![0, 1, 2, 3]);
    }
    #[test]
    fn all_home_small_roll_moves_none() {
        let pieces = [Spot::Home; 4];
        for roll in 1..=5 {
            assert!(legal_moves(V, Color::Red, &pieces, roll, LAP).is_empty());
        }
    }
    #[test]
    fn mixed_pieces_filtered() {
        let pieces = [Spot::Home, Spot::Track(4), Spot::Stretch(5), Spot::Finished];
        // A two advances the tracked piece but overshoots the stretch piece.
        assert_eq!(legal_moves(V, Color::Red, &pieces, 2, LAP), vec![1]);
        // A one finishes the stretch piece as well.
        assert_eq!(legal_moves(V, Color::Red, &pieces, 1, LAP), vec![1, 2]);
    }
    #[test]
    fn capture_on_open_cell() {
        let theirs = [Spot::Track(5), Spot::Home, Spot::Home, Spot::Home];
        let victims = captures(V, 5, [("p2", &theirs)]);
        assert_eq!(victims, vec![("p2", 0)]);
    }
    #[test]
    fn no_capture_on_safe_cell() {
        let theirs = [Spot::Track(8), Spot::Home, Spot::Home, Spot::Home];
        assert!(captures(V, 8, [("p2", &theirs)]).is_empty());
    }
    #[test]
    fn no_capture_of_stretch_pieces() {
        let theirs = [Spot::Stretch(2), Spot::Finished, Spot::Home, Spot::Home];
        assert!(captures(V, 5, [("p2", &theirs)]).is_empty());
    }
    #[test]
    fn capture_collects_every_occupant() {
        let a = [Spot::Track(30), Spot::Track(30), Spot::Home, Spot::Home];
        let b = [Spot::Track(30), Spot::Home, Spot::Home, Spot::Home];
        let victims = captures(V, 30, [("a", &a), ("b", &b)]);
        assert_eq!(victims, vec![("a", 0), ("a", 1), ("b", 0)]);
    }
}
