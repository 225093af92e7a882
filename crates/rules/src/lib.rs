//! Pure rule evaluation for ludo-family boards.
//!
//! Everything in this crate is a side-effect-free function over value types:
//! the session layer snapshots piece positions, asks this crate what is
//! legal, and applies the answer under its own lock.
//!
//! - [`Variant`] — Board geometry tables (track length, starts, entries, safe cells)
//! - [`Spot`] — Where a single piece stands, plus its wire encoding
//! - [`Dice`] — Roll source trait with a CSPRNG implementation
//! - [`advance`] — Piece advancement for one roll
//! - [`legal_moves`] — Movable piece ids for one roll
//! - [`captures`] — Victims of a landing on the main track

mod color;
mod dice;
mod moves;
mod spot;
mod variant;

pub use color::*;
pub use dice::*;
pub use moves::*;
pub use spot::*;
pub use variant::*;
