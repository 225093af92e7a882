//! The per-room game session.
//!
//! This crate owns everything inside one room: the player roster and their
//! pieces, the turn cursor and roll state, the move and chat logs, and the
//! lifecycle machine (waiting → playing ⇄ paused → ended → waiting again on
//! rematch). All rule questions are delegated to `ludo-rules`; all locking
//! is the caller's concern. A [`Session`] is plain mutable state that the
//! hosting layer wraps in a lock.
//!
//! - [`Session`] — Mutable per-room aggregate and its operations
//! - [`Player`] / [`Piece`] / [`Spectator`] — Roster types
//! - [`Event`] — Push-channel vocabulary with the `{type, data, timestamp}` envelope
//! - [`Snapshot`] — Authoritative wire view of a session
//! - [`RoomError`] — Error taxonomy with HTTP status mapping

mod clock;
mod error;
mod message;
mod player;
mod records;
mod session;
mod snapshot;

pub mod validate;

pub use clock::*;
pub use error::*;
pub use message::*;
pub use player::*;
pub use records::*;
pub use session::*;
pub use snapshot::*;
