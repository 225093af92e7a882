//! Room hosting infrastructure.
//!
//! Everything that lives above a single session and below the HTTP surface:
//!
//! - [`Lobby`] — the live code→room registry with code allocation and the
//!   abandoned-room sweep
//! - [`Hub`] — per-room subscriber sets with bounded buffers and in-order
//!   fan-out
//! - [`spawn_drivers`] — the bot, timeout, and sweep background loops
//!
//! Lock order is always registry before session; no path here holds a
//! session lock while taking the registry lock, and broadcasts happen after
//! the session lock is released, carrying the snapshot captured inside it.

mod drivers;
mod hub;
mod lobby;

pub use drivers::*;
pub use hub::*;
pub use lobby::*;
