//! Core type aliases and constants for the ludo server.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the ludo workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Index of a cell on the shared main track.
pub type Cell = u16;
/// Index within a color's private home stretch (1..=6; 6 is the finish).
pub type StretchIndex = u8;
/// Face value of a die (1..=6).
pub type Roll = u8;
/// A player's position in the turn rotation (0..N-1).
pub type TurnOrder = usize;
/// Wall-clock instant in milliseconds since the unix epoch.
pub type Millis = u64;

/// Current unix time in milliseconds, for wire timestamps and records.
pub fn now_millis() -> Millis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or(0)
}

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Tokens per player.
pub const PIECES: usize = 4;
/// Cells in a color's home stretch; landing on the last one finishes a piece.
pub const STRETCH_LEN: StretchIndex = 6;
/// Minimum players required to start a game.
pub const MIN_PLAYERS: usize = 2;
/// Maximum players a room can be created for.
pub const MAX_PLAYERS: usize = 6;
/// Consecutive sixes that forfeit the turn.
pub const SIXES_LIMIT: u8 = 3;

// ============================================================================
// VALIDATION BOUNDS
// ============================================================================
/// Digits in a room code.
pub const CODE_LEN: usize = 8;
/// Display-character cap on player and spectator names.
pub const NAME_MAX: usize = 30;
/// Character cap on client-supplied identifiers.
pub const IDENT_MAX: usize = 64;
/// Character cap on a chat message after trimming.
pub const CHAT_MAX: usize = 500;
/// Messages returned by the chat history endpoint.
pub const CHAT_HISTORY: usize = 100;

// ============================================================================
// TURN TIMING AND BACKGROUND DRIVERS
// ============================================================================
use std::time::Duration;

/// Wall-clock budget for a single turn before it is force-skipped.
pub const TURN_LIMIT: Duration = Duration::from_secs(60);
/// Cadence of the bot auto-play loop.
pub const BOT_TICK: Duration = Duration::from_secs(1);
/// Pause between a bot's roll and its move, for human-perceivable pacing.
pub const BOT_PACING: Duration = Duration::from_millis(500);
/// Cadence of the turn-timeout loop.
pub const TIMEOUT_TICK: Duration = Duration::from_secs(5);
/// Cadence of the abandoned-room sweep.
pub const SWEEP_TICK: Duration = Duration::from_secs(300);

// ============================================================================
// ROOM LIFETIME (sweep policy)
// ============================================================================
/// Idle bound for waiting or ended rooms.
pub const IDLE_TTL: Duration = Duration::from_secs(30 * 60);
/// Hard bound on room age regardless of activity.
pub const ROOM_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Age bound for rooms that have lost all their players.
pub const EMPTY_TTL: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// PUSH CHANNEL
// ============================================================================
/// Outbound messages buffered per subscriber before eviction.
pub const SUBSCRIBER_BUFFER: usize = 256;
/// Interval between keepalive pings to a subscriber.
pub const PING_INTERVAL: Duration = Duration::from_secs(54);
/// Deadline on a single outbound socket write.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);
/// Deadline on inbound traffic before a subscriber is presumed dead.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("interrupt received, exiting");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn driver_cadences_are_sane() {
        assert!(BOT_PACING < BOT_TICK);
        assert!(TIMEOUT_TICK < TURN_LIMIT);
        assert!(SWEEP_TICK < IDLE_TTL);
    }
    #[test]
    fn ping_fits_read_deadline() {
        assert!(PING_INTERVAL < READ_DEADLINE);
    }
}
