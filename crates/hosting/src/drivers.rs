use super::Hub;
use super::Lobby;
use super::RoomHandle;
use ludo_core::BOT_PACING;
use ludo_core::BOT_TICK;
use ludo_core::SWEEP_TICK;
use ludo_core::TIMEOUT_TICK;
use ludo_gameroom::Event;
use rand::prelude::*;
use std::sync::Arc;

/// Spawns the bot, timeout, and sweep loops. They run until the process
/// shuts down.
pub fn spawn_drivers(lobby: Arc<Lobby>, hub: Arc<Hub>) {
    tokio::spawn(bot_loop(lobby.clone(), hub.clone()));
    tokio::spawn(timeout_loop(lobby.clone(), hub));
    tokio::spawn(sweep_loop(lobby));
}

async fn bot_loop(lobby: Arc<Lobby>, hub: Arc<Hub>) {
    let mut tick = tokio::time::interval(BOT_TICK);
    loop {
        tick.tick().await;
        bot_pass(&lobby, &hub).await;
    }
}

async fn timeout_loop(lobby: Arc<Lobby>, hub: Arc<Hub>) {
    let mut tick = tokio::time::interval(TIMEOUT_TICK);
    loop {
        tick.tick().await;
        timeout_pass(&lobby, &hub).await;
    }
}

async fn sweep_loop(lobby: Arc<Lobby>) {
    let mut tick = tokio::time::interval(SWEEP_TICK);
    loop {
        tick.tick().await;
        let removed = lobby.sweep().await;
        if removed > 0 {
            log::info!("[sweep] {} rooms removed", removed);
        }
    }
}

/// One pass of the bot driver: every room whose turn belongs to a bot gets
/// a roll and, after a beat of pacing, a move or a skip.
pub async fn bot_pass(lobby: &Lobby, hub: &Hub) {
    for (code, handle) in lobby.all().await {
        let Some(bot) = handle.read().await.bot_turn() else {
            continue;
        };
        if !handle.read().await.has_rolled() {
            if !bot_roll(lobby, hub, &code, &handle, &bot).await {
                continue;
            }
        }
        tokio::time::sleep(BOT_PACING).await;
        bot_act(hub, &code, &handle, &bot).await;
    }
}

/// Rolls for the bot and reports whether it still holds a playable turn.
async fn bot_roll(lobby: &Lobby, hub: &Hub, code: &str, handle: &RoomHandle, bot: &str) -> bool {
    let (outcome, snapshot) = {
        let mut session = handle.write().await;
        let outcome = session.roll_dice(bot, lobby.dice());
        (outcome, session.snapshot())
    };
    match outcome {
        Ok(outcome) => {
            let forfeited = outcome.three_sixes;
            hub.broadcast(
                code,
                &Event::DiceRolled {
                    player_id: bot.to_string(),
                    roll: outcome.roll,
                    three_sixes: outcome.three_sixes,
                    valid_moves: outcome.valid_moves,
                    game: snapshot,
                },
            )
            .await;
            !forfeited
        }
        Err(e) => {
            log::debug!("[bots] roll in room {} refused: {}", code, e);
            false
        }
    }
}

/// Picks a legal move uniformly at random, or skips when there is none.
async fn bot_act(hub: &Hub, code: &str, handle: &RoomHandle, bot: &str) {
    let moves = handle.read().await.valid_moves(bot);
    let chosen = moves.choose(&mut rand::rng()).copied();
    match chosen {
        Some(piece) => {
            let (outcome, snapshot) = {
                let mut session = handle.write().await;
                let outcome = session.move_piece(bot, piece);
                (outcome, session.snapshot())
            };
            match outcome {
                Ok(outcome) => {
                    hub.broadcast(
                        code,
                        &Event::PieceMoved {
                            player_id: bot.to_string(),
                            piece_id: outcome.record.piece_id,
                            roll: outcome.record.roll,
                            captured: outcome.captured,
                            game: snapshot.clone(),
                        },
                    )
                    .await;
                    if outcome.ended {
                        hub.broadcast(
                            code,
                            &Event::GameEnded {
                                winner: bot.to_string(),
                                game: snapshot,
                            },
                        )
                        .await;
                    }
                }
                Err(e) => log::debug!("[bots] move in room {} refused: {}", code, e),
            }
        }
        None => {
            let (outcome, snapshot) = {
                let mut session = handle.write().await;
                let outcome = session.skip_turn(bot);
                (outcome, session.snapshot())
            };
            match outcome {
                Ok(()) => {
                    hub.broadcast(
                        code,
                        &Event::TurnSkipped {
                            player_id: bot.to_string(),
                            game: snapshot,
                        },
                    )
                    .await;
                }
                Err(e) => log::debug!("[bots] skip in room {} refused: {}", code, e),
            }
        }
    }
}

/// One pass of the timeout driver: expired turns are force-skipped. The
/// session re-verifies expiry under its own lock, so a turn that advanced
/// between observation and action is left alone.
pub async fn timeout_pass(lobby: &Lobby, hub: &Hub) {
    for (code, handle) in lobby.all().await {
        if !handle.read().await.turn_expired() {
            continue;
        }
        let (skipped, snapshot) = {
            let mut session = handle.write().await;
            let skipped = session.force_skip();
            (skipped, session.snapshot())
        };
        if let Some(player_id) = skipped {
            log::info!("[timeouts] room {} skipped {}", code, player_id);
            hub.broadcast(
                &code,
                &Event::TurnTimeout {
                    player_id,
                    game: snapshot,
                },
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludo_gameroom::Phase;
    use ludo_rules::ScriptedDice;
    use std::time::Duration;

    /// Host plus one bot, started. Returns the room and the bot id.
    async fn bot_room(lobby: &Lobby) -> (String, RoomHandle, String) {
        let (code, handle) = lobby.create("H", "Host", 2).await.unwrap();
        let bot = {
            let mut session = handle.write().await;
            let bot = session.add_bot("H").unwrap();
            session.set_ready("H", true).unwrap();
            session.start("H").unwrap();
            bot
        };
        (code, handle, bot)
    }

    #[tokio::test]
    async fn bot_plays_its_turn() {
        let lobby = Lobby::with_dice(Arc::new(ScriptedDice::new(&[1, 6, 1])));
        let hub = Hub::new();
        let (code, handle, bot) = bot_room(&lobby).await;
        let (_, mut rx) = hub.subscribe(&code).await;
        // If the human drew the first turn, burn it with a one and a pass.
        if handle.read().await.bot_turn().is_none() {
            let mut session = handle.write().await;
            session.roll_dice("H", lobby.dice()).unwrap();
            session.skip_turn("H").unwrap();
        }
        assert_eq!(handle.read().await.bot_turn(), Some(bot.clone()));
        bot_pass(&lobby, &hub).await;
        // The bot rolled and settled its turn: either it moved (on a six)
        // or it skipped; in both cases the roll state is consumed.
        assert!(!handle.read().await.has_rolled());
        let first = rx.recv().await.unwrap();
        assert!(first.contains("\"type\":\"dice_rolled\""));
        let second = rx.recv().await.unwrap();
        assert!(
            second.contains("\"type\":\"piece_moved\"")
                || second.contains("\"type\":\"turn_skipped\"")
        );
    }
    #[tokio::test]
    async fn idle_rooms_are_left_alone() {
        let lobby = Lobby::new();
        let hub = Hub::new();
        let (code, handle) = lobby.create("H", "Host", 2).await.unwrap();
        let (_, mut rx) = hub.subscribe(&code).await;
        bot_pass(&lobby, &hub).await;
        timeout_pass(&lobby, &hub).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(handle.read().await.phase(), Phase::Waiting);
    }
    #[tokio::test]
    async fn timeout_skips_expired_turns() {
        let lobby = Lobby::new();
        let hub = Hub::new();
        let (code, handle) = lobby.create("H", "Host", 2).await.unwrap();
        {
            let mut session = handle.write().await;
            session.join("P", "Pat").unwrap();
            session.set_ready("H", true).unwrap();
            session.set_ready("P", true).unwrap();
            session.start("H").unwrap();
            session.set_turn_limit(Duration::ZERO);
        }
        let first = handle.read().await.current_turn().unwrap().to_string();
        let (_, mut rx) = hub.subscribe(&code).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        timeout_pass(&lobby, &hub).await;
        let json = rx.recv().await.unwrap();
        assert!(json.contains("\"type\":\"turn_timeout\""));
        assert!(json.contains(&format!("\"player_id\":\"{}\"", first)));
        assert_ne!(handle.read().await.current_turn(), Some(first.as_str()));
    }
}
