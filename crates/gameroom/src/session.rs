use super::*;
use ludo_core::CHAT_HISTORY;
use ludo_core::PIECES;
use ludo_core::Roll;
use ludo_core::SIXES_LIMIT;
use ludo_core::TurnOrder;
use ludo_core::now_millis;
use ludo_rules::Color;
use ludo_rules::Dice;
use ludo_rules::LapRule;
use ludo_rules::Spot;
use ludo_rules::Variant;
use ludo_rules::advance;
use ludo_rules::captures;
use ludo_rules::legal_moves;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Playing,
    Paused,
    Ended,
}

/// Who paused, and when, so resume can credit the time back.
#[derive(Clone, Debug)]
struct Pause {
    by: String,
    at: Instant,
}

/// Classification of a successful roll.
#[derive(Clone, Debug)]
pub struct RollOutcome {
    pub roll: Roll,
    /// Third consecutive six: the roll is reported but the turn is forfeited.
    pub three_sixes: bool,
    pub valid_moves: Vec<usize>,
}

/// Classification of a successful move.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub record: MoveRecord,
    pub captured: bool,
    /// The mover finished their fourth piece; the game is over.
    pub ended: bool,
    /// The cursor stayed with the mover (six, or capture under the policy).
    pub extra_turn: bool,
}

/// What a leave removed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Departure {
    Player,
    Spectator,
}

/// Mutable per-room aggregate. Plain state: the hosting layer serializes
/// access with a per-room lock, and every mutating operation here assumes
/// it runs exclusively.
#[derive(Debug)]
pub struct Session {
    code: String,
    variant: Variant,
    max_players: usize,
    players: BTreeMap<String, Player>,
    spectators: BTreeMap<String, Spectator>,
    phase: Phase,
    host: String,
    current: Option<String>,
    last_roll: Option<Roll>,
    has_rolled: bool,
    sixes: u8,
    winner: Option<String>,
    moves: Vec<MoveRecord>,
    chat: Vec<ChatMessage>,
    pause: Option<Pause>,
    clock: TurnClock,
    capture_extra_turn: bool,
    lap_rule: LapRule,
    created: Instant,
    last_activity: Instant,
    bots: usize,
}

impl Session {
    /// Opens a room in the waiting state with the host already seated.
    pub fn new(
        code: &str,
        host_id: &str,
        host_name: &str,
        max_players: usize,
    ) -> Result<Self, RoomError> {
        validate::max_players(max_players)?;
        validate::identifier(host_id)?;
        let host_name = validate::name(host_name)?;
        let variant = Variant::for_players(max_players);
        let mut host = Player::new(host_id, &host_name, variant.palette()[0], 0);
        host.host = true;
        let now = Instant::now();
        Ok(Self {
            code: code.to_string(),
            variant,
            max_players,
            players: BTreeMap::from([(host_id.to_string(), host)]),
            spectators: BTreeMap::new(),
            phase: Phase::Waiting,
            host: host_id.to_string(),
            current: None,
            last_roll: None,
            has_rolled: false,
            sixes: 0,
            winner: None,
            moves: Vec::new(),
            chat: Vec::new(),
            pause: None,
            clock: TurnClock::with_defaults(),
            capture_extra_turn: true,
            lap_rule: LapRule::default(),
            created: now,
            last_activity: now,
            bots: 0,
        })
    }
}

// Roster operations, lobby only.
impl Session {
    /// Seats a new player on the lowest free color.
    pub fn join(&mut self, id: &str, name: &str) -> Result<(), RoomError> {
        validate::identifier(id)?;
        let name = validate::name(name)?;
        if self.phase != Phase::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.contains_key(id) || self.spectators.contains_key(id) {
            return Err(RoomError::Validation("id already in the room".into()));
        }
        if self.players.len() >= self.max_players {
            return Err(RoomError::RoomFull);
        }
        let color = self.free_color().ok_or(RoomError::RoomFull)?;
        let order = self.players.len();
        self.players
            .insert(id.to_string(), Player::new(id, &name, color, order));
        log::debug!("[room {}] {} joined as {}", self.code, id, color);
        self.touch();
        Ok(())
    }
    /// Adds a watcher; allowed in any state.
    pub fn spectate(&mut self, id: &str, name: &str) -> Result<(), RoomError> {
        validate::identifier(id)?;
        let name = validate::name(name)?;
        if self.players.contains_key(id) || self.spectators.contains_key(id) {
            return Err(RoomError::Validation("id already in the room".into()));
        }
        self.spectators
            .insert(id.to_string(), Spectator::new(id, &name));
        self.touch();
        Ok(())
    }
    pub fn set_ready(&mut self, id: &str, ready: bool) -> Result<(), RoomError> {
        if self.phase != Phase::Waiting {
            return Err(RoomError::NotWaiting);
        }
        let player = self
            .players
            .get_mut(id)
            .ok_or(RoomError::PlayerNotFound)?;
        player.ready = ready;
        self.touch();
        Ok(())
    }
    pub fn kick(&mut self, host_id: &str, target: &str) -> Result<(), RoomError> {
        if self.phase != Phase::Waiting {
            return Err(RoomError::NotWaiting);
        }
        self.ensure_host(host_id)?;
        if host_id == target {
            return Err(RoomError::CannotKickSelf);
        }
        self.players
            .remove(target)
            .ok_or(RoomError::PlayerNotFound)?;
        self.reseat();
        log::debug!("[room {}] {} kicked {}", self.code, host_id, target);
        self.touch();
        Ok(())
    }
    /// Removes a lobby player or any spectator. During play the seat stays;
    /// only the turn moves on if it was theirs.
    pub fn leave(&mut self, id: &str) -> Result<Departure, RoomError> {
        if self.spectators.remove(id).is_some() {
            self.touch();
            return Ok(Departure::Spectator);
        }
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        match self.phase {
            Phase::Waiting => {
                self.players.remove(id);
                self.reseat();
                if self.host == id {
                    if let Some(next) = self.player_by_order(0).map(|p| p.id.clone()) {
                        self.host = next.clone();
                        if let Some(player) = self.players.get_mut(&next) {
                            player.host = true;
                        }
                        log::debug!("[room {}] host transferred to {}", self.code, next);
                    }
                }
            }
            Phase::Playing if self.current.as_deref() == Some(id) => self.advance_turn(),
            _ => {}
        }
        self.touch();
        Ok(Departure::Player)
    }
    /// Seats a bot. Bots are born ready and never block start.
    pub fn add_bot(&mut self, host_id: &str) -> Result<String, RoomError> {
        if self.phase != Phase::Waiting {
            return Err(RoomError::NotWaiting);
        }
        self.ensure_host(host_id)?;
        if self.players.len() >= self.max_players {
            return Err(RoomError::RoomFull);
        }
        let color = self.free_color().ok_or(RoomError::RoomFull)?;
        let id = format!("bot-{}", uuid::Uuid::now_v7().simple());
        self.bots += 1;
        let name = format!("Bot {}", self.bots);
        let order = self.players.len();
        self.players
            .insert(id.clone(), Player::bot(&id, &name, color, order));
        log::debug!("[room {}] bot {} seated", self.code, id);
        self.touch();
        Ok(id)
    }
    pub fn remove_bot(&mut self, host_id: &str, bot_id: &str) -> Result<(), RoomError> {
        if self.phase != Phase::Waiting {
            return Err(RoomError::NotWaiting);
        }
        self.ensure_host(host_id)?;
        match self.players.get(bot_id) {
            Some(player) if player.bot => {
                self.players.remove(bot_id);
                self.reseat();
                self.touch();
                Ok(())
            }
            Some(_) => Err(RoomError::Validation("not a bot".into())),
            None => Err(RoomError::PlayerNotFound),
        }
    }
}

// Lifecycle operations.
impl Session {
    /// Randomizes the turn order and opens play.
    pub fn start(&mut self, host_id: &str) -> Result<(), RoomError> {
        if self.phase != Phase::Waiting {
            return Err(RoomError::NotWaiting);
        }
        self.ensure_host(host_id)?;
        if self.players.len() < ludo_core::MIN_PLAYERS {
            return Err(RoomError::NotEnoughPlayers);
        }
        if !self.players.values().all(|p| p.ready) {
            return Err(RoomError::PlayersNotReady);
        }
        let mut ids: Vec<String> = self.players.keys().cloned().collect();
        ids.shuffle(&mut rand::rng());
        for (order, id) in ids.into_iter().enumerate() {
            if let Some(player) = self.players.get_mut(&id) {
                player.order = order;
            }
        }
        self.phase = Phase::Playing;
        self.current = self.player_by_order(0).map(|p| p.id.clone());
        self.has_rolled = false;
        self.last_roll = None;
        self.sixes = 0;
        self.clock.restart();
        log::info!("[room {}] game started", self.code);
        self.touch();
        Ok(())
    }
    pub fn pause(&mut self, id: &str) -> Result<(), RoomError> {
        self.ensure_playing()?;
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        self.phase = Phase::Paused;
        self.pause = Some(Pause {
            by: id.to_string(),
            at: Instant::now(),
        });
        log::debug!("[room {}] paused by {}", self.code, id);
        self.touch();
        Ok(())
    }
    pub fn resume(&mut self, id: &str) -> Result<(), RoomError> {
        if self.phase != Phase::Paused {
            return Err(RoomError::GameNotPaused);
        }
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        if let Some(pause) = self.pause.take() {
            self.clock.shift(pause.at.elapsed());
        }
        self.phase = Phase::Playing;
        log::debug!("[room {}] resumed by {}", self.code, id);
        self.touch();
        Ok(())
    }
    /// Resets the board for another round with the same roster.
    pub fn rematch(&mut self, host_id: &str) -> Result<(), RoomError> {
        if self.phase != Phase::Ended {
            return Err(RoomError::NotEnded);
        }
        self.ensure_host(host_id)?;
        for player in self.players.values_mut() {
            player.reset();
            player.ready = player.bot;
        }
        self.phase = Phase::Waiting;
        self.current = None;
        self.last_roll = None;
        self.has_rolled = false;
        self.sixes = 0;
        self.winner = None;
        self.pause = None;
        self.moves.clear();
        self.chat.clear();
        log::info!("[room {}] rematch", self.code);
        self.touch();
        Ok(())
    }
}

// Turn operations.
impl Session {
    /// Draws the die. Three consecutive sixes forfeit the turn on the spot:
    /// the roll is still reported, tagged `three_sixes`.
    pub fn roll_dice(&mut self, id: &str, dice: &dyn Dice) -> Result<RollOutcome, RoomError> {
        self.ensure_playing()?;
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        if self.current.as_deref() != Some(id) {
            return Err(RoomError::NotYourTurn);
        }
        if self.has_rolled {
            return Err(RoomError::AlreadyRolled);
        }
        let roll = dice.roll();
        self.last_roll = Some(roll);
        self.has_rolled = true;
        self.sixes = if roll == 6 { self.sixes + 1 } else { 0 };
        log::debug!("[room {}] {} rolled {}", self.code, id, roll);
        if self.sixes >= SIXES_LIMIT {
            self.has_rolled = false;
            self.advance_turn();
            self.touch();
            return Ok(RollOutcome {
                roll,
                three_sixes: true,
                valid_moves: Vec::new(),
            });
        }
        let valid_moves = self.valid_moves(id);
        self.touch();
        Ok(RollOutcome {
            roll,
            three_sixes: false,
            valid_moves,
        })
    }
    /// Applies one legal piece move: advancement, captures, the move log,
    /// win detection, and the extra-turn policy.
    pub fn move_piece(&mut self, id: &str, piece_id: usize) -> Result<MoveOutcome, RoomError> {
        self.ensure_playing()?;
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        if self.current.as_deref() != Some(id) {
            return Err(RoomError::NotYourTurn);
        }
        if !self.has_rolled {
            return Err(RoomError::MustRollFirst);
        }
        let roll = self.last_roll.ok_or(RoomError::MustRollFirst)?;
        if piece_id >= PIECES {
            return Err(RoomError::IllegalMove("no such piece".into()));
        }
        if !self.valid_moves(id).contains(&piece_id) {
            return Err(RoomError::IllegalMove("piece cannot move".into()));
        }
        let (color, from) = match self.players.get(id) {
            Some(player) => (player.color, player.pieces[piece_id].spot),
            None => return Err(RoomError::PlayerNotFound),
        };
        let step = advance(self.variant, color, from, roll, self.lap_rule);
        let to = step
            .destination()
            .ok_or_else(|| RoomError::IllegalMove("piece cannot move".into()))?;
        let victims: Vec<(String, usize)> = match to {
            Spot::Track(cell) => {
                let others: Vec<(String, [Spot; PIECES])> = self
                    .players
                    .values()
                    .filter(|p| p.id != id)
                    .map(|p| (p.id.clone(), p.spots()))
                    .collect();
                captures(
                    self.variant,
                    cell,
                    others.iter().map(|(pid, spots)| (pid.as_str(), spots)),
                )
                .into_iter()
                .map(|(pid, piece)| (pid.to_string(), piece))
                .collect()
            }
            _ => Vec::new(),
        };
        if let Some(player) = self.players.get_mut(id) {
            player.pieces[piece_id].spot = to;
        }
        for (victim, piece) in &victims {
            if let Some(player) = self.players.get_mut(victim) {
                player.pieces[*piece].spot = Spot::Home;
                log::debug!("[room {}] {} piece {} sent home", self.code, victim, piece);
            }
        }
        let captured = !victims.is_empty();
        let record = MoveRecord {
            player_id: id.to_string(),
            piece_id: piece_id as u8,
            roll,
            from_pos: from.position(),
            to_pos: to.position(),
            was_from_home: from.at_home(),
            was_capture: captured,
            captured_player_id: victims.first().map(|(pid, _)| pid.clone()),
            timestamp: now_millis(),
        };
        self.moves.push(record.clone());
        let ended = self.players.get(id).is_some_and(Player::is_done);
        let mut extra_turn = false;
        self.has_rolled = false;
        if ended {
            self.phase = Phase::Ended;
            self.winner = Some(id.to_string());
            log::info!("[room {}] {} wins", self.code, id);
        } else if roll == 6 || (captured && self.capture_extra_turn) {
            extra_turn = true;
            self.clock.restart();
        } else {
            self.advance_turn();
        }
        self.touch();
        Ok(MoveOutcome {
            record,
            captured,
            ended,
            extra_turn,
        })
    }
    /// Voluntary pass, only valid when the roll produced no legal move.
    pub fn skip_turn(&mut self, id: &str) -> Result<(), RoomError> {
        self.ensure_playing()?;
        if !self.players.contains_key(id) {
            return Err(RoomError::PlayerNotFound);
        }
        if self.current.as_deref() != Some(id) {
            return Err(RoomError::NotYourTurn);
        }
        if !self.has_rolled {
            return Err(RoomError::MustRollFirst);
        }
        if !self.valid_moves(id).is_empty() {
            return Err(RoomError::IllegalMove("moves are available".into()));
        }
        self.advance_turn();
        self.touch();
        Ok(())
    }
    /// Unconditional skip for expired turns. Re-verifies the predicate so a
    /// stale observation from the timeout loop cannot skip a fresh turn.
    pub fn force_skip(&mut self) -> Option<String> {
        if self.phase != Phase::Playing || !self.clock.expired() {
            return None;
        }
        let skipped = self.current.clone();
        self.advance_turn();
        self.touch();
        log::debug!(
            "[room {}] turn timed out for {}",
            self.code,
            skipped.as_deref().unwrap_or("?")
        );
        skipped
    }
    /// Legal piece ids for the current roll; empty off-turn or before a roll.
    pub fn valid_moves(&self, id: &str) -> Vec<usize> {
        if self.phase != Phase::Playing
            || self.current.as_deref() != Some(id)
            || !self.has_rolled
        {
            return Vec::new();
        }
        match (self.players.get(id), self.last_roll) {
            (Some(player), Some(roll)) => legal_moves(
                self.variant,
                player.color,
                &player.spots(),
                roll,
                self.lap_rule,
            ),
            _ => Vec::new(),
        }
    }
    /// Appends a chat line from a player or spectator.
    pub fn send_chat(&mut self, id: &str, text: &str) -> Result<ChatMessage, RoomError> {
        let text = validate::chat(text)?;
        let (author_name, is_spectator) = match self.players.get(id) {
            Some(player) => (player.name.clone(), false),
            None => match self.spectators.get(id) {
                Some(spectator) => (spectator.name.clone(), true),
                None => return Err(RoomError::PlayerNotFound),
            },
        };
        let message = ChatMessage {
            author_id: id.to_string(),
            author_name,
            text,
            timestamp: now_millis(),
            is_spectator,
        };
        self.chat.push(message.clone());
        self.touch();
        Ok(message)
    }
}

// Reads.
impl Session {
    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn variant(&self) -> Variant {
        self.variant
    }
    pub fn host_id(&self) -> &str {
        &self.host
    }
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }
    pub fn current_turn(&self) -> Option<&str> {
        self.current.as_deref()
    }
    pub fn has_rolled(&self) -> bool {
        self.has_rolled
    }
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }
    /// Whether the id may subscribe to this room's push channel.
    pub fn is_member(&self, id: &str) -> bool {
        self.players.contains_key(id) || self.spectators.contains_key(id)
    }
    /// The turn holder is a bot ready for the auto-play loop.
    pub fn bot_turn(&self) -> Option<String> {
        match self.phase {
            Phase::Playing => self
                .current
                .as_ref()
                .and_then(|id| self.players.get(id))
                .filter(|p| p.bot)
                .map(|p| p.id.clone()),
            _ => None,
        }
    }
    /// The current turn has exceeded its wall-clock budget.
    pub fn turn_expired(&self) -> bool {
        self.phase == Phase::Playing && self.clock.expired()
    }
    pub fn history(&self) -> &[MoveRecord] {
        &self.moves
    }
    /// Most recent chat lines, newest last.
    pub fn recent_chat(&self) -> &[ChatMessage] {
        let skip = self.chat.len().saturating_sub(CHAT_HISTORY);
        &self.chat[skip..]
    }
    /// Room turn-limit configuration; drivers read the same clock.
    pub fn set_turn_limit(&mut self, limit: Duration) {
        self.clock.set_limit(limit);
    }
    /// Sweep policy: idle lobbies and finished games, ancient rooms, and
    /// rooms everyone left.
    pub fn expendable(&self, now: Instant) -> bool {
        let idle = now.saturating_duration_since(self.last_activity);
        let age = now.saturating_duration_since(self.created);
        match self.phase {
            Phase::Waiting | Phase::Ended if idle > ludo_core::IDLE_TTL => true,
            _ if age > ludo_core::ROOM_TTL => true,
            _ if self.players.is_empty() && age > ludo_core::EMPTY_TTL => true,
            _ => false,
        }
    }
    /// The authoritative wire view of this session.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            code: self.code.clone(),
            state: self.phase,
            max_players: self.max_players,
            current_turn: self.current.clone(),
            last_roll: self.last_roll,
            has_rolled: self.has_rolled,
            consecutive_sixes: self.sixes,
            winner: self.winner.clone(),
            host_id: self.host.clone(),
            paused_by: self.pause.as_ref().map(|p| p.by.clone()),
            capture_grants_extra_turn: self.capture_extra_turn,
            players: self
                .players
                .iter()
                .map(|(id, player)| (id.clone(), self.player_view(player)))
                .collect(),
            spectators: self
                .spectators
                .iter()
                .map(|(id, spectator)| {
                    (
                        id.clone(),
                        SpectatorView {
                            id: spectator.id.clone(),
                            name: spectator.name.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

// Internals.
impl Session {
    fn ensure_playing(&self) -> Result<(), RoomError> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::Paused => Err(RoomError::GamePaused),
            Phase::Waiting | Phase::Ended => Err(RoomError::NotPlaying),
        }
    }
    fn ensure_host(&self, id: &str) -> Result<(), RoomError> {
        (self.host == id)
            .then_some(())
            .ok_or(RoomError::NotHost)
    }
    fn free_color(&self) -> Option<Color> {
        let taken: Vec<Color> = self.players.values().map(|p| p.color).collect();
        self.variant
            .palette()
            .iter()
            .find(|c| !taken.contains(c))
            .copied()
    }
    fn player_by_order(&self, order: TurnOrder) -> Option<&Player> {
        self.players.values().find(|p| p.order == order)
    }
    /// Renumbers orders stably and re-deals colors by the new seating,
    /// after a lobby removal.
    fn reseat(&mut self) {
        let mut ids: Vec<(TurnOrder, String)> = self
            .players
            .values()
            .map(|p| (p.order, p.id.clone()))
            .collect();
        ids.sort();
        for (order, (_, id)) in ids.into_iter().enumerate() {
            let color = self.variant.palette()[order];
            if let Some(player) = self.players.get_mut(&id) {
                player.order = order;
                player.color = color;
            }
        }
    }
    /// Moves the cursor to the next order. Presence is not modeled: bots
    /// and humans alike advance deterministically.
    fn advance_turn(&mut self) {
        let count = self.players.len();
        if count == 0 {
            self.current = None;
            return;
        }
        let order = self
            .current
            .as_ref()
            .and_then(|id| self.players.get(id))
            .map(|p| p.order)
            .unwrap_or(0);
        let next = (order + 1) % count;
        self.current = self.player_by_order(next).map(|p| p.id.clone());
        self.has_rolled = false;
        self.sixes = 0;
        self.clock.restart();
    }
    fn player_view(&self, player: &Player) -> PlayerView {
        PlayerView {
            id: player.id.clone(),
            name: player.name.clone(),
            color: player.color,
            pieces: player
                .pieces
                .iter()
                .map(|piece| PieceView {
                    id: piece.id,
                    position: piece.spot.position(),
                    home_stretch_index: piece.spot.stretch_index(),
                    at_home: piece.spot.at_home(),
                    on_safe_cell: piece.spot.is_safe(self.variant),
                    finished: piece.spot.finished(),
                })
                .collect(),
            turn_order: player.order,
            ready: player.ready,
            host: player.host,
            bot: player.bot,
        }
    }
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}
