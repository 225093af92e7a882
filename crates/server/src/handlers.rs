use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::http::StatusCode;
use actix_web::web;
use ludo_gameroom::Departure;
use ludo_gameroom::Event;
use ludo_gameroom::RoomError;
use ludo_gameroom::Snapshot;
use ludo_hosting::Hub;
use ludo_hosting::Lobby;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// REQUEST BODIES
// ============================================================================
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    host_id: String,
    host_name: String,
    max_players: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    code: String,
    player_id: String,
    player_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRequest {
    code: String,
    host_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyRequest {
    code: String,
    player_id: String,
    ready: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickRequest {
    code: String,
    host_id: String,
    player_to_kick: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    code: String,
    player_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    code: String,
    player_id: String,
    piece_id: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    code: String,
    player_id: String,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectateRequest {
    code: String,
    spectator_id: String,
    spectator_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotRemoveRequest {
    code: String,
    host_id: String,
    bot_id: String,
}

#[derive(Deserialize)]
pub struct CodeQuery {
    code: String,
}

// ============================================================================
// RESPONSE PLUMBING
// ============================================================================
fn respond<T: Serialize>(result: Result<T, RoomError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => refuse(e),
    }
}

fn refuse(e: RoomError) -> HttpResponse {
    let status = StatusCode::from_u16(e.status()).unwrap_or(StatusCode::BAD_REQUEST);
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string() }))
}

fn ack(status: &str) -> serde_json::Value {
    serde_json::json!({ "status": status })
}

// ============================================================================
// COMMANDS
// ============================================================================
pub async fn create(lobby: web::Data<Lobby>, body: web::Json<CreateRequest>) -> impl Responder {
    let result = async {
        let (code, _) = lobby
            .create(&body.host_id, &body.host_name, body.max_players)
            .await?;
        Ok::<_, RoomError>(serde_json::json!({
            "code": code,
            "maxPlayers": body.max_players,
        }))
    }
    .await;
    respond(result)
}

pub async fn join(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<JoinRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.join(&body.player_id, &body.player_name)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::PlayerJoined {
                player_id: body.player_id.clone(),
                player_name: body.player_name.trim().to_string(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn start(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<HostRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.start(&body.host_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::GameStarted {
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn ready(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<ReadyRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.set_ready(&body.player_id, body.ready)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::PlayerReady {
                player_id: body.player_id.clone(),
                ready: body.ready,
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn kick(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<KickRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.kick(&body.host_id, &body.player_to_kick)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::PlayerKicked {
                player_id: body.player_to_kick.clone(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn leave(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<PlayerRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let (departure, snapshot) = {
            let mut session = room.write().await;
            let departure = session.leave(&body.player_id)?;
            (departure, session.snapshot())
        };
        if departure == Departure::Player {
            hub.broadcast(
                &body.code,
                &Event::PlayerLeft {
                    player_id: body.player_id.clone(),
                    game: snapshot,
                },
            )
            .await;
        }
        Ok::<_, RoomError>(ack("left"))
    }
    .await;
    respond(result)
}

pub async fn pause(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<PlayerRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.pause(&body.player_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::GamePaused {
                player_id: body.player_id.clone(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn resume(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<PlayerRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.resume(&body.player_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::GameResumed {
                player_id: body.player_id.clone(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn roll(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<PlayerRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let (outcome, snapshot) = {
            let mut session = room.write().await;
            let outcome = session.roll_dice(&body.player_id, lobby.dice())?;
            (outcome, session.snapshot())
        };
        hub.broadcast(
            &body.code,
            &Event::DiceRolled {
                player_id: body.player_id.clone(),
                roll: outcome.roll,
                three_sixes: outcome.three_sixes,
                valid_moves: outcome.valid_moves.clone(),
                game: snapshot,
            },
        )
        .await;
        Ok::<_, RoomError>(serde_json::json!({
            "roll": outcome.roll,
            "validMoves": outcome.valid_moves,
            "threeSixes": outcome.three_sixes,
        }))
    }
    .await;
    respond(result)
}

pub async fn move_piece(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<MoveRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let (outcome, snapshot) = {
            let mut session = room.write().await;
            let outcome = session.move_piece(&body.player_id, body.piece_id)?;
            (outcome, session.snapshot())
        };
        hub.broadcast(
            &body.code,
            &Event::PieceMoved {
                player_id: body.player_id.clone(),
                piece_id: outcome.record.piece_id,
                roll: outcome.record.roll,
                captured: outcome.captured,
                game: snapshot.clone(),
            },
        )
        .await;
        if outcome.ended {
            hub.broadcast(
                &body.code,
                &Event::GameEnded {
                    winner: body.player_id.clone(),
                    game: snapshot.clone(),
                },
            )
            .await;
        }
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn skip(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<PlayerRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.skip_turn(&body.player_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::TurnSkipped {
                player_id: body.player_id.clone(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn rematch(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<HostRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.rematch(&body.host_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::Rematch {
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn chat(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<ChatRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let (message, snapshot) = {
            let mut session = room.write().await;
            let message = session.send_chat(&body.player_id, &body.message)?;
            (message, session.snapshot())
        };
        hub.broadcast(
            &body.code,
            &Event::ChatMessage {
                message,
                game: snapshot,
            },
        )
        .await;
        Ok::<_, RoomError>(ack("sent"))
    }
    .await;
    respond(result)
}

pub async fn spectate(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<SpectateRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.spectate(&body.spectator_id, &body.spectator_name)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::SpectatorJoined {
                spectator_id: body.spectator_id.clone(),
                spectator_name: body.spectator_name.trim().to_string(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn add_bot(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<HostRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let (bot_id, bot_name, snapshot) = {
            let mut session = room.write().await;
            let bot_id = session.add_bot(&body.host_id)?;
            let bot_name = session
                .player(&bot_id)
                .map(|p| p.name().to_string())
                .unwrap_or_default();
            (bot_id, bot_name, session.snapshot())
        };
        hub.broadcast(
            &body.code,
            &Event::PlayerJoined {
                player_id: bot_id.clone(),
                player_name: bot_name,
                game: snapshot.clone(),
            },
        )
        .await;
        let mut value = serde_json::to_value(&snapshot).expect("serialize snapshot");
        value["botId"] = serde_json::json!(bot_id);
        Ok::<_, RoomError>(value)
    }
    .await;
    respond(result)
}

pub async fn remove_bot(
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
    body: web::Json<BotRemoveRequest>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&body.code).await?;
        let snapshot = {
            let mut session = room.write().await;
            session.remove_bot(&body.host_id, &body.bot_id)?;
            session.snapshot()
        };
        hub.broadcast(
            &body.code,
            &Event::PlayerLeft {
                player_id: body.bot_id.clone(),
                game: snapshot.clone(),
            },
        )
        .await;
        Ok::<_, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

// ============================================================================
// READS
// ============================================================================
pub async fn state(lobby: web::Data<Lobby>, query: web::Query<CodeQuery>) -> impl Responder {
    let result = async {
        let room = lobby.get(&query.code).await?;
        let snapshot = room.read().await.snapshot();
        Ok::<Snapshot, RoomError>(snapshot)
    }
    .await;
    respond(result)
}

pub async fn history(lobby: web::Data<Lobby>, query: web::Query<CodeQuery>) -> impl Responder {
    let result = async {
        let room = lobby.get(&query.code).await?;
        let moves = room.read().await.history().to_vec();
        Ok::<_, RoomError>(moves)
    }
    .await;
    respond(result)
}

pub async fn chat_history(
    lobby: web::Data<Lobby>,
    query: web::Query<CodeQuery>,
) -> impl Responder {
    let result = async {
        let room = lobby.get(&query.code).await?;
        let messages = room.read().await.recent_chat().to_vec();
        Ok::<_, RoomError>(messages)
    }
    .await;
    respond(result)
}

pub async fn stats(lobby: web::Data<Lobby>) -> impl Responder {
    HttpResponse::Ok().json(lobby.stats().await)
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
