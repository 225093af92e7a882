use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use futures::StreamExt;
use ludo_core::PING_INTERVAL;
use ludo_core::READ_DEADLINE;
use ludo_core::WRITE_DEADLINE;
use ludo_gameroom::Event;
use ludo_gameroom::RoomError;
use ludo_hosting::Hub;
use ludo_hosting::Lobby;
use ludo_hosting::RoomHandle;
use serde::Deserialize;
use tokio::sync::mpsc;

#[derive(Deserialize)]
pub struct WsQuery {
    code: String,
    player_id: String,
}

/// Upgrades `/ws?code=..&player_id=..` into a room subscription.
///
/// The connection is rejected unless the id is a known player or spectator
/// of the room. On success a writer task drains the subscriber buffer onto
/// the socket and a reader task polices liveness; a presence event is
/// announced on both ends of the subscription.
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<WsQuery>,
    lobby: web::Data<Lobby>,
    hub: web::Data<Hub>,
) -> impl Responder {
    let WsQuery { code, player_id } = query.into_inner();
    let room = match lobby.get(&code).await {
        Ok(room) => room,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    if !room.read().await.is_member(&player_id) {
        return HttpResponse::NotFound().body(RoomError::PlayerNotFound.to_string());
    }
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let (subscriber, rx) = hub.subscribe(&code).await;
            let snapshot = room.read().await.snapshot();
            hub.broadcast(
                &code,
                &Event::PlayerConnected {
                    player_id: player_id.clone(),
                    game: snapshot,
                },
            )
            .await;
            log::debug!("[ws {}] {} connected", code, player_id);
            actix_web::rt::spawn(write_loop(session.clone(), rx));
            actix_web::rt::spawn(read_loop(
                session,
                stream,
                hub.into_inner(),
                room,
                code,
                player_id,
                subscriber,
            ));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Drains the subscriber buffer onto the socket and keeps the peer alive
/// with periodic pings. Every write carries a deadline; a missed deadline
/// or a closed buffer ends the task.
async fn write_loop(mut session: actix_ws::Session, mut rx: mpsc::Receiver<String>) {
    let start = tokio::time::Instant::now() + PING_INTERVAL;
    let mut ping = tokio::time::interval_at(start, PING_INTERVAL);
    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(json) => {
                    match tokio::time::timeout(WRITE_DEADLINE, session.text(json)).await {
                        Ok(Ok(())) => {}
                        _ => break,
                    }
                }
                None => break,
            },
            _ = ping.tick() => {
                match tokio::time::timeout(WRITE_DEADLINE, session.ping(b"")).await {
                    Ok(Ok(())) => {}
                    _ => break,
                }
            }
        }
    }
    let _ = session.close(None).await;
}

/// Polices inbound traffic: answers protocol pings and JSON `{type:"ping"}`
/// frames, ignores everything else, and tears the subscriber down when the
/// socket closes, errors, or goes silent past the read deadline.
async fn read_loop(
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
    hub: std::sync::Arc<Hub>,
    room: RoomHandle,
    code: String,
    player_id: String,
    subscriber: u64,
) {
    loop {
        match tokio::time::timeout(READ_DEADLINE, stream.next()).await {
            Err(_) => break,
            Ok(None) => break,
            Ok(Some(Err(_))) => break,
            Ok(Some(Ok(frame))) => match frame {
                actix_ws::Message::Ping(bytes) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                actix_ws::Message::Pong(_) => {}
                actix_ws::Message::Text(text) => {
                    let ping = serde_json::from_str::<serde_json::Value>(&text)
                        .map(|v| v["type"] == "ping")
                        .unwrap_or(false);
                    if ping && session.text(r#"{"type":"pong"}"#).await.is_err() {
                        break;
                    }
                }
                actix_ws::Message::Close(_) => break,
                _ => {}
            },
        }
    }
    if hub.unsubscribe(&code, subscriber).await {
        let snapshot = room.read().await.snapshot();
        hub.broadcast(
            &code,
            &Event::PlayerDisconnected {
                player_id: player_id.clone(),
                game: snapshot,
            },
        )
        .await;
    }
    log::debug!("[ws {}] {} disconnected", code, player_id);
    let _ = session.close(None).await;
}
