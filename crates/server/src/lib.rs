//! Ludo Session Server
//!
//! Binds the command surface (`/api/game/*`, `/api/stats`, `/health`) and
//! the push channel (`/ws`) onto the hosting layer, with a permissive CORS
//! policy and request logging.
//!
//! ## Submodules
//!
//! - [`handlers`] — JSON command adapters over the session operations
//! - [`ws`] — WebSocket upgrade and the per-subscriber reader/writer tasks

pub mod handlers;
pub mod ws;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use ludo_hosting::Hub;
use ludo_hosting::Lobby;
use std::sync::Arc;

#[rustfmt::skip]
pub async fn run(port: u16) -> Result<(), std::io::Error> {
    let lobby = Arc::new(Lobby::new());
    let hub = Arc::new(Hub::new());
    ludo_hosting::spawn_drivers(lobby.clone(), hub.clone());
    let lobby = web::Data::from(lobby);
    let hub = web::Data::from(hub);
    log::info!("starting ludo server on port {}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(lobby.clone())
            .app_data(hub.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/ws", web::get().to(ws::connect))
            .service(
                web::scope("/api")
                    .route("/stats", web::get().to(handlers::stats))
                    .service(
                        web::scope("/game")
                            .route("/create", web::post().to(handlers::create))
                            .route("/join", web::post().to(handlers::join))
                            .route("/start", web::post().to(handlers::start))
                            .route("/ready", web::post().to(handlers::ready))
                            .route("/kick", web::post().to(handlers::kick))
                            .route("/leave", web::post().to(handlers::leave))
                            .route("/pause", web::post().to(handlers::pause))
                            .route("/resume", web::post().to(handlers::resume))
                            .route("/roll", web::post().to(handlers::roll))
                            .route("/move", web::post().to(handlers::move_piece))
                            .route("/skip", web::post().to(handlers::skip))
                            .route("/rematch", web::post().to(handlers::rematch))
                            .route("/chat", web::post().to(handlers::chat))
                            .route("/spectate", web::post().to(handlers::spectate))
                            .route("/bot/add", web::post().to(handlers::add_bot))
                            .route("/bot/remove", web::post().to(handlers::remove_bot))
                            .route("/state", web::get().to(handlers::state))
                            .route("/history", web::get().to(handlers::history))
                            .route("/chat/history", web::get().to(handlers::chat_history)),
                    ),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
