use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::availability::{
    normalize_entries, recommend, require_known_ids, summarize, toggle, AvailabilityFact,
    EligibilityFilter,
};
use crate::catalog::{Catalog, Game, GameId, PlayerId};
use crate::display::format_player_name;
use crate::error::ValidationError;
use crate::store::FactStore;

// Catalog is fixed for the cycle; the fact store sits behind a mutex so
// replace and toggle are single-writer.
pub struct AppState {
    pub catalog: Catalog,
    pub store: Mutex<Box<dyn FactStore>>,
    pub max_entries: usize,
}

// Entries arrive as raw JSON values so one malformed entry drops alone
// instead of failing the whole batch.
#[derive(Deserialize)]
pub struct ReplaceRequest {
    entries: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    player_id: PlayerId,
    game_id: GameId,
    available: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    max_distance: Option<u32>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    cycle: String,
    games: Vec<SummaryRow>,
}

#[derive(Serialize)]
pub struct SummaryRow {
    game: Game,
    count: usize,
    players: Vec<String>,
    eligible: bool,
}

fn filter_from_query(query: &FilterQuery) -> EligibilityFilter {
    match query.max_distance {
        Some(km) => EligibilityFilter::MaxDistance(km),
        None => EligibilityFilter::All,
    }
}

// Full availability snapshot, sorted by (playerId, gameId)
async fn get_availability(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.lock().unwrap();
    match store.read_all() {
        Ok(facts) => {
            let entries: Vec<AvailabilityFact> = facts.into_iter().collect();
            Ok(HttpResponse::Ok().json(serde_json::json!({ "entries": entries })))
        }
        Err(e) => {
            log::error!("reading availability failed: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": e.to_string()})))
        }
    }
}

// Replaces the whole fact set; the last write wins
async fn put_availability(
    req: web::Json<ReplaceRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let facts = match normalize_entries(&req.entries, state.max_entries) {
        Ok(facts) => facts,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    };
    if let Err(e) = require_known_ids(&facts, &state.catalog) {
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()})));
    }

    let mut store = state.store.lock().unwrap();
    match store.replace_all(&facts) {
        Ok(()) => {
            let entries: Vec<AvailabilityFact> = facts.into_iter().collect();
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": entries.len(),
                "entries": entries,
            })))
        }
        Err(e) => {
            log::error!("replacing availability failed: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    }
}

// Flips one (player, game) pair; read-toggle-replace under the store lock
async fn toggle_availability(
    req: web::Json<ToggleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if state.catalog.player(req.player_id).is_none() {
        let err = ValidationError::UnknownPlayer(req.player_id);
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": err.to_string()})));
    }
    if state.catalog.game(req.game_id).is_none() {
        let err = ValidationError::UnknownGame(req.game_id);
        return Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": err.to_string()})));
    }

    let mut store = state.store.lock().unwrap();
    let current = match store.read_all() {
        Ok(facts) => facts,
        Err(e) => {
            log::error!("reading availability failed: {}", e);
            return Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": e.to_string()})));
        }
    };

    let next = toggle(&current, req.player_id, req.game_id, req.available);
    match store.replace_all(&next) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": next.len(),
            "available": req.available,
        }))),
        Err(e) => {
            log::error!("replacing availability failed: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    }
}

async fn get_catalog(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&state.catalog))
}

// Attendance per game in catalog order, zero counts included
async fn get_summary(
    query: web::Query<FilterQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let facts = {
        let store = state.store.lock().unwrap();
        match store.read_all() {
            Ok(facts) => facts,
            Err(e) => {
                log::error!("reading availability failed: {}", e);
                return Ok(HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": e.to_string()})));
            }
        }
    };

    let filter = filter_from_query(&query);
    let summaries = summarize(&state.catalog.players, &state.catalog.games, &facts);

    let games = state
        .catalog
        .games
        .iter()
        .map(|game| {
            let (count, players) = match summaries.get(&game.id) {
                Some(summary) => (
                    summary.count,
                    summary.players.iter().map(format_player_name).collect(),
                ),
                None => (0, Vec::new()),
            };
            SummaryRow {
                game: game.clone(),
                count,
                players,
                eligible: filter.allows(game),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(SummaryResponse {
        cycle: state.catalog.cycle.clone(),
        games,
    }))
}

async fn get_recommendation(
    query: web::Query<FilterQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let facts = {
        let store = state.store.lock().unwrap();
        match store.read_all() {
            Ok(facts) => facts,
            Err(e) => {
                log::error!("reading availability failed: {}", e);
                return Ok(HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": e.to_string()})));
            }
        }
    };

    let filter = filter_from_query(&query);
    let recommendation = recommend(&state.catalog, &facts, &filter);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "recommendation": recommendation,
    })))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn summary_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/summary.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

// Route table shared by the server and the handler tests
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/summary", web::get().to(summary_page))
        .route("/api/catalog", web::get().to(get_catalog))
        .service(
            web::resource("/api/availability")
                .route(web::get().to(get_availability))
                .route(web::put().to(put_availability)),
        )
        .route("/api/availability/toggle", web::post().to(toggle_availability))
        .route("/api/summary", web::get().to(get_summary))
        .route("/api/recommendation", web::get().to(get_recommendation));
}

pub async fn start_server(
    port: u16,
    catalog: Catalog,
    store: Box<dyn FactStore>,
    max_entries: usize,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        catalog,
        store: Mutex::new(store),
        max_entries,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static").show_files_listing())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
