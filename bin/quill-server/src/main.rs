//! # Quill Server
//!
//! The entry point that assembles the blog RPC backend: env config, the
//! lazily-connected SQLite store, the HMAC session verifier, and the
//! actix-web surface from `quill-api`.

use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use quill_api::handlers::AppState;
use quill_api::middleware;
use quill_auth_hmac::HmacIdentityProvider;
use quill_db_sqlite::SqliteStore;

struct Config {
    /// Absent is a supported mode: the store serves empty reads and
    /// rejects hard mutations.
    database_url: Option<String>,
    /// Identity auto-granted admin on first upsert
    owner_open_id: Option<String>,
    session_secret: String,
    bind_addr: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok(),
            owner_open_id: env::var("OWNER_OPEN_ID").ok(),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".into()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if config.database_url.is_none() {
        log::warn!("DATABASE_URL not set; reads return empty results and mutations will fail");
    }
    if config.owner_open_id.is_none() {
        log::warn!("OWNER_OPEN_ID not set; no identity will be auto-granted admin");
    }

    let store = Arc::new(SqliteStore::new(
        config.database_url.clone(),
        config.owner_open_id.clone(),
    ));

    let state = web::Data::new(AppState {
        users: store.clone(),
        posts: store,
        identity: Arc::new(HmacIdentityProvider::new(&config.session_secret)),
    });

    log::info!("quill-server listening on http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(quill_api::configure_routes)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
