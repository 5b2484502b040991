mod auth;
mod comments;
mod config;
mod db;
mod error;
mod pagination;
mod paging;
mod planner;
#[cfg(test)]
mod test_helpers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::{Config, ScopeMode};
use crate::db::DbPool;
use crate::pagination::Scope;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub jwt_secret: String,
    pub scope_mode: ScopeMode,
    /// Confirmation page that form posts redirect to.
    pub redirect_to: String,
}

impl AppState {
    pub fn new(db: DbPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            scope_mode: config.scope,
            redirect_to: config.redirect_to.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Comments
        .route(
            "/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        // Pagination
        .route(
            "/pagination-state",
            get(pagination::get_pagination_state).post(pagination::update_current_page),
        )
        .route("/pagination-config", post(pagination::update_page_size))
        .route("/pagination-filter", post(pagination::update_filter))
        .with_state(state)
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;
    if config.jwt_secret == crate::config::DEV_JWT_SECRET {
        warn!("using the development JWT secret; set BOARD_JWT_SECRET");
    }

    let pool = db::open_pool(&config.database_url)?;
    db::run_migrations(&pool)?;

    if config.scope == ScopeMode::Global {
        let current =
            db::with_conn(&pool, |conn| pagination::get_or_init(conn, &Scope::Global)).await?;
        info!(total = current.total, filter = %current.filter, "global pagination state ready");
    }

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<axum::http::HeaderValue>()?)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any());

    let app = router(AppState::new(pool, &config))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, scope = ?config.scope, "comment board listening");
    axum::serve(listener, app).await?;

    Ok(())
}
