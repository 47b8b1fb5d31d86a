//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use game::application::migrate_legacy::MigrateLegacyUseCase;
use game::{
    CatalogListingProvider, GameAppState, GameConfig, InMemoryChallengeStore,
    JsonLeaderboardRepository, game_router,
};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// How often idle sessions are reaped
const REAP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,game=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = game_config()?;
    config.validate()?;

    // Listing catalog
    let listings_path = PathBuf::from(env_or("LISTINGS_PATH", "data/listings.json"));
    let listings = CatalogListingProvider::from_json_file(&listings_path).await?;
    if listings.is_empty() {
        tracing::warn!(
            path = %listings_path.display(),
            "Listing catalog is empty; games cannot start"
        );
    }

    // Leaderboard store
    let leaderboard_path = PathBuf::from(env_or("LEADERBOARD_PATH", "data/leaderboard.json"));
    let leaderboard = Arc::new(JsonLeaderboardRepository::open(leaderboard_path).await?);

    // One-time legacy migration; re-running against the same file is a no-op.
    // Errors here should not prevent server startup
    if let Ok(legacy_path) = env::var("LEGACY_LEADERBOARD_PATH") {
        let migrate = MigrateLegacyUseCase::new(leaderboard.clone(), Arc::new(config.clone()));
        match migrate.execute(Path::new(&legacy_path)).await {
            Ok(report) => {
                tracing::info!(
                    migrated = report.migrated,
                    duplicates = report.duplicates_skipped,
                    already_migrated = report.already_migrated,
                    "Legacy leaderboard check completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Legacy leaderboard migration failed, continuing anyway"
                );
            }
        }
    }

    let state = GameAppState::new(
        Arc::new(listings),
        leaderboard,
        Arc::new(InMemoryChallengeStore::new()),
        config,
    );

    // Background cleanup: drop idle sessions
    let sessions = state.sessions.clone();
    let idle_ttl = state.config.session_idle_ttl;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REAP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.cleanup_idle(idle_ttl);
        }
    });

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    // Build router
    let app = Router::new()
        .nest("/api/game", game_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env_or("BIND_ADDR", "0.0.0.0:31113")
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional numeric env var
fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} has an invalid value '{raw}'"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

/// Game policy from the environment, falling back to defaults
fn game_config() -> anyhow::Result<GameConfig> {
    let mut config = GameConfig::default();
    if let Some(tolerance) = env_parse::<f64>("STREAK_TOLERANCE_PERCENT")? {
        config.scoring.streak_tolerance_percent = tolerance;
    }
    if let Some(points) = env_parse::<i64>("CHALLENGE_MAX_POINTS")? {
        config.scoring.challenge_max_points = points;
    }
    if let Some(ceiling) = env_parse::<f64>("CHALLENGE_CEILING_PERCENT")? {
        config.scoring.challenge_ceiling_percent = ceiling;
    }
    Ok(config)
}
