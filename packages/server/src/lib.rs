#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the accident hotspots page.
//!
//! Serves a single HTML page (upload form, `Leaflet` map, ranking table)
//! and a JSON API. The page posts the chosen CSV to `/api/report`; the
//! handler loads it through the shared [`RecordCache`], aggregates it, and
//! returns every derived view in one response. Nothing is persisted.

mod handlers;
pub mod interactive;

use std::str::FromStr;
use std::sync::Mutex;

use accident_hotspots_hotspot::DEFAULT_HOTSPOT_LIMIT;
use accident_hotspots_loader::cache::{DEFAULT_CACHE_CAPACITY, RecordCache};
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default maximum upload size (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Hotspot limit used when a request does not specify one.
    pub hotspot_limit: usize,
    /// Number of distinct uploads kept parsed in memory.
    pub cache_capacity: usize,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            hotspot_limit: DEFAULT_HOTSPOT_LIMIT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `HOTSPOT_LIMIT`, `RECORD_CACHE_SIZE` and
    /// `MAX_UPLOAD_BYTES`, falling back to defaults for unset or invalid
    /// values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: env_or("PORT", defaults.port),
            hotspot_limit: env_or("HOTSPOT_LIMIT", defaults.hotspot_limit),
            cache_capacity: env_or("RECORD_CACHE_SIZE", defaults.cache_capacity),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}

fn env_or<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(name: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Ignoring invalid {name}={raw:?}, using {default}");
        default
    })
}

/// Shared application state.
pub struct AppState {
    /// Parsed uploads keyed by content fingerprint.
    pub cache: Mutex<RecordCache>,
    /// Hotspot limit used when a request does not specify one.
    pub default_limit: usize,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Creates fresh state for `config`.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            cache: Mutex::new(RecordCache::new(config.cache_capacity)),
            default_limit: config.hotspot_limit,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Registers the page and API routes.
///
/// Query string errors are answered with the same JSON error body as
/// rejected uploads.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handlers::query_error));
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/report", web::post().to(handlers::report)),
    );
}

/// Starts the accident hotspots server.
///
/// This is a regular async function: the caller provides the runtime (e.g.
/// via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Hotspot limit {}, record cache capacity {}, max upload {} bytes",
        config.hotspot_limit,
        config.cache_capacity,
        config.max_upload_bytes
    );

    let state = web::Data::new(AppState::new(&config));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.hotspot_limit, 10);
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn invalid_values_fall_back_to_default() {
        assert_eq!(parse_or("PORT", "not-a-port", 8080_u16), 8080);
        assert_eq!(parse_or("PORT", "70000", 8080_u16), 8080);
        assert_eq!(parse_or("PORT", " 9090 ", 8080_u16), 9090);
        assert_eq!(parse_or("HOTSPOT_LIMIT", "25", 10_usize), 25);
    }
}
