#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the accident hotspots server.
//!
//! Configuration comes from the environment; see
//! [`accident_hotspots_server::ServerConfig::from_env`].

use accident_hotspots_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    run_server(ServerConfig::from_env()).await
}
