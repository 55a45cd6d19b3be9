//! Interactive mode for the server.
//!
//! Prompts for bind address, port and hotspot limit before starting the
//! server. Values from the environment are offered as defaults.

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Accident Hotspots Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let hotspot_limit: usize = Input::new()
        .with_prompt("Hotspots shown on the map")
        .default(defaults.hotspot_limit)
        .interact_text()
        .unwrap_or(defaults.hotspot_limit);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(ServerConfig {
        bind_addr,
        port,
        hotspot_limit,
        ..defaults
    })
    .await
}
