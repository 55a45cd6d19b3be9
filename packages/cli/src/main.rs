#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the accident hotspots tool.
//!
//! `report` prints the hotspot summary for a CSV on disk; `serve` starts the
//! web page. Without a subcommand the user is asked which one to run.

mod report;

use std::path::PathBuf;

use accident_hotspots_hotspot::DEFAULT_HOTSPOT_LIMIT;
use accident_hotspots_server::{ServerConfig, run_server};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};

use crate::report::OutputFormat;

#[derive(Parser)]
#[command(name = "accident_hotspots", about = "Drunk driving accident hotspots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hotspot report for a CSV file
    Report {
        /// CSV file with `latitude`, `longitude`, `street_name` and
        /// `is_drunk_driving` columns
        file: PathBuf,
        /// Number of hotspot streets to list with coordinates
        #[arg(long, default_value_t = DEFAULT_HOTSPOT_LIMIT)]
        limit: usize,
        /// Output format (`table` or `json`)
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Start the web server (flags override `BIND_ADDR`, `PORT`, `HOTSPOT_LIMIT`)
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Default number of hotspots shown on the map
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive();
    };

    match command {
        Commands::Report {
            file,
            limit,
            format,
        } => {
            let report = report::build(&file, limit)?;
            print!("{}", report::render(&report, format)?);
        }
        Commands::Serve { bind, port, limit } => {
            let defaults = ServerConfig::from_env();
            let config = ServerConfig {
                bind_addr: bind.unwrap_or(defaults.bind_addr),
                port: port.unwrap_or(defaults.port),
                hotspot_limit: limit.unwrap_or(defaults.hotspot_limit),
                ..defaults
            };
            actix_web::rt::System::new().block_on(run_server(config))?;
        }
    }

    Ok(())
}

fn interactive() -> Result<(), Box<dyn std::error::Error>> {
    println!("Accident Hotspots");
    println!();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&["Print a report for a CSV file", "Start server"])
        .default(0)
        .interact()?;

    if idx == 0 {
        let file: String = Input::new().with_prompt("CSV file").interact_text()?;
        let limit: usize = Input::new()
            .with_prompt("Number of hotspots")
            .default(DEFAULT_HOTSPOT_LIMIT)
            .interact_text()?;
        let report = report::build(&PathBuf::from(file), limit)?;
        print!("{}", report::render(&report, OutputFormat::Table)?);
    } else {
        actix_web::rt::System::new().block_on(accident_hotspots_server::interactive::run())?;
    }

    Ok(())
}
