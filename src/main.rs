mod cli;
mod config;
mod db;
mod models;
mod session;
mod stats;
mod timer;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    debug!("database at {:?}", db_path);

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Start { protocol }) => {
            handlers::handle_start(&conn, &config, protocol.as_deref())?;
        }
        Some(Commands::End { note }) => {
            handlers::handle_end(&conn, note.as_deref())?;
        }
        Some(Commands::Cancel) => {
            handlers::handle_cancel(&conn)?;
        }
        Some(Commands::Status) => {
            handlers::handle_status(&conn)?;
        }
        Some(Commands::History { limit }) => {
            handlers::handle_history(&conn, &config, limit)?;
        }
        Some(Commands::Stats { week }) => {
            handlers::handle_stats(&conn, week)?;
        }
        Some(Commands::Checkin { mood, energy, note }) => {
            handlers::handle_checkin(&conn, &mood, energy, note.as_deref())?;
        }
        Some(Commands::Protocols) => {
            handlers::handle_protocols(&config)?;
        }
        Some(Commands::Config { protocol, timezone }) => {
            handlers::handle_config(&mut config, protocol.as_deref(), timezone.as_deref())?;
        }
        Some(Commands::Export { json }) => {
            handlers::handle_export(&conn, &config, json)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
