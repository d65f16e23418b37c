use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use poolwatch::core::severity::Severity;
use poolwatch::{AppState, Config, EventLog, Notification, StateStore};

fn cli() -> Command {
    Command::new("poolwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Web dashboard for storage pool health, event logs and enclosure bays")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDR")
                .help("Listen address, overrides www.bind")
                .value_parser(clap::value_parser!(SocketAddr)),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_name("FILE")
                .help("Publish pools and usage from a JSON snapshot at startup")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    poolwatch::init_logging();
    let matches = cli().get_matches();

    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("Failed to load configuration")?;
    if let Some(bind) = matches.get_one::<SocketAddr>("bind") {
        config.www.bind = *bind;
    }

    let store = StateStore::new();
    if let Some(path) = matches.get_one::<PathBuf>("snapshot") {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {:?}", path))?;
        store
            .publish_json(&json)
            .with_context(|| format!("Invalid snapshot file: {:?}", path))?;
    }

    let event_log = Arc::new(EventLog::new(
        config.www.log_buffer,
        config.classifier().log_severity,
    ));
    event_log.append(Notification::message(
        Severity::Info,
        format!("poolwatch {} starting", env!("CARGO_PKG_VERSION")),
    ));

    let state = AppState::new(config, store, event_log);
    poolwatch::web::serve(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Shutdown requested");
    })
    .await
}
