use anyhow::Context;
use clap::{value_parser, Arg, Command};
use incident_api::{routes, ApiState};
use incident_core::{AllowList, Settings};
use incident_store::SqliteIncidentStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let matches = Command::new("incident-server")
        .version(incident_core::VERSION)
        .about("Incident lookup and update API")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_parser(value_parser!(SocketAddr))
                .help("Address to listen on (overrides BIND_ADDR)"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database file (overrides DB_DATABASE)"),
        )
        .get_matches();

    let mut settings = Settings::from_env().context("invalid configuration")?;
    if let Some(addr) = matches.get_one::<SocketAddr>("bind") {
        settings.server.bind_addr = *addr;
    }
    if let Some(path) = matches.get_one::<PathBuf>("database") {
        settings.database.path.clone_from(path);
    }

    let store = SqliteIncidentStore::open(&settings.database)
        .await
        .with_context(|| format!("cannot open {}", settings.database.path.display()))?;

    let allow_list = AllowList::from(&settings.database.fields);
    if allow_list.is_empty() {
        tracing::warn!("INCIDENT_FIELDS is empty: every update request will be rejected");
    }
    tracing::warn!(
        "Incident API performs no authorization of its own; expose it only to trusted clients"
    );

    let state = ApiState::new(Arc::new(store), allow_list);
    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(settings.server.bind_addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("cannot bind {}", settings.server.bind_addr))?;

    tracing::info!("Server running on {}", addr);
    server.await;
    tracing::info!("Server stopped");

    Ok(())
}
