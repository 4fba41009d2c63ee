//! Shiplog server binary.
//!
//! Wires the in-memory store, the limit gate, and the billing synchronizer
//! behind an axum router and serves it over TCP.

use std::net::{Ipv4Addr, SocketAddr};

use tracing::info;

mod config;
mod error;
mod observability;
mod routes;

use config::Config;
use observability::{LogFormat, init_observability};
use routes::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_observability(LogFormat::from_env());

    let config = Config::load();
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));

    let state = AppState::new(config.webhook_secret);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "shiplog server listening");
    axum::serve(listener, app).await
}
