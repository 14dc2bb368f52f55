use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::info;

use lumina_admin::{config::ServerConfig, logging::init_tracing, server};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .expect("invalid BIND_ADDR, expected host:port");

    let state = server::ServerState::with_sample(config);
    info!(resources = state.store.resources().len(), "seeded sample catalog");
    let app = server::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind HTTP listener");
    info!("API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server crashed");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
    info!("shutting down");
}
