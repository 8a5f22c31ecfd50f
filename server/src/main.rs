use clap::Parser;
use log::info;
use server::config::{Args, Config};
use server::map_catalog::{BuiltinMaps, MapCatalog};
use server::registry::ClientRegistry;
use server::router::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Warning: RUST_LOG environment variable not set. Set it to display logs!");
        eprintln!("Recommended: RUST_LOG=info cargo run");
    }

    let args = Args::parse();
    let config = Config::from_args(args);

    let catalog = MapCatalog::load(&BuiltinMaps);
    if catalog.is_empty() {
        return Err("no maps available: the configured MapSource loaded zero maps".into());
    }

    info!("Starting game server on {}", config.addr());
    info!(
        "Tick rate: {} Hz ({:?} per tick)",
        config.tick_rate,
        config.tick_interval()
    );

    let listener = TcpListener::bind(config.addr()).await?;
    info!("listening on {}", config.addr());

    let registry = Arc::new(Mutex::new(ClientRegistry::new()));
    let instances = Arc::new(Mutex::new(HashMap::new()));
    let router = Router::new(
        registry,
        instances,
        Arc::new(catalog),
        config.player_speed,
        config.tick_interval(),
    );

    let mut connections = tokio::task::JoinSet::new();
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, addr)) => {
                        info!("new connection from {addr}");
                        let router = router.clone();
                        connections.spawn(async move {
                            server::connection::run(socket, router).await;
                        });
                    }
                    Err(e) => log::warn!("accept error: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT received, closing listener");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, closing listener");
                break;
            }
            Some(result) = connections.join_next() => {
                if let Err(e) = result {
                    log::warn!("connection task panicked: {e}");
                }
            }
        }
    }

    drop(listener);
    router.stop_all_instances().await;
    info!("closing {} active connection(s)", connections.len());
    connections.abort_all();
    while connections.join_next().await.is_some() {}
    info!("server stopped");

    Ok(())
}
