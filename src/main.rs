mod config;
mod exchange;
mod net;
mod responder;
mod server;

use anyhow::Context as _;

use crate::{config::ServerConfig, net::Listener, server::Server};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // One thread drives the accept loop and every connection.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(ServerConfig::default()))
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = Listener::bind(&config)
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    let server = Server::new(listener, config.header_read_timeout);
    tracing::info!(message = "Accepting requests.", addr = %server.local_addr());

    server
        .serve(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
