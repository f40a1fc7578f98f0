//! chat-proxy HTTP server
//!
//! Starts an Axum web server that forwards chat completion requests upstream.

use chat_proxy::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use clap::Parser;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                println!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;

    telemetry::init(&config.observability.log_level);

    let state = AppState::from_env(config.clone());
    if state.api_key().is_none() {
        tracing::warn!(
            api_key_env = %config.upstream.api_key_env(),
            "Upstream API key is not set; chat completion requests will fail with 500"
        );
    }

    tracing::info!(
        upstream_url = %config.upstream.url(),
        model = %config.upstream.model(),
        max_completion_tokens = config.upstream.max_completion_tokens(),
        max_body_bytes = config.server.max_body_bytes,
        "Forwarding chat completions upstream"
    );

    let app = handlers::router(state);

    let addr = SocketAddr::from((config.server.ip()?, config.server.port));

    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
