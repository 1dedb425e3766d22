//! Responder sample server.
//!
//! Serves a small author catalogue through the responder pipeline. Run with
//! `--publish config` to write the default `responder.json` into the
//! configuration directory instead of serving.

mod catalog;

use clap::Parser;
use responder::{AppHost, ResponderState, ServerConfig, apply_http_layers, init_logging};
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        runtime = %config.runtime,
        config_dir = %config.config_dir.display(),
        "Starting responder server"
    );

    let mut host = AppHost::boot(&config.runtime, config.config_dir.clone())?
        .with_console(config.running_in_console());
    let state = ResponderState::bootstrap_with(&mut host, catalog::register_transformers)?;

    if let Some(tag) = &config.publish {
        let written = state.publish(tag)?;
        info!(tag = %tag, files = written.len(), "Publish finished");
        return Ok(());
    }

    let app = apply_http_layers(catalog::routes(state), &config);
    serve(app, &config).await
}
