use std::env;

use anyhow::Result;
use divider_api::build_app;
use divider_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("divider_api");

    let bind = env::var("DIVIDER_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app().await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "prompt divider api started");

    axum::serve(listener, app).await?;
    Ok(())
}
