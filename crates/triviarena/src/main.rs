//! The `triviarena` server binary.
//!
//! Configuration comes from the environment:
//!
//! - `TRIVIARENA_ADDR`: listen address (default `0.0.0.0:8000`)
//! - `TRIVIARENA_TICK_MS`: tick period in milliseconds (default 1000)
//! - `RUST_LOG`: log filter (default `info`)

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use triviarena::prelude::*;

const DEFAULT_TICK_MS: u64 = 1000;

#[tokio::main]
async fn main() -> Result<(), TriviarenaError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("TRIVIARENA_ADDR")
        .unwrap_or_else(|_| TriviarenaServerBuilder::DEFAULT_ADDR.to_string());
    let tick_ms = tick_ms_from_env();

    let server = TriviarenaServer::builder()
        .bind(&addr)
        .tick_period(Duration::from_millis(tick_ms))
        .build()
        .await?;
    let arena = server.arena();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ctrl-c received, shutting down");
            // Dispose closes every socket before we exit.
            if arena.shutdown().await.is_ok() {
                arena.stopped().await;
            }
        }
    }

    Ok(())
}

fn tick_ms_from_env() -> u64 {
    match std::env::var("TRIVIARENA_TICK_MS") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "invalid TRIVIARENA_TICK_MS, using default");
            DEFAULT_TICK_MS
        }),
        Err(_) => DEFAULT_TICK_MS,
    }
}
