//! Loopback receiver used in test mode: accepts the feedback POST the
//! forwarder would otherwise send to the production host and logs it.

use anyhow::{Context, Result};
use axum::routing::post;
use axum::Router;
use tracing::info;

pub const TEST_PORT: u16 = 9871;

pub async fn run() -> Result<()> {
    let app = Router::new().route("/support/ventuzfeedback.php", post(receive));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", TEST_PORT))
        .await
        .context("Failed to bind test receiver")?;
    info!("Test receiver listening on 127.0.0.1:{}", TEST_PORT);

    axum::serve(listener, app)
        .await
        .context("Test receiver exited")?;

    Ok(())
}

async fn receive(body: String) -> &'static str {
    info!("Test receiver got body:\n{}", body);
    "post received"
}
