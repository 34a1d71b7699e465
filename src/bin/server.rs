//! Reference Gomoku backend over TCP.
//!
//! Serves the in-process rules engine and AI on the line protocol so the
//! terminal client (or `nc`) can play against it remotely.

use std::sync::Arc;

use anyhow::Result;

use gomoku_session::gateway::{run_server, LocalBackend, ServerConfig};
use gomoku_session::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_stderr();

    let config = ServerConfig::from_env();
    let backend = Arc::new(LocalBackend::from_env());
    run_server(config, backend, None).await
}
