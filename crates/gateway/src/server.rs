//! TCP server exposing a backend over the line protocol
//!
//! Each connection is served by its own task. Requests on one connection are
//! answered in order; every reply echoes the request's `seq`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::backend::Backend;
use crate::error::GatewayError;
use crate::protocol::{encode_error, encode_success, extract_seq_best_effort, parse_request, WireRequest};
use crate::types::Operation;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}

impl ServerConfig {
    /// Create from `GOMOKU_SERVER_HOST` / `GOMOKU_SERVER_PORT`
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("GOMOKU_SERVER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("GOMOKU_SERVER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        Self { host, port }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Serve `backend` until the listener fails.
///
/// `ready_tx` receives the bound address, which is how tests learn an
/// ephemeral port.
pub async fn run_server<B>(
    config: ServerConfig,
    backend: Arc<B>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()>
where
    B: Backend + 'static,
{
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    tracing::info!(%bound, "gomoku backend listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, peer) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        tracing::info!(client_id, %peer, "client connected");

        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, backend).await {
                tracing::warn!(client_id, error = %e, "client error");
            }
            tracing::info!(client_id, "client disconnected");
        });
    }
}

async fn handle_client<B: Backend>(socket: TcpStream, backend: Arc<B>) -> anyhow::Result<()> {
    socket.set_nodelay(true)?;
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut reply = respond(backend.as_ref(), trimmed).await;
        reply.push('\n');
        writer.write_all(reply.as_bytes()).await?;
    }
}

/// Answer one request line with one response line (no trailing newline).
pub async fn respond<B: Backend>(backend: &B, line: &str) -> String {
    let envelope = match parse_request(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            let seq = extract_seq_best_effort(line).unwrap_or(0);
            tracing::warn!(seq, error = %e, "unparseable request");
            return encode_failure(seq, &format!("Invalid request: {e}"));
        }
    };

    let seq = envelope.seq;
    let op = envelope.body.operation();
    tracing::debug!(seq, ?op, "request");
    match envelope.body {
        WireRequest::NewGame { difficulty } => finish(seq, op, backend.new_game(difficulty).await),
        WireRequest::Move { session_id, row, col } => {
            finish(seq, op, backend.make_move(session_id, row, col).await)
        }
        WireRequest::Undo { session_id, steps } => finish(seq, op, backend.undo(session_id, steps).await),
        WireRequest::Hint { session_id } => finish(seq, op, backend.hint(session_id).await),
        WireRequest::History => finish(seq, op, backend.history().await),
    }
}

fn finish<T: Serialize>(seq: u64, op: Operation, result: Result<T, GatewayError>) -> String {
    match result {
        Ok(body) => encode_success(seq, &body).unwrap_or_else(|e| {
            tracing::error!(seq, error = %e, "failed to encode response");
            encode_failure(seq, "Internal error")
        }),
        Err(e) => {
            tracing::debug!(seq, error = %e, "request rejected");
            encode_failure(seq, &e.display_message(op))
        }
    }
}

fn encode_failure(seq: u64, message: &str) -> String {
    encode_error(seq, message)
        .unwrap_or_else(|_| format!(r#"{{"seq":{seq},"status":"error","message":"Internal error"}}"#))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;

    #[tokio::test]
    async fn respond_echoes_seq() {
        let backend = LocalBackend::new(3);
        let line = respond(&backend, r#"{"seq":12,"op":"new_game","difficulty":"easy"}"#).await;
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["seq"], 12);
        assert_eq!(v["status"], "success");
        assert!(v["session_id"].as_str().is_some());
        assert_eq!(v["board"].as_array().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn bad_request_keeps_seq() {
        let backend = LocalBackend::new(3);
        let line = respond(&backend, r#"{"seq":44,"op":"teleport"}"#).await;
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["seq"], 44);
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn rejection_carries_message() {
        let backend = LocalBackend::new(3);
        let line = respond(&backend, r#"{"seq":2,"op":"undo","session_id":"missing","steps":2}"#).await;
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "Game not found");
    }

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            port: 1,
        };
        assert!(bad.socket_addr().is_err());
    }
}
