//! TCP transport to a remote backend.
//!
//! One persistent connection, opened lazily and dropped on any transport
//! failure so the next request reconnects. Requests are serialized: each
//! writes one line and reads exactly one reply line under a timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::backend::Backend;
use crate::error::GatewayError;
use crate::protocol::{
    create_request, parse_response, HintBody, HistoryBody, MoveBody, NewGameBody, UndoBody, WireRequest,
};
use crate::types::Difficulty;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Remote backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub addr: String,
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Read `GOMOKU_BACKEND_ADDR` and `GOMOKU_REQUEST_TIMEOUT_MS`.
    ///
    /// Returns None when no backend address is configured.
    pub fn from_env() -> Option<Self> {
        use std::env;

        let addr = env::var("GOMOKU_BACKEND_ADDR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;

        let timeout_ms = env::var("GOMOKU_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&ms: &u64| ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Some(Self { addr, timeout_ms })
    }
}

#[derive(Debug)]
struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Backend reached over the line protocol.
#[derive(Debug)]
pub struct TcpBackend {
    config: ClientConfig,
    seq: AtomicU64,
    conn: Mutex<Option<Connection>>,
}

impl TcpBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            seq: AtomicU64::new(0),
            conn: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.config.addr
    }

    async fn call<T: DeserializeOwned>(&self, body: WireRequest) -> Result<T, GatewayError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut line = serde_json::to_string(&create_request(seq, body))?;
        line.push('\n');

        let mut conn = self.conn.lock().await;
        let limit = Duration::from_millis(self.config.timeout_ms);
        let reply = match tokio::time::timeout(limit, round_trip(&mut conn, &self.config.addr, &line)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(seq, error = %e, "backend request failed");
                *conn = None;
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(seq, timeout_ms = self.config.timeout_ms, "backend request timed out");
                *conn = None;
                return Err(GatewayError::Timeout(self.config.timeout_ms));
            }
        };

        let parsed = parse_response(&reply, seq);
        if let Err(GatewayError::Malformed(reason)) = &parsed {
            // The stream may be out of step; start over on the next request.
            tracing::warn!(seq, %reason, "dropping backend connection");
            *conn = None;
        }
        parsed
    }
}

async fn round_trip(slot: &mut Option<Connection>, addr: &str, line: &str) -> Result<String, GatewayError> {
    if slot.is_none() {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        tracing::info!(%addr, "connected to backend");
        *slot = Some(Connection {
            reader: BufReader::new(reader),
            writer,
        });
    }
    let Some(conn) = slot.as_mut() else {
        return Err(GatewayError::Closed);
    };

    conn.writer.write_all(line.as_bytes()).await?;
    conn.writer.flush().await?;

    let mut reply = String::new();
    if conn.reader.read_line(&mut reply).await? == 0 {
        return Err(GatewayError::Closed);
    }
    Ok(reply)
}

impl Backend for TcpBackend {
    async fn new_game(&self, difficulty: Difficulty) -> Result<NewGameBody, GatewayError> {
        self.call(WireRequest::NewGame { difficulty }).await
    }

    async fn make_move(&self, session_id: String, row: i32, col: i32) -> Result<MoveBody, GatewayError> {
        self.call(WireRequest::Move { session_id, row, col }).await
    }

    async fn undo(&self, session_id: String, steps: u8) -> Result<UndoBody, GatewayError> {
        self.call(WireRequest::Undo { session_id, steps }).await
    }

    async fn hint(&self, session_id: String) -> Result<HintBody, GatewayError> {
        self.call(WireRequest::Hint { session_id }).await
    }

    async fn history(&self) -> Result<HistoryBody, GatewayError> {
        self.call(WireRequest::History).await
    }
}
