//! Backend trait and request dispatch.
//!
//! A backend answers the five session operations. [`dispatch`] turns a
//! session [`Request`] into a call and the wire body into the session's
//! [`Reply`] (or a history summary).

use std::future::Future;

use crate::client::TcpBackend;
use crate::core::{HistorySummary, Reply, Request};
use crate::error::GatewayError;
use crate::local::LocalBackend;
use crate::protocol::{HintBody, HistoryBody, MoveBody, NewGameBody, UndoBody};
use crate::types::Difficulty;

/// The move-computation service, local or remote.
pub trait Backend: Send + Sync {
    fn new_game(&self, difficulty: Difficulty) -> impl Future<Output = Result<NewGameBody, GatewayError>> + Send;

    fn make_move(
        &self,
        session_id: String,
        row: i32,
        col: i32,
    ) -> impl Future<Output = Result<MoveBody, GatewayError>> + Send;

    fn undo(&self, session_id: String, steps: u8) -> impl Future<Output = Result<UndoBody, GatewayError>> + Send;

    fn hint(&self, session_id: String) -> impl Future<Output = Result<HintBody, GatewayError>> + Send;

    fn history(&self) -> impl Future<Output = Result<HistoryBody, GatewayError>> + Send;
}

/// Decoded result of a dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Session(Reply),
    History(HistorySummary),
}

/// Issue `request` against `backend`.
pub async fn dispatch<B: Backend>(backend: &B, request: Request) -> Result<Completion, GatewayError> {
    let completion = match request {
        Request::NewGame { difficulty } => {
            let body = backend.new_game(difficulty).await?;
            Completion::Session(Reply::Created {
                session_id: body.session_id,
                board: body.board,
            })
        }
        Request::Move { session_id, coord } => {
            let body = backend
                .make_move(session_id, coord.row as i32, coord.col as i32)
                .await?;
            Completion::Session(Reply::Moved(body.into_reply()?))
        }
        Request::Undo { session_id, steps } => {
            let body = backend.undo(session_id, steps).await?;
            Completion::Session(Reply::Undone {
                board: body.board,
                undo_count: body.undo_count,
            })
        }
        Request::Hint { session_id } => {
            let body = backend.hint(session_id).await?;
            Completion::Session(Reply::Hinted {
                coord: body.coord()?,
                hint_count: body.hint_count,
            })
        }
        Request::History => Completion::History(backend.history().await?.metadata.into()),
    };
    Ok(completion)
}

/// Either transport, chosen at startup.
#[derive(Debug)]
pub enum AnyBackend {
    Local(LocalBackend),
    Tcp(TcpBackend),
}

impl AnyBackend {
    /// `GOMOKU_BACKEND_ADDR` selects a remote backend; otherwise run in-process.
    pub fn from_env() -> Self {
        match crate::client::ClientConfig::from_env() {
            Some(config) => AnyBackend::Tcp(TcpBackend::new(config)),
            None => AnyBackend::Local(LocalBackend::from_env()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AnyBackend::Local(_) => "local".to_string(),
            AnyBackend::Tcp(b) => format!("tcp://{}", b.addr()),
        }
    }
}

impl Backend for AnyBackend {
    async fn new_game(&self, difficulty: Difficulty) -> Result<NewGameBody, GatewayError> {
        match self {
            AnyBackend::Local(b) => b.new_game(difficulty).await,
            AnyBackend::Tcp(b) => b.new_game(difficulty).await,
        }
    }

    async fn make_move(&self, session_id: String, row: i32, col: i32) -> Result<MoveBody, GatewayError> {
        match self {
            AnyBackend::Local(b) => b.make_move(session_id, row, col).await,
            AnyBackend::Tcp(b) => b.make_move(session_id, row, col).await,
        }
    }

    async fn undo(&self, session_id: String, steps: u8) -> Result<UndoBody, GatewayError> {
        match self {
            AnyBackend::Local(b) => b.undo(session_id, steps).await,
            AnyBackend::Tcp(b) => b.undo(session_id, steps).await,
        }
    }

    async fn hint(&self, session_id: String) -> Result<HintBody, GatewayError> {
        match self {
            AnyBackend::Local(b) => b.hint(session_id).await,
            AnyBackend::Tcp(b) => b.hint(session_id).await,
        }
    }

    async fn history(&self) -> Result<HistoryBody, GatewayError> {
        match self {
            AnyBackend::Local(b) => b.history().await,
            AnyBackend::Tcp(b) => b.history().await,
        }
    }
}
