//! Gateway runtime integration.
//!
//! Bridges the sync UI loop with the async backend: requests are spawned on
//! a private tokio runtime and their results queued for the loop to drain
//! with [`GatewayRuntime::try_recv`].

use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::backend::{dispatch, AnyBackend, Completion};
use crate::core::{Dispatch, Tag};

/// A finished request, tagged the way it was submitted.
///
/// Failures are already reduced to the message the user should see.
#[derive(Debug, Clone)]
pub struct Completed {
    pub tag: Tag,
    pub result: Result<Completion, String>,
}

/// Running gateway instance.
pub struct GatewayRuntime {
    rt: Runtime,
    backend: Arc<AnyBackend>,
    done_tx: mpsc::UnboundedSender<Completed>,
    done_rx: mpsc::UnboundedReceiver<Completed>,
}

impl GatewayRuntime {
    pub fn start(backend: AnyBackend) -> std::io::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("gomoku-gateway")
            .enable_all()
            .build()?;
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        tracing::info!(backend = %backend.describe(), "gateway started");
        Ok(Self {
            rt,
            backend: Arc::new(backend),
            done_tx,
            done_rx,
        })
    }

    /// Issue a request in the background.
    pub fn submit(&self, job: Dispatch) {
        let backend = Arc::clone(&self.backend);
        let done_tx = self.done_tx.clone();
        let Dispatch { tag, request } = job;
        tracing::debug!(?tag, "submit");
        self.rt.spawn(async move {
            let result = dispatch(backend.as_ref(), request).await.map_err(|e| {
                tracing::warn!(op = ?tag.op, error = %e, "request failed");
                e.display_message(tag.op)
            });
            let _ = done_tx.send(Completed { tag, result });
        });
    }

    pub fn try_recv(&mut self) -> Option<Completed> {
        self.done_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Reply, Request};
    use crate::local::LocalBackend;
    use crate::types::{Difficulty, Operation};
    use std::time::{Duration, Instant};

    fn wait(gw: &mut GatewayRuntime) -> Completed {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(done) = gw.try_recv() {
                return done;
            }
            assert!(Instant::now() < deadline, "no completion");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn submit_then_drain() {
        let mut gw = GatewayRuntime::start(AnyBackend::Local(LocalBackend::new(5))).unwrap();
        assert!(gw.try_recv().is_none());

        let tag = Tag {
            generation: 3,
            op: Operation::NewGame,
        };
        gw.submit(Dispatch {
            tag,
            request: Request::NewGame {
                difficulty: Difficulty::Easy,
            },
        });
        let done = wait(&mut gw);
        assert_eq!(done.tag, tag);
        assert!(matches!(done.result, Ok(Completion::Session(Reply::Created { .. }))));
    }

    #[test]
    fn failure_becomes_display_message() {
        let mut gw = GatewayRuntime::start(AnyBackend::Local(LocalBackend::new(5))).unwrap();
        gw.submit(Dispatch {
            tag: Tag {
                generation: 1,
                op: Operation::Undo,
            },
            request: Request::Undo {
                session_id: "gone".into(),
                steps: 2,
            },
        });
        let done = wait(&mut gw);
        assert_eq!(done.result, Err("Game not found".to_string()));
    }
}
