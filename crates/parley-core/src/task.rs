use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::{ChatBackend, ChatError};
use crate::conversation::PendingRequest;

/// A chat request running in the background.
///
/// Nothing cancels a request during normal use, but every task carries a
/// token so outstanding requests can be dropped on shutdown.
pub struct RequestTask {
    slot: usize,
    cancel: CancellationToken,
    handle: JoinHandle<Result<String, ChatError>>,
}

impl RequestTask {
    pub fn spawn(backend: Arc<dyn ChatBackend>, pending: PendingRequest) -> Self {
        let PendingRequest { slot, request } = pending;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => Err(ChatError::Cancelled),
                result = backend.send(&request) => result,
            }
        });

        Self { slot, cancel, handle }
    }

    /// Index of the placeholder this request resolves
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the outcome. Returns the slot alongside it.
    pub async fn join(self) -> (usize, Result<String, ChatError>) {
        let outcome = match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ChatError::Cancelled),
            Err(e) => Err(ChatError::Transport(e.to_string())),
        };
        (self.slot, outcome)
    }
}
