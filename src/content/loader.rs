//! Issues fetches on a tokio runtime and marshals completions back.
//!
//! The loader is owned by the layout thread. Each cell has at most one task
//! in flight; issuing a new load for a cell aborts the previous task. Abort is
//! best-effort (a task may already have sent its completion), which is why
//! the pool re-checks the token on every completion.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use super::{
    decode_resource, Completion, ContentToken, FetchRequest, ImageFetcher, LoadRequest, TileImage,
};
use crate::error::FetchError;
use crate::pool::CellId;

struct InFlight {
    token: ContentToken,
    task: JoinHandle<()>,
}

/// Runs fetch → validate → decode for every issued load.
pub struct ContentLoader {
    fetcher: Arc<dyn ImageFetcher>,
    runtime: Handle,
    timeout: Duration,
    in_flight: HashMap<CellId, InFlight>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    issued: u64,
}

impl ContentLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, runtime: Handle, timeout: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            runtime,
            timeout,
            in_flight: HashMap::new(),
            completions_tx,
            completions_rx,
            issued: 0,
        }
    }

    /// Start loading `fetch` for the binding described by `request`.
    ///
    /// Any task still running for the same cell is aborted first.
    pub fn issue(&mut self, request: LoadRequest, fetch: FetchRequest) {
        self.cancel(request.cell);

        let LoadRequest { cell, token, .. } = request;
        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions_tx.clone();
        let timeout = self.timeout;

        trace!(%cell, %token, identity = %fetch.identity, "issuing fetch");
        let task = self.runtime.spawn(async move {
            let result = load(fetcher.as_ref(), fetch, timeout).await;
            // Send fails only once the loader is dropped.
            let _ = completions.send(Completion {
                cell,
                token,
                result,
            });
        });

        self.in_flight.insert(cell, InFlight { token, task });
        self.issued += 1;
    }

    /// Abort the task running for `cell`, if any.
    pub fn cancel(&mut self, cell: CellId) {
        if let Some(previous) = self.in_flight.remove(&cell) {
            previous.task.abort();
        }
    }

    /// Abort every task.
    pub fn cancel_all(&mut self) {
        for (_, in_flight) in self.in_flight.drain() {
            in_flight.task.abort();
        }
    }

    /// Every completion that has arrived so far, without waiting.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut ready = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.retire(&completion);
            ready.push(completion);
        }
        ready
    }

    /// Wait for the next completion.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        let completion = self.completions_rx.recv().await?;
        self.retire(&completion);
        Some(completion)
    }

    /// Drop bookkeeping for tasks that already finished and return how many
    /// are still running. A finished task's completion is already queued.
    pub fn prune_finished(&mut self) -> usize {
        self.in_flight.retain(|_, in_flight| !in_flight.task.is_finished());
        self.in_flight.len()
    }

    /// Tasks issued and not yet completed, aborted or pruned.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Total loads issued over the loader's lifetime.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn retire(&mut self, completion: &Completion) {
        let current = self
            .in_flight
            .get(&completion.cell)
            .is_some_and(|in_flight| in_flight.token == completion.token);
        if current {
            self.in_flight.remove(&completion.cell);
        }
    }
}

impl Drop for ContentLoader {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn load(
    fetcher: &dyn ImageFetcher,
    request: FetchRequest,
    timeout: Duration,
) -> Result<TileImage, FetchError> {
    let resource = tokio::time::timeout(timeout, fetcher.fetch(request))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;
    let image = decode_resource(&resource)?;
    Ok(Arc::new(image))
}
