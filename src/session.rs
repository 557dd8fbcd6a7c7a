use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::error::{FailureInfo, SearchError, StoreError};
use crate::hn_client::SearchBackend;
use crate::models::ResultPage;
use crate::store::{FetchRequest, SearchResultStore, Snapshot};

// A finished fetch, sent back from its task to the session.
#[derive(Debug)]
pub struct FetchOutcome {
    pub query: String,
    pub page: u32,
    pub result: Result<ResultPage, SearchError>,
}

// Sole writer of the store. Fetches run as tokio tasks and report back over a channel.
pub struct SearchSession {
    backend: Arc<dyn SearchBackend>,
    store: SearchResultStore,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    snapshot_tx: watch::Sender<Snapshot>,
    pending: usize,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, hits_per_page: u32) -> Self {
        let store = SearchResultStore::new(hits_per_page);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(store.snapshot());

        Self {
            backend,
            store,
            outcome_tx,
            outcome_rx,
            snapshot_tx,
            pending: 0,
        }
    }

    pub fn store(&self) -> &SearchResultStore {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    // Returns true if a fetch was started.
    pub fn submit_query(&mut self, term: &str) -> Result<bool, StoreError> {
        let request = self.store.submit_query(term)?;
        let started = request.is_some();
        if let Some(request) = request {
            self.spawn_fetch(request);
        }
        self.publish();
        Ok(started)
    }

    // Returns true if a fetch for the next page was started.
    pub fn next_page(&mut self) -> bool {
        match self.store.next_page_request() {
            Some(request) => {
                self.spawn_fetch(request);
                self.publish();
                true
            }
            None => false,
        }
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let Some(term) = self.store.active_query().map(str::to_string) else {
            return false;
        };

        let removed = self.store.dismiss(&term, id);
        if removed {
            self.publish();
        }
        removed
    }

    // Apply every fetch that has already finished, without waiting.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    // Wait for the next fetch to finish and apply it. Returns false when nothing is pending.
    pub async fn next_completion(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }

        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    // Wait until every outstanding fetch has been applied.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            let result = backend
                .search(&request.query, request.page, request.hits_per_page)
                .await;
            // The session may already be gone; nothing to report to then
            let _ = tx.send(FetchOutcome {
                query: request.query,
                page: request.page,
                result,
            });
        });
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        self.pending = self.pending.saturating_sub(1);

        match outcome.result {
            Ok(page) => self.store.merge_result(&outcome.query, page),
            Err(err) => {
                tracing::debug!(query = %outcome.query, page = outcome.page, "Fetch returned an error");
                self.store
                    .record_failure(&outcome.query, FailureInfo::from(&err));
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.store.snapshot());
    }
}
