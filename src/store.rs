use std::collections::{HashMap, HashSet};

use crate::error::{FailureInfo, StoreError};
use crate::models::{Hit, ResultPage, SearchResults, Status};

// A page fetch the caller is expected to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub query: String,
    pub page: u32,
    pub hits_per_page: u32,
}

// Read-only view of the active query, handed to whatever draws the results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub query: Option<String>,
    pub hits: Vec<Hit>,
    pub page: u32,
    pub status: Status,
    pub has_more: bool,
}

impl Snapshot {
    // Hits whose title or author contains `needle`, ignoring case.
    pub fn filtered(&self, needle: &str) -> Vec<&Hit> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return self.hits.iter().collect();
        }

        self.hits
            .iter()
            .filter(|hit| {
                hit.title.to_lowercase().contains(&needle)
                    || hit.author.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

pub struct SearchResultStore {
    results: HashMap<String, SearchResults>,
    // Queries with a fetch outstanding; at most one per query
    in_flight: HashSet<String>,
    active: Option<String>,
    status: Status,
    hits_per_page: u32,
}

impl SearchResultStore {
    pub fn new(hits_per_page: u32) -> Self {
        Self {
            results: HashMap::new(),
            in_flight: HashSet::new(),
            active: None,
            status: Status::Idle,
            hits_per_page,
        }
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn results(&self, query: &str) -> Option<&SearchResults> {
        self.results.get(query)
    }

    pub fn is_in_flight(&self, query: &str) -> bool {
        self.in_flight.contains(query)
    }

    // Make `term` the active query. Returns the fetch to run on a cache miss.
    pub fn submit_query(&mut self, term: &str) -> Result<Option<FetchRequest>, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        self.active = Some(term.to_string());

        // A page for this query may still be running, cached or not
        if self.in_flight.contains(term) {
            tracing::debug!(query = term, "Fetch already in flight");
            self.status = Status::Loading;
            return Ok(None);
        }

        if self.results.contains_key(term) {
            tracing::debug!(query = term, "Serving query from cache");
            self.status = Status::Ready;
            return Ok(None);
        }

        Ok(Some(self.fetch_page(term, 0)))
    }

    // Mark a fetch for `(term, page)` as started and describe it.
    pub fn fetch_page(&mut self, term: &str, page: u32) -> FetchRequest {
        self.in_flight.insert(term.to_string());
        if self.is_active(term) {
            self.status = Status::Loading;
        }

        tracing::info!(query = term, page, "Fetching page");
        FetchRequest {
            query: term.to_string(),
            page,
            hits_per_page: self.hits_per_page,
        }
    }

    pub fn merge_result(&mut self, term: &str, result: ResultPage) {
        self.in_flight.remove(term);

        let count = result.hits.len();
        match self.results.get_mut(term).filter(|_| result.page != 0) {
            Some(entry) => {
                entry.hits.extend(result.hits);
                // A late page must not move the cursor backwards
                entry.page = entry.page.max(result.page);
                if result.nb_pages.is_some() {
                    entry.nb_pages = result.nb_pages;
                }
            }
            None => {
                self.results.insert(
                    term.to_string(),
                    SearchResults {
                        hits: result.hits,
                        page: result.page,
                        nb_pages: result.nb_pages,
                    },
                );
            }
        }

        if self.is_active(term) {
            self.status = Status::Ready;
        }

        tracing::info!(
            query = term,
            page = result.page,
            count,
            total = self.results.get(term).map_or(0, |entry| entry.hits.len()),
            "Merged page"
        );
    }

    // Record a failed fetch for `term`. Accumulated hits are left as they were.
    pub fn record_failure(&mut self, term: &str, failure: FailureInfo) {
        self.in_flight.remove(term);
        tracing::warn!(query = term, error = %failure.message, "Fetch failed");

        if self.is_active(term) {
            self.status = Status::Failed(failure);
        }
    }

    // Remove the hit with `id` from `term`'s list. Returns whether anything was removed.
    pub fn dismiss(&mut self, term: &str, id: &str) -> bool {
        let Some(entry) = self.results.get_mut(term) else {
            return false;
        };

        match entry.hits.iter().position(|hit| hit.id == id) {
            Some(index) => {
                entry.hits.remove(index);
                tracing::debug!(query = term, id, "Dismissed hit");
                true
            }
            None => false,
        }
    }

    pub fn next_page_request(&mut self) -> Option<FetchRequest> {
        let term = self.active.clone()?;

        if self.in_flight.contains(&term) {
            tracing::debug!(query = %term, "Fetch already in flight, not advancing");
            return None;
        }

        let current_page = match self.results.get(&term) {
            Some(entry) if !entry.has_more() => {
                tracing::debug!(query = %term, page = entry.page, "No more pages");
                return None;
            }
            Some(entry) => entry.page,
            None => 0,
        };

        let Some(next_page) = current_page.checked_add(1) else {
            tracing::debug!(query = %term, page = current_page, "Page number exhausted");
            return None;
        };

        Some(self.fetch_page(&term, next_page))
    }

    pub fn snapshot(&self) -> Snapshot {
        let entry = self
            .active
            .as_ref()
            .and_then(|term| self.results.get(term));

        Snapshot {
            query: self.active.clone(),
            hits: entry.map(|e| e.hits.clone()).unwrap_or_default(),
            page: entry.map_or(0, |e| e.page),
            status: self.status.clone(),
            has_more: entry.is_some_and(|e| e.has_more()),
        }
    }

    fn is_active(&self, term: &str) -> bool {
        self.active.as_deref() == Some(term)
    }
}
