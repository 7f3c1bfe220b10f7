use std::time::Duration;

use tokio::time::Instant;

use crate::client::{ClientError, SearchClient};
use crate::contract::{RawSearchResponse, SearchRequest};
use crate::debounce::Debouncer;
use crate::model::{ResultRow, SearchResults};
use crate::normalize::normalize_response;
use crate::preferences::SortOrder;
use crate::query_builder::{build_request, SearchTuning};

pub const DEFAULT_SCOPE: &str = "site";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub filter_fingerprint: String,
    pub sort: SortOrder,
    pub scope: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Debouncing,
    Fetching { ticket: u64, offset: usize },
    Settled,
    Error { message: String },
}

#[derive(Debug, Clone)]
pub struct PageTicket {
    pub id: u64,
    pub key: CacheKey,
    pub request: SearchRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { added: usize, has_next_page: bool },
    Discarded,
    Skipped,
}

pub struct QueryOrchestrator {
    tuning: SearchTuning,
    query: Debouncer<String>,
    filters: Vec<String>,
    filter_fingerprint: String,
    sort: SortOrder,
    scope: String,
    dependencies: Vec<String>,
    key: CacheKey,
    pages: Vec<SearchResults>,
    phase: FetchPhase,
    next_ticket: u64,
}

impl QueryOrchestrator {
    pub fn new(tuning: SearchTuning, debounce: Duration) -> Self {
        let mut orchestrator = Self {
            tuning,
            query: Debouncer::new(debounce, String::new()),
            filters: Vec::new(),
            filter_fingerprint: String::new(),
            sort: SortOrder::Relevance,
            scope: DEFAULT_SCOPE.to_string(),
            dependencies: Vec::new(),
            key: CacheKey {
                query: String::new(),
                filter_fingerprint: String::new(),
                sort: SortOrder::Relevance,
                scope: DEFAULT_SCOPE.to_string(),
                dependencies: Vec::new(),
            },
            pages: Vec::new(),
            phase: FetchPhase::Idle,
            next_ticket: 0,
        };
        orchestrator.key = orchestrator.derive_key();
        orchestrator
    }

    pub fn phase(&self) -> &FetchPhase {
        &self.phase
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn tuning(&self) -> &SearchTuning {
        &self.tuning
    }

    pub fn debounced_query(&self) -> &str {
        self.query.settled()
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_query(&mut self, text: &str, now: Instant) {
        if !self.query.is_pending() && self.query.settled() == text {
            return;
        }
        self.query.push(text.to_string(), now);
        self.phase = FetchPhase::Debouncing;
    }

    pub fn set_query_now(&mut self, text: &str) -> Option<String> {
        let changed = self.query.settled() != text;
        self.query.reset(text.to_string());
        if self.phase == FetchPhase::Debouncing {
            self.phase = self.resting_phase();
        }
        self.refresh_key();
        changed.then(|| text.to_string()).filter(|q| !q.trim().is_empty())
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let settled = self.query.poll(now).cloned();
        if self.phase == FetchPhase::Debouncing && !self.query.is_pending() {
            self.phase = self.resting_phase();
            self.refresh_key();
        }
        settled.filter(|query| !query.trim().is_empty())
    }

    pub fn set_filters(&mut self, filters: Vec<String>, fingerprint: String) {
        self.filters = filters;
        self.filter_fingerprint = fingerprint;
        self.refresh_key();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.refresh_key();
    }

    pub fn set_scope(&mut self, scope: &str) {
        self.scope = scope.to_string();
        self.refresh_key();
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<String>) {
        self.dependencies = dependencies;
        self.refresh_key();
    }

    pub fn is_enabled(&self) -> bool {
        !self.key.query.trim().is_empty()
    }

    pub fn needs_first_page(&self) -> bool {
        self.is_enabled() && self.pages.is_empty() && self.phase == FetchPhase::Idle
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, FetchPhase::Fetching { .. })
    }

    pub fn has_next_page(&self) -> bool {
        self.pages
            .last()
            .is_some_and(|latest| (self.accumulated_rows() as u64) < latest.total_rows)
    }

    pub fn accumulated_rows(&self) -> usize {
        self.pages.iter().map(|page| page.rows.len()).sum()
    }

    pub fn pages(&self) -> &[SearchResults] {
        &self.pages
    }

    pub fn rows(&self) -> impl Iterator<Item = &ResultRow> {
        self.pages.iter().flat_map(|page| page.rows.iter())
    }

    pub fn first_page(&self) -> Option<&SearchResults> {
        self.pages.first()
    }

    pub fn latest_page(&self) -> Option<&SearchResults> {
        self.pages.last()
    }

    pub fn begin_fetch(&mut self) -> Option<PageTicket> {
        if !self.is_enabled() {
            return None;
        }
        if matches!(
            self.phase,
            FetchPhase::Debouncing | FetchPhase::Fetching { .. }
        ) {
            return None;
        }
        if !self.pages.is_empty() && !self.has_next_page() {
            return None;
        }

        let offset = self.accumulated_rows();
        self.next_ticket += 1;
        let id = self.next_ticket;
        self.phase = FetchPhase::Fetching { ticket: id, offset };

        let request = build_request(&self.key.query, &self.filters, self.sort, offset, &self.tuning);
        Some(PageTicket {
            id,
            key: self.key.clone(),
            request,
        })
    }

    pub fn complete_fetch(
        &mut self,
        ticket: PageTicket,
        result: Result<RawSearchResponse, ClientError>,
    ) -> Result<FetchOutcome, ClientError> {
        let current = matches!(
            self.phase,
            FetchPhase::Fetching { ticket: id, .. } if id == ticket.id
        ) && ticket.key == self.key;

        if !current {
            tracing::debug!(ticket = ticket.id, query = %ticket.key.query, "discarding stale search response");
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(raw) => {
                let page = normalize_response(&raw, &ticket.key.query);
                let added = page.rows.len();
                self.pages.push(page);
                self.phase = FetchPhase::Settled;
                Ok(FetchOutcome::Applied {
                    added,
                    has_next_page: self.has_next_page(),
                })
            }
            Err(error) => {
                tracing::warn!(query = %ticket.key.query, %error, "search request failed");
                self.phase = FetchPhase::Error {
                    message: error.to_string(),
                };
                Err(error)
            }
        }
    }

    /// Fetches the next page (or the first one) for the current key. A call
    /// with nothing to fetch, or with a fetch already in flight, is skipped.
    pub async fn fetch_next_page<C: SearchClient>(
        &mut self,
        client: &C,
    ) -> Result<FetchOutcome, ClientError> {
        let Some(ticket) = self.begin_fetch() else {
            return Ok(FetchOutcome::Skipped);
        };
        let result = client.search(&ticket.request).await;
        self.complete_fetch(ticket, result)
    }

    fn derive_key(&self) -> CacheKey {
        CacheKey {
            query: self.query.settled().clone(),
            filter_fingerprint: self.filter_fingerprint.clone(),
            sort: self.sort,
            scope: self.scope.clone(),
            dependencies: self.dependencies.clone(),
        }
    }

    fn refresh_key(&mut self) {
        let key = self.derive_key();
        if key == self.key {
            return;
        }
        self.key = key;
        self.pages.clear();
        if self.phase != FetchPhase::Debouncing {
            self.phase = FetchPhase::Idle;
        }
    }

    fn resting_phase(&self) -> FetchPhase {
        if self.pages.is_empty() {
            FetchPhase::Idle
        } else {
            FetchPhase::Settled
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{FetchPhase, QueryOrchestrator};
    use crate::preferences::SortOrder;
    use crate::query_builder::SearchTuning;

    fn orchestrator() -> QueryOrchestrator {
        QueryOrchestrator::new(SearchTuning::default(), Duration::from_millis(300))
    }

    #[test]
    fn whitespace_query_never_enables_fetch() {
        let mut orch = orchestrator();
        let start = Instant::now();
        orch.set_query("  ", start);
        assert_eq!(orch.poll(start + Duration::from_millis(300)), None);
        assert!(!orch.is_enabled());
        assert!(!orch.needs_first_page());
        assert!(orch.begin_fetch().is_none());
    }

    #[test]
    fn fetch_is_refused_while_debouncing() {
        let mut orch = orchestrator();
        orch.set_query_now("budget");
        orch.set_query("budget report", Instant::now());
        assert_eq!(orch.phase(), &FetchPhase::Debouncing);
        assert!(orch.begin_fetch().is_none());
    }

    #[test]
    fn sort_change_moves_key_immediately() {
        let mut orch = orchestrator();
        orch.set_query_now("budget");
        let before = orch.key().clone();
        orch.set_sort(SortOrder::Asc);
        assert_ne!(orch.key(), &before);
        assert_eq!(orch.key().sort, SortOrder::Asc);
    }

    #[test]
    fn only_one_ticket_is_outstanding() {
        let mut orch = orchestrator();
        orch.set_query_now("budget");
        let ticket = orch.begin_fetch().expect("first fetch");
        assert_eq!(ticket.request.start_row, 0);
        assert!(orch.begin_fetch().is_none());
    }
}
