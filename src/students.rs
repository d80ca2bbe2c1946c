//! Student list state: search text, risk filter and page number, kept in
//! step with the page of results on display.
//!
//! The controller never performs I/O itself. Every state change that needs
//! data hands back a [`ListRequest`] stamped with a generation number; the
//! caller runs it through [`fetch_page`] and feeds the [`ListOutcome`] to
//! [`StudentListController::complete`]. Outcomes whose generation is older
//! than the latest request are dropped, so a slow response can never
//! overwrite the results of a newer query.

use tokio::time::Instant;

use crate::client::Gateway;
use crate::debounce::Debouncer;
use crate::error::GatewayError;
use crate::models::{
    CohortStats, RiskFilter, StudentRecord, StudentsQuery, StudentsResponse, PAGE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub generation: u64,
    pub query: StudentsQuery,
}

#[derive(Debug)]
pub struct ListOutcome {
    pub generation: u64,
    pub result: Result<StudentsResponse, GatewayError>,
}

pub async fn fetch_page<G: Gateway + ?Sized>(gateway: &G, request: ListRequest) -> ListOutcome {
    let result = gateway.list_students(&request.query).await;
    ListOutcome {
        generation: request.generation,
        result,
    }
}

/// Previous/next availability for the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControls {
    pub page: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// The bar is only shown when there is more than one page.
    pub visible: bool,
}

#[derive(Debug)]
pub struct StudentListController {
    search: String,
    risk_filter: RiskFilter,
    page: u32,
    debounce: Debouncer,
    generation: u64,
    state: LoadState,
    data: Option<StudentsResponse>,
    error: Option<String>,
    mounted: bool,
}

impl Default for StudentListController {
    fn default() -> Self {
        Self::new(Debouncer::default())
    }
}

impl StudentListController {
    pub fn new(debounce: Debouncer) -> Self {
        Self {
            search: String::new(),
            risk_filter: RiskFilter::All,
            page: 1,
            debounce,
            generation: 0,
            state: LoadState::Idle,
            data: None,
            error: None,
            mounted: true,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn risk_filter(&self) -> RiskFilter {
        self.risk_filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn data(&self) -> Option<&StudentsResponse> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn students(&self) -> &[StudentRecord] {
        self.data.as_ref().map(|d| d.students.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> CohortStats {
        self.data.as_ref().map(|d| d.stats).unwrap_or_default()
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn controls(&self) -> PageControls {
        let total_pages = self.data.as_ref().map(|d| d.total_pages).unwrap_or(0);
        PageControls {
            page: self.page,
            total_pages,
            total_records: self.stats().total,
            prev_enabled: self.page > 1,
            next_enabled: self.page < total_pages,
            visible: total_pages > 1,
        }
    }

    /// The query the current search/filter/page triple maps to.
    pub fn current_query(&self) -> StudentsQuery {
        StudentsQuery {
            search: Some(self.search.clone()).filter(|s| !s.is_empty()),
            risk_filter: Some(self.risk_filter),
            page: Some(self.page),
            page_size: Some(PAGE_SIZE),
        }
    }

    pub fn load(&mut self) -> ListRequest {
        self.issue()
    }

    /// Record a keystroke in the search box.
    ///
    /// Non-empty text arms the debounce timer and returns nothing; the fetch
    /// comes from [`poll_debounce`](Self::poll_debounce) once typing stops.
    /// Clearing the box fetches immediately.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) -> Option<ListRequest> {
        let text = text.into();
        if text == self.search {
            return None;
        }

        self.search = text;
        self.page = 1;

        if self.search.is_empty() {
            Some(self.issue())
        } else {
            // Rows for the previous text must not land under the new one.
            self.generation += 1;
            self.debounce.schedule(now);
            None
        }
    }

    /// Fire the pending search fetch if its quiet period has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<ListRequest> {
        if self.debounce.fire_if_due(now) {
            Some(self.issue())
        } else {
            None
        }
    }

    pub fn set_risk_filter(&mut self, filter: RiskFilter) -> Option<ListRequest> {
        if filter == self.risk_filter && self.page == 1 {
            return None;
        }

        self.risk_filter = filter;
        self.page = 1;
        Some(self.issue())
    }

    /// Jump to a page. Pages are 1-based and, once the page count is known,
    /// bounded by it.
    pub fn go_to_page(&mut self, page: u32) -> Option<ListRequest> {
        let mut page = page.max(1);
        if let Some(total_pages) = self.data.as_ref().map(|d| d.total_pages) {
            if total_pages > 0 {
                page = page.min(total_pages);
            }
        }

        if page == self.page {
            return None;
        }

        self.page = page;
        Some(self.issue())
    }

    pub fn next_page(&mut self) -> Option<ListRequest> {
        if !self.controls().next_enabled {
            return None;
        }
        self.go_to_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> Option<ListRequest> {
        if !self.controls().prev_enabled {
            return None;
        }
        self.go_to_page(self.page - 1)
    }

    /// Apply a finished fetch. Returns whether it was applied.
    pub fn complete(&mut self, outcome: ListOutcome) -> bool {
        if !self.mounted {
            tracing::debug!(generation = outcome.generation, "list no longer displayed, dropping response");
            return false;
        }
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                latest = self.generation,
                "discarding stale student list response"
            );
            return false;
        }

        match outcome.result {
            Ok(response) => {
                if !response.stats.is_consistent() {
                    tracing::warn!(stats = ?response.stats, "cohort counters do not add up to total");
                }
                self.data = Some(response);
                self.error = None;
                self.state = LoadState::Success;
            }
            Err(err) => {
                self.error = Some(err.user_message());
                self.state = LoadState::Error;
            }
        }

        true
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.debounce.cancel();
    }

    pub async fn refresh<G: Gateway + ?Sized>(&mut self, gateway: &G) -> bool {
        let request = self.load();
        let outcome = fetch_page(gateway, request).await;
        self.complete(outcome)
    }

    fn issue(&mut self) -> ListRequest {
        // Any fetch carries the current search text, so a pending debounced
        // fetch would only repeat it.
        self.debounce.cancel();
        self.generation += 1;
        self.state = LoadState::Loading;
        self.error = None;
        ListRequest {
            generation: self.generation,
            query: self.current_query(),
        }
    }
}
