//! Roster pipeline orchestrator
//!
//! Owns the roster state (query, filter criteria, sort key, selection and the
//! last attendee/catalog snapshots) and is its only writer. Every run fetches
//! both sources concurrently, then applies the results only if no newer run
//! was started in the meantime.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::selector::{SnapshotRevisions, ViewSelector};
use super::store::{RosterEvent, RosterStore};
use crate::config::validation::MIN_SEARCH_DEBOUNCE_MS;
use crate::config::Settings;
use crate::engine::{self, ExportFormat, ExportOutcome, FilterCriteria, Selection, SortKey};
use crate::models::{
    AttendeeId, AttendeePage, AttendeeQuery, AttendeeView, ConferenceCatalog, ConferenceId,
    PageMeta, RegistrationStatus, RosterStats,
};
use crate::services::{AttendeeSource, ConferenceSource, HttpAttendeeSource, HttpConferenceSource};
use crate::utils::errors::{ConsoleError, Result};
use crate::utils::helpers::normalize_whitespace;
use crate::utils::logging::{log_coercions, log_pipeline_run, log_source_failure};

/// Result of a refresh request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh data was applied under this request token
    Applied { token: u64, attendees: usize },
    /// A newer request started while this one was in flight; its result was dropped
    Stale,
    /// An identical request is already in flight
    Coalesced,
    /// A later search call superseded this one before its debounce window closed
    Debounced,
}

#[derive(Debug, Clone)]
struct InFlight {
    token: u64,
    query: AttendeeQuery,
}

#[derive(Debug)]
struct PipelineState {
    query: AttendeeQuery,
    criteria: FilterCriteria,
    sort_key: SortKey,
    selection: Selection,
    page: Option<AttendeePage>,
    catalog: Option<ConferenceCatalog>,
    revisions: SnapshotRevisions,
    selector: ViewSelector,
    latest_token: u64,
    inflight: Option<InFlight>,
    search_generation: u64,
}

impl PipelineState {
    fn new(page_size: u32) -> Self {
        Self {
            query: AttendeeQuery::new(1, page_size),
            criteria: FilterCriteria::default(),
            sort_key: SortKey::default(),
            selection: Selection::new(),
            page: None,
            catalog: None,
            revisions: SnapshotRevisions::default(),
            selector: ViewSelector::new(),
            latest_token: 0,
            inflight: None,
            search_generation: 0,
        }
    }

    /// Derived views for the current page, once both snapshots exist
    fn derived(&mut self) -> Option<Arc<Vec<AttendeeView>>> {
        let page = self.page.as_ref()?;
        let catalog = self.catalog.as_ref()?;
        Some(self.selector.select(self.revisions, &page.records, catalog))
    }

    /// Filtered and sorted views
    fn visible(&mut self) -> Option<Vec<AttendeeView>> {
        let derived = self.derived()?;
        let filtered = engine::filter(&derived, &self.criteria);
        Some(engine::sort(filtered, self.sort_key))
    }

    /// Drop selected ids that the current filters no longer show
    fn prune_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        if let Some(visible) = self.visible() {
            let dropped = self.selection.retain_visible(&visible);
            if dropped > 0 {
                debug!(dropped = dropped, "Pruned selection to visible attendees");
            }
        }
    }

    fn begin_request(&mut self) -> (u64, AttendeeQuery) {
        self.latest_token += 1;
        let token = self.latest_token;
        self.inflight = Some(InFlight {
            token,
            query: self.query.clone(),
        });
        (token, self.query.clone())
    }
}

/// Orchestrates fetching, derivation and presentation of the attendee roster.
///
/// Cloning yields another handle onto the same state.
pub struct RosterPipeline<A, C> {
    attendees: Arc<A>,
    conferences: Arc<C>,
    store: RosterStore,
    state: Arc<Mutex<PipelineState>>,
    max_page_size: u32,
    search_debounce: Duration,
    export_prefix: String,
}

impl<A, C> Clone for RosterPipeline<A, C> {
    fn clone(&self) -> Self {
        Self {
            attendees: Arc::clone(&self.attendees),
            conferences: Arc::clone(&self.conferences),
            store: self.store.clone(),
            state: Arc::clone(&self.state),
            max_page_size: self.max_page_size,
            search_debounce: self.search_debounce,
            export_prefix: self.export_prefix.clone(),
        }
    }
}

impl RosterPipeline<HttpAttendeeSource, HttpConferenceSource> {
    /// Build a pipeline over the HTTP sources described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let (attendees, conferences) = crate::services::SourceFactory::new(settings)?.into_parts();
        Ok(Self::new(attendees, conferences, settings))
    }
}

impl<A, C> RosterPipeline<A, C>
where
    A: AttendeeSource,
    C: ConferenceSource,
{
    /// Create a new RosterPipeline instance
    pub fn new(attendees: A, conferences: C, settings: &Settings) -> Self {
        let min_debounce = Duration::from_millis(MIN_SEARCH_DEBOUNCE_MS);
        Self {
            attendees: Arc::new(attendees),
            conferences: Arc::new(conferences),
            store: RosterStore::default(),
            state: Arc::new(Mutex::new(PipelineState::new(settings.roster.page_size))),
            max_page_size: settings.roster.max_page_size,
            search_debounce: settings.roster.search_debounce().max(min_debounce),
            export_prefix: settings.export.file_prefix.clone(),
        }
    }

    /// Use an existing store instead of a private one
    pub fn with_store(mut self, store: RosterStore) -> Self {
        self.store = store;
        self
    }

    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn query(&self) -> AttendeeQuery {
        self.lock().query.clone()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.lock().criteria.clone()
    }

    pub fn sort_key(&self) -> SortKey {
        self.lock().sort_key
    }

    /// Whether both the attendee page and the catalog have resolved at least once
    pub fn is_ready(&self) -> bool {
        let state = self.lock();
        state.page.is_some() && state.catalog.is_some()
    }

    pub fn page_meta(&self) -> Option<PageMeta> {
        self.lock().page.as_ref().map(|page| page.meta)
    }

    /// Fetch and apply the current query.
    ///
    /// Returns `Coalesced` when the same query is already in flight and
    /// `Stale` when a newer request superseded this one.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let (token, query) = {
            let mut state = self.lock();
            if let Some(ref inflight) = state.inflight {
                if inflight.query == state.query {
                    debug!(token = inflight.token, "Identical roster request in flight");
                    return Ok(RefreshOutcome::Coalesced);
                }
            }
            state.begin_request()
        };
        self.run(token, query).await
    }

    /// Re-run the full pipeline even if the same query is in flight.
    ///
    /// Used for change notifications: a request issued before the change may
    /// carry outdated data, so it is superseded rather than joined.
    pub async fn reload(&self) -> Result<RefreshOutcome> {
        let (token, query) = self.lock().begin_request();
        self.run(token, query).await
    }

    async fn run(&self, token: u64, query: AttendeeQuery) -> Result<RefreshOutcome> {
        let started = Instant::now();
        debug!(token = token, page = query.page, "Roster pipeline run started");

        let (attendees, catalog) = futures::future::join(
            self.attendees.fetch_page(&query),
            self.conferences.fetch_catalog(),
        )
        .await;

        let mut state = self.lock();
        if state.inflight.as_ref().map(|f| f.token) == Some(token) {
            state.inflight = None;
        }
        if token != state.latest_token {
            debug!(
                token = token,
                latest = state.latest_token,
                "Discarding stale roster response"
            );
            return Ok(RefreshOutcome::Stale);
        }

        match catalog {
            Ok(fetched) => {
                if !fetched.report.is_clean() {
                    debug!(report = ?fetched.report, "Conference payload normalized");
                }
                state.catalog = Some(fetched.catalog);
            }
            Err(e) => {
                log_source_failure("conferences", &e.to_string(), true);
                state.catalog = Some(ConferenceCatalog::empty());
            }
        }
        state.revisions.bump_catalog();

        let fetched = match attendees {
            Ok(fetched) => fetched,
            Err(e) => {
                log_source_failure("attendees", &e.to_string(), false);
                drop(state);
                self.store.publish(RosterEvent::RefreshFailed {
                    token,
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                });
                return Err(e);
            }
        };
        if !fetched.report.is_clean() {
            debug!(report = ?fetched.report, "Attendee payload normalized");
        }
        let rows = fetched.page.len();
        let conferences = state.catalog.as_ref().map_or(0, ConferenceCatalog::len);
        state.page = Some(fetched.page);
        state.revisions.bump_page();
        state.prune_selection();

        let stats = state
            .derived()
            .map(|views| RosterStats::from_views(&views))
            .unwrap_or_default();
        log_coercions(&stats.diagnostics);
        drop(state);

        log_pipeline_run(token, rows, conferences, started.elapsed().as_millis() as u64);
        self.store.publish(RosterEvent::ViewUpdated {
            token,
            attendees: rows,
        });
        Ok(RefreshOutcome::Applied {
            token,
            attendees: rows,
        })
    }

    /// The filtered and sorted views of the current page.
    ///
    /// `None` until both sources have resolved once. Filtering by conference
    /// or overall status only searches the attendees on the current page; the
    /// attendee source has no server-side support for those two criteria.
    pub fn view(&self) -> Option<Vec<AttendeeView>> {
        self.lock().visible()
    }

    /// Status counts over the whole current page, before client-side filtering
    pub fn stats(&self) -> Option<RosterStats> {
        self.lock()
            .derived()
            .map(|views| RosterStats::from_views(&views))
    }

    pub async fn set_page(&self, page: u32) -> Result<RefreshOutcome> {
        self.lock().query.page = page.max(1);
        self.refresh().await
    }

    pub async fn set_page_size(&self, limit: u32) -> Result<RefreshOutcome> {
        if limit == 0 || limit > self.max_page_size {
            return Err(ConsoleError::InvalidInput(format!(
                "Page size must be between 1 and {}",
                self.max_page_size
            )));
        }
        {
            let mut state = self.lock();
            state.query.limit = limit;
            state.query.page = 1;
        }
        self.refresh().await
    }

    /// Debounced free-text search.
    ///
    /// Waits for the debounce window; if another search call arrived in the
    /// meantime this one returns `Debounced` without fetching. The text goes
    /// to the backend as the `search` parameter and is refined locally; both
    /// match against name, email and company.
    pub async fn search(&self, text: impl Into<String>) -> Result<RefreshOutcome> {
        let text = text.into();
        let generation = {
            let mut state = self.lock();
            state.search_generation += 1;
            state.search_generation
        };

        tokio::time::sleep(self.search_debounce).await;

        {
            let mut state = self.lock();
            if state.search_generation != generation {
                return Ok(RefreshOutcome::Debounced);
            }
            let normalized = normalize_whitespace(&text);
            let term = (!normalized.is_empty()).then_some(normalized);
            state.query.search = term.clone();
            state.query.page = 1;
            state.criteria.text = term;
            state.prune_selection();
        }
        self.refresh().await
    }

    /// Filter by gender, both on the server and on the loaded page
    pub async fn set_gender(&self, gender: Option<String>) -> Result<RefreshOutcome> {
        {
            let mut state = self.lock();
            state.query.gender = gender.clone();
            state.query.page = 1;
            state.criteria.gender = gender;
            state.prune_selection();
        }
        self.refresh().await
    }

    pub async fn set_conference_filter(
        &self,
        conference_id: Option<ConferenceId>,
    ) -> Result<RefreshOutcome> {
        {
            let mut state = self.lock();
            state.criteria.conference_id = conference_id;
            state.prune_selection();
        }
        self.refresh().await
    }

    pub async fn set_status_filter(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<RefreshOutcome> {
        {
            let mut state = self.lock();
            state.criteria.overall_status = status;
            state.prune_selection();
        }
        self.refresh().await
    }

    /// Change the sort key; sorting is local and does not refetch
    pub fn set_sort(&self, key: SortKey) {
        self.lock().sort_key = key;
    }

    pub fn toggle_selection(&self, id: AttendeeId) -> bool {
        self.lock().selection.toggle(id)
    }

    /// Select every currently visible attendee; returns the selection size
    pub fn select_all(&self) -> usize {
        let mut state = self.lock();
        let visible = state.visible().unwrap_or_default();
        state.selection.select_all(&visible);
        state.selection.len()
    }

    pub fn clear_selection(&self) {
        self.lock().selection.clear();
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection.clone()
    }

    /// Export the selected visible attendees, or every visible one when
    /// nothing is selected
    pub fn export(&self, format: ExportFormat, date: NaiveDate) -> Result<ExportOutcome> {
        let (visible, selection) = {
            let mut state = self.lock();
            (state.visible().unwrap_or_default(), state.selection.clone())
        };
        engine::export(&visible, &selection, format, date, &self.export_prefix)
    }
}

impl<A, C> RosterPipeline<A, C>
where
    A: AttendeeSource + 'static,
    C: ConferenceSource + 'static,
{
    /// Re-run the pipeline whenever a `DataChanged` event is published on the
    /// store. The task runs until the returned handle is aborted.
    pub fn listen(&self) -> JoinHandle<()> {
        let mut events = self.store.subscribe();
        let pipeline = self.clone();

        tokio::spawn(async move {
            loop {
                let cause = match events.recv().await {
                    Ok(RosterEvent::DataChanged { cause }) => format!("{:?}", cause),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Roster listener lagged behind");
                        "lagged".to_string()
                    }
                    Err(RecvError::Closed) => break,
                };

                info!(cause = %cause, "Data changed, re-running roster pipeline");
                if let Err(e) = pipeline.reload().await {
                    warn!(
                        error = %e,
                        severity = %e.severity(),
                        "Roster reload after change notification failed"
                    );
                }
            }
        })
    }
}
