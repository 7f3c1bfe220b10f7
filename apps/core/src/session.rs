use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::actions::{self, DesktopBridge, ResultAction};
use crate::client::{ClientError, SearchClient};
use crate::config::{validate, Config};
use crate::model::{ResultRow, SearchResults};
use crate::orchestrator::{FetchOutcome, QueryOrchestrator};
use crate::overlay_state::{OverlayState, ShortcutAction};
use crate::preference_store::{PreferenceStore, StoreError};
use crate::preferences::{FileTypeSelection, FileTypeTag, Preferences, RecentSearches, SortOrder};
use crate::query_builder::{refinement_filters, SearchTuning};
use crate::sections::{group_rows, Section, SectionGroup};
use crate::viewer::{ViewItemChannel, ViewItemEmitter, ViewerState};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct SearchSession<S: PreferenceStore> {
    preferences: Preferences<S>,
    orchestrator: QueryOrchestrator,
    overlay: OverlayState,
    viewer: ViewerState,
    view_items: ViewItemChannel,
    query_text: String,
    file_types: FileTypeSelection,
    sort: SortOrder,
    recent: RecentSearches,
}

impl<S: PreferenceStore> SearchSession<S> {
    pub fn from_config(config: &Config, store: S) -> Result<Self, SessionError> {
        validate(config).map_err(SessionError::Config)?;
        Self::new(store, config.search_tuning(), config.debounce())
    }

    pub fn new(store: S, tuning: SearchTuning, debounce: Duration) -> Result<Self, SessionError> {
        let preferences = Preferences::new(store);
        let file_types = preferences.file_types()?;
        let sort = preferences.sort_order()?;
        let recent = preferences.recent_searches()?;

        let mut orchestrator = QueryOrchestrator::new(tuning, debounce);
        orchestrator.set_sort(sort);
        orchestrator.set_filters(refinement_filters(&file_types), file_types.fingerprint());

        Ok(Self {
            preferences,
            orchestrator,
            overlay: OverlayState::default(),
            viewer: ViewerState::default(),
            view_items: ViewItemChannel::default(),
            query_text: String::new(),
            file_types,
            sort,
            recent,
        })
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.preferences
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator {
        &self.orchestrator
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn file_types(&self) -> &FileTypeSelection {
        &self.file_types
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn recent_searches(&self) -> &RecentSearches {
        &self.recent
    }

    pub fn on_shortcut(&mut self) -> Result<ShortcutAction, SessionError> {
        let action = self.overlay.on_shortcut();
        if action == ShortcutAction::OpenAndFocus && !self.preferences.teaching_tip_seen()? {
            self.overlay.show_teaching_tip();
        }
        Ok(action)
    }

    pub fn dismiss_teaching_tip(&mut self) -> Result<(), SessionError> {
        if self.overlay.dismiss_teaching_tip() {
            self.preferences.mark_teaching_tip_seen()?;
        }
        Ok(())
    }

    pub fn close_dialog(&mut self) -> bool {
        let was_open = self.overlay.close();
        self.viewer.close();
        self.query_text.clear();
        self.orchestrator.set_query_now("");
        self.apply_file_type_filters();
        was_open
    }

    pub fn on_escape(&mut self) -> bool {
        if self.viewer.close() {
            return true;
        }
        self.close_dialog()
    }

    pub fn on_query_input(&mut self, text: &str, now: Instant) {
        self.query_text = text.to_string();
        self.orchestrator.set_query(text, now);
    }

    pub fn poll(&mut self, now: Instant) -> Result<Option<String>, SessionError> {
        self.view_items.drain_into(&mut self.viewer);
        match self.orchestrator.poll(now) {
            Some(query) => {
                self.recent = self.preferences.record_search(&query)?;
                Ok(Some(query))
            }
            None => Ok(None),
        }
    }

    pub fn select_recent(&mut self, query: &str) -> Result<(), SessionError> {
        self.query_text = query.to_string();
        if let Some(settled) = self.orchestrator.set_query_now(query) {
            self.recent = self.preferences.record_search(&settled)?;
        }
        Ok(())
    }

    pub fn remove_recent(&mut self, query: &str) -> Result<(), SessionError> {
        self.recent = self.preferences.remove_recent_search(query)?;
        Ok(())
    }

    pub fn clear_recent(&mut self) -> Result<(), SessionError> {
        self.preferences.clear_recent_searches()?;
        self.recent = RecentSearches::default();
        Ok(())
    }

    pub fn toggle_file_type(&mut self, tag: FileTypeTag) -> Result<&FileTypeSelection, SessionError> {
        self.file_types = self.preferences.toggle_file_type(tag)?;
        if self.overlay.current_view().is_none() {
            self.apply_file_type_filters();
        }
        Ok(&self.file_types)
    }

    pub fn set_file_types(&mut self, selection: FileTypeSelection) -> Result<(), SessionError> {
        self.preferences.set_file_types(&selection)?;
        self.file_types = selection;
        if self.overlay.current_view().is_none() {
            self.apply_file_type_filters();
        }
        Ok(())
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<(), SessionError> {
        self.preferences.set_sort_order(order)?;
        self.sort = order;
        self.orchestrator.set_sort(order);
        Ok(())
    }

    pub fn enter_section(&mut self, section: Section) {
        self.overlay.enter_section(section);
        self.orchestrator.set_filters(
            section.refinement_filters(),
            format!("section:{}", section.as_str()),
        );
    }

    pub fn back_to_search(&mut self) -> bool {
        let left = self.overlay.back_to_search();
        if left {
            self.apply_file_type_filters();
        }
        left
    }

    pub async fn fetch_next_page<C: SearchClient>(
        &mut self,
        client: &C,
    ) -> Result<FetchOutcome, SessionError> {
        Ok(self.orchestrator.fetch_next_page(client).await?)
    }

    pub async fn settle_and_fetch<C: SearchClient>(
        &mut self,
        client: &C,
    ) -> Result<FetchOutcome, SessionError> {
        if let Some(deadline) = self.orchestrator.debounce_deadline() {
            tokio::time::sleep_until(deadline).await;
        }
        self.poll(Instant::now())?;
        if !self.orchestrator.needs_first_page() {
            return Ok(FetchOutcome::Skipped);
        }
        self.fetch_next_page(client).await
    }

    pub fn rows(&self) -> Vec<&ResultRow> {
        self.orchestrator.rows().collect()
    }

    pub fn first_page(&self) -> Option<&SearchResults> {
        self.orchestrator.first_page()
    }

    pub fn groups(&self) -> Vec<SectionGroup<'_>> {
        group_rows(self.orchestrator.rows())
    }

    pub fn has_next_page(&self) -> bool {
        self.orchestrator.has_next_page()
    }

    pub fn view_emitter(&self) -> ViewItemEmitter {
        self.view_items.emitter()
    }

    pub fn trigger_action<B: DesktopBridge>(
        &mut self,
        action: ResultAction,
        index: usize,
        bridge: &mut B,
    ) -> bool {
        let Some(row) = self.orchestrator.rows().nth(index).cloned() else {
            tracing::debug!(index, "result action on missing row");
            return false;
        };
        let emitter = self.view_items.emitter();
        let done = actions::trigger(action, &row, bridge, &emitter);
        self.view_items.drain_into(&mut self.viewer);
        done
    }

    pub fn close_viewer(&mut self) -> bool {
        self.viewer.close()
    }

    fn apply_file_type_filters(&mut self) {
        self.orchestrator.set_filters(
            refinement_filters(&self.file_types),
            self.file_types.fingerprint(),
        );
    }
}
