//! One interactive session: the evaluation store plus the UI state that
//! mirrors it.

use std::path::{Path, PathBuf};

use sentinel_analysis_contract::AnalysisProvider;
use sentinel_core::{EvaluationInputs, ModelEvaluation};
use sentinel_report::export_report;
use sentinel_store::{EvaluationStore, FileBackend, StoreError, SubmitOutcome};
use sentinel_ui::render::render_tab;
use sentinel_ui::{SortOption, UiState, ViewTab};

use crate::{AppConfig, AppError, app_version, redact_sensitive};

/// Store and UI state driven together by user intents.
pub struct Session {
    store: EvaluationStore,
    ui: UiState,
}

impl Session {
    /// Creates a session over an already opened store.
    pub fn new(store: EvaluationStore, draft: EvaluationInputs) -> Self {
        Self {
            store,
            ui: UiState::new(format!("v{}", app_version()), draft),
        }
    }

    /// Opens the file-backed history under `config.data_dir`.
    pub fn open(config: &AppConfig, draft: EvaluationInputs) -> Self {
        let backend = FileBackend::in_dir(&config.data_dir);
        tracing::debug!(path = %backend.path().display(), "opening history");
        Self::new(EvaluationStore::open(backend), draft)
    }

    /// Underlying store.
    pub fn store(&self) -> &EvaluationStore {
        &self.store
    }

    /// Current UI state.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Replaces the input draft.
    pub fn set_draft(&mut self, draft: EvaluationInputs) {
        self.ui.draft = draft;
    }

    /// Submits the current draft.
    ///
    /// On success the new evaluation is current and the dashboard is shown.
    /// On failure the store is untouched and the UI notice carries the
    /// redacted reason.
    ///
    /// # Errors
    /// Returns [`AppError::Analysis`] when the provider fails and
    /// [`AppError::Store`] when the history write fails.
    pub fn submit(
        &mut self,
        provider: &dyn AnalysisProvider,
    ) -> Result<Option<ModelEvaluation>, AppError> {
        self.ui.on_submit_started();
        match self.store.submit(provider, self.ui.draft.clone()) {
            Ok(SubmitOutcome::Recorded(evaluation)) => {
                self.ui.on_submit_succeeded();
                Ok(Some(evaluation))
            }
            Ok(SubmitOutcome::Superseded) => {
                self.ui.loading = false;
                Ok(None)
            }
            Err(StoreError::Analysis(failure)) => {
                let reason = redact_sensitive(&failure.to_string());
                self.ui.on_submit_failed(&reason);
                Err(AppError::Analysis(reason))
            }
            Err(error) => {
                self.ui.on_submit_failed(&redact_sensitive(&error.to_string()));
                Err(AppError::Store(error))
            }
        }
    }

    /// Shows a history entry on the dashboard. Returns `false` when the
    /// identifier is unknown; nothing changes then.
    pub fn load(&mut self, id: &str) -> bool {
        if !self.store.load_from_history(id) {
            return false;
        }
        self.store.invalidate_pending();
        if let Some(evaluation) = self.store.current() {
            self.ui.on_history_loaded(evaluation);
        }
        true
    }

    /// Deletes a history entry. Returns `Ok(false)` for unknown identifiers.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when the history write fails.
    pub fn delete(&mut self, id: &str) -> Result<bool, AppError> {
        Ok(self.store.delete_from_history(id)?)
    }

    /// Switches tab; refused (returns `false`) for evaluation tabs when
    /// nothing is displayed.
    pub fn select_tab(&mut self, tab: ViewTab) -> bool {
        let has_evaluation = self.store.current().is_some();
        self.ui.select_tab(tab, has_evaluation)
    }

    /// Changes the threat ordering.
    pub fn set_sort(&mut self, option: SortOption) {
        self.ui.set_sort(option);
    }

    /// Renders the active tab.
    pub fn render(&self) -> String {
        render_tab(&self.ui, self.store.current(), self.store.history())
    }

    /// Exports a history entry as an HTML report into `dir`.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for unknown identifiers and
    /// [`AppError::Report`] when writing fails.
    pub fn export(&self, id: &str, dir: &Path) -> Result<PathBuf, AppError> {
        let evaluation = self
            .store
            .get(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        Ok(export_report(evaluation, dir)?)
    }
}
