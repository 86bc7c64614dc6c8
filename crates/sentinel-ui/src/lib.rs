#![warn(missing_docs)]
//! # sentinel-ui
//!
//! ## Purpose
//! Defines the UI-facing state model and derived views for `sentinel-llm`.
//!
//! ## Responsibilities
//! - Represent the active tab, threat sort option, input draft, loading
//!   flag, and blocking notice.
//! - Derive sorted threat catalogs and dashboard summaries without touching
//!   stored evaluations.
//! - Render text views (see [`render`]) as a pure function of state.
//!
//! ## Data flow
//! App intents mutate [`UiState`]; the shell renders
//! `render::render_tab(state, current, history)` after each intent.
//!
//! ## Ownership and lifetimes
//! `UiState` owns only ephemeral values. Evaluations are borrowed from the
//! store for the duration of a render.
//!
//! ## Error model
//! Invalid tab/sort names are rejected at parse time ([`ParseOptionError`]).
//! Tabs that need an evaluation are refused by [`UiState::select_tab`]
//! rather than rendered empty.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use sentinel_core::{EvaluationInputs, ModelEvaluation, RiskTier, Severity, Threat};

pub mod render;

/// Number of threats shown in the dashboard's mitigation roadmap.
pub const ROADMAP_LEN: usize = 4;

/// Notice shown when an analysis fails.
pub const ANALYSIS_FAILED_NOTICE: &str = "Failed to analyze model.";

/// Dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewTab {
    /// Summary cards, benchmark overview, mitigation roadmap.
    #[default]
    Overview,
    /// Sorted threat catalog.
    Threats,
    /// Benchmark score breakdown.
    Benchmarks,
    /// Past evaluations.
    History,
}

impl ViewTab {
    /// All tabs in navigation order.
    pub const ALL: [ViewTab; 4] = [
        ViewTab::Overview,
        ViewTab::Threats,
        ViewTab::Benchmarks,
        ViewTab::History,
    ];

    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ViewTab::Overview => "overview",
            ViewTab::Threats => "threats",
            ViewTab::Benchmarks => "benchmarks",
            ViewTab::History => "history",
        }
    }

    /// Navigation label.
    pub fn label(self) -> &'static str {
        match self {
            ViewTab::Overview => "Dashboard",
            ViewTab::Threats => "Threat Library",
            ViewTab::Benchmarks => "Benchmarks",
            ViewTab::History => "History",
        }
    }

    /// Whether the tab can only be shown with an evaluation on screen.
    pub fn requires_evaluation(self) -> bool {
        match self {
            ViewTab::Threats | ViewTab::Benchmarks => true,
            ViewTab::Overview | ViewTab::History => false,
        }
    }
}

impl FromStr for ViewTab {
    type Err = ParseOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ViewTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == value)
            .ok_or_else(|| ParseOptionError::new("tab", value))
    }
}

impl fmt::Display for ViewTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threat catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOption {
    /// Critical first.
    #[default]
    SeverityDesc,
    /// Low first.
    SeverityAsc,
    /// Title A-Z.
    TitleAsc,
    /// Category A-Z.
    CategoryAsc,
}

impl SortOption {
    /// All options in menu order.
    pub const ALL: [SortOption; 4] = [
        SortOption::SeverityDesc,
        SortOption::SeverityAsc,
        SortOption::TitleAsc,
        SortOption::CategoryAsc,
    ];

    /// Stable identifier (`severity-desc`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::SeverityDesc => "severity-desc",
            SortOption::SeverityAsc => "severity-asc",
            SortOption::TitleAsc => "title-asc",
            SortOption::CategoryAsc => "category-asc",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            SortOption::SeverityDesc => "Severity (Critical → Low)",
            SortOption::SeverityAsc => "Severity (Low → Critical)",
            SortOption::TitleAsc => "Title (A-Z)",
            SortOption::CategoryAsc => "Category (A-Z)",
        }
    }
}

impl FromStr for SortOption {
    type Err = ParseOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == value)
            .ok_or_else(|| ParseOptionError::new("sort option", value))
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown tab or sort identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseOptionError {}

/// Returns a new, ordered copy of `threats`.
///
/// The sort is stable: threats with equal keys keep their input order.
pub fn sort_threats(threats: &[Threat], option: SortOption) -> Vec<Threat> {
    let mut sorted = threats.to_vec();
    match option {
        SortOption::SeverityDesc => {
            sorted.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));
        }
        SortOption::SeverityAsc => {
            sorted.sort_by(|a, b| a.severity.weight().cmp(&b.severity.weight()));
        }
        SortOption::TitleAsc => sorted.sort_by(|a, b| compare_text(&a.title, &b.title)),
        SortOption::CategoryAsc => sorted.sort_by(|a, b| compare_text(&a.category, &b.category)),
    }
    sorted
}

// Case-insensitive, ties broken by exact comparison.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Aggregate UI runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Active view.
    pub active_tab: ViewTab,
    /// Threat catalog ordering.
    pub sort_option: SortOption,
    /// Descriptors in the input form.
    pub draft: EvaluationInputs,
    /// Whether a submission is in flight.
    pub loading: bool,
    /// Blocking notice for the user, if any.
    pub notice: Option<String>,
}

impl UiState {
    /// Creates default UI state with the given input draft.
    pub fn new(version: impl Into<String>, draft: EvaluationInputs) -> Self {
        Self {
            version: version.into(),
            active_tab: ViewTab::Overview,
            sort_option: SortOption::default(),
            draft,
            loading: false,
            notice: None,
        }
    }

    /// Switches tab. Returns `false` and stays put when the tab needs an
    /// evaluation and none is displayed.
    pub fn select_tab(&mut self, tab: ViewTab, has_evaluation: bool) -> bool {
        if tab.requires_evaluation() && !has_evaluation {
            return false;
        }
        self.active_tab = tab;
        true
    }

    /// Changes the threat catalog ordering.
    pub fn set_sort(&mut self, option: SortOption) {
        self.sort_option = option;
    }

    /// Marks a submission as in flight and clears any previous notice.
    pub fn on_submit_started(&mut self) {
        self.loading = true;
        self.notice = None;
    }

    /// Applies a successful submission.
    pub fn on_submit_succeeded(&mut self) {
        self.loading = false;
        self.active_tab = ViewTab::Overview;
    }

    /// Applies a failed submission. Tab and draft stay as they are.
    pub fn on_submit_failed(&mut self, reason: &str) {
        self.loading = false;
        self.notice = Some(format!("{ANALYSIS_FAILED_NOTICE} {reason}"));
    }

    /// Applies loading an evaluation from history: the form is re-filled
    /// with its descriptors and the dashboard is shown.
    pub fn on_history_loaded(&mut self, evaluation: &ModelEvaluation) {
        self.draft = evaluation.inputs();
        self.active_tab = ViewTab::Overview;
    }
}

/// Numbers shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Overall risk score.
    pub risk_score: f64,
    /// Risk tier for the score.
    pub risk_tier: RiskTier,
    /// Total threats.
    pub total_threats: usize,
    /// Critical threats.
    pub critical_threats: usize,
    /// Threat counts for each known severity, highest first.
    pub by_severity: Vec<(Severity, usize)>,
    /// Number of benchmark categories.
    pub benchmark_count: usize,
    /// Mean benchmark score.
    pub mean_benchmark_score: Option<f64>,
    /// Evaluation timestamp.
    pub timestamp: String,
}

impl DashboardSummary {
    /// Derives the summary for one evaluation.
    pub fn from_evaluation(evaluation: &ModelEvaluation) -> Self {
        Self {
            risk_score: evaluation.overall_risk_score,
            risk_tier: evaluation.risk_tier(),
            total_threats: evaluation.threats.len(),
            critical_threats: evaluation.critical_count(),
            by_severity: Severity::KNOWN
                .into_iter()
                .map(|severity| {
                    let count = evaluation.count_by_severity(&severity);
                    (severity, count)
                })
                .collect(),
            benchmark_count: evaluation.scores.len(),
            mean_benchmark_score: evaluation.mean_benchmark_score(),
            timestamp: evaluation.timestamp.clone(),
        }
    }
}

/// First threats in provider order, as shown in the mitigation roadmap.
pub fn mitigation_roadmap(evaluation: &ModelEvaluation) -> &[Threat] {
    let len = evaluation.threats.len().min(ROADMAP_LEN);
    &evaluation.threats[..len]
}

#[cfg(test)]
mod tests {
    //! Unit tests for UI state gates and parsing.

    use super::*;

    #[test]
    fn evaluation_tabs_require_an_evaluation() {
        let mut state = UiState::new("v0.1.0", EvaluationInputs::default());
        assert!(!state.select_tab(ViewTab::Threats, false));
        assert_eq!(state.active_tab, ViewTab::Overview);

        assert!(state.select_tab(ViewTab::History, false));
        assert!(state.select_tab(ViewTab::Benchmarks, true));
        assert_eq!(state.active_tab, ViewTab::Benchmarks);
    }

    #[test]
    fn parses_stable_identifiers() {
        for option in SortOption::ALL {
            assert_eq!(option.as_str().parse::<SortOption>(), Ok(option));
        }
        for tab in ViewTab::ALL {
            assert_eq!(tab.as_str().parse::<ViewTab>(), Ok(tab));
        }
        assert!("newest".parse::<SortOption>().is_err());
    }

    #[test]
    fn failure_sets_notice_and_keeps_tab() {
        let mut state = UiState::new("v0.1.0", EvaluationInputs::default());
        state.select_tab(ViewTab::History, false);
        state.on_submit_started();
        assert!(state.loading);

        state.on_submit_failed("network failure: timed out");
        assert!(!state.loading);
        assert_eq!(state.active_tab, ViewTab::History);
        assert_eq!(
            state.notice.as_deref(),
            Some("Failed to analyze model. network failure: timed out")
        );
    }
}
