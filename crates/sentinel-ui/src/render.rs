//! Text rendering of the dashboard views.
//!
//! Every function is a pure projection of its arguments; nothing here reads
//! the store or the clock.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use sentinel_core::{ModelEvaluation, ScoreTier, short_category_label};

use crate::{DashboardSummary, UiState, ViewTab, mitigation_roadmap, sort_threats};

/// Dashboard empty state.
pub const NO_EVALUATION_TEXT: &str = "No evaluation data available";

/// History empty state.
pub const NO_HISTORY_TEXT: &str = "No past evaluations found";

const BAR_WIDTH: usize = 20;

/// Renders the active tab, preceded by the notice if one is set.
pub fn render_tab(
    state: &UiState,
    current: Option<&ModelEvaluation>,
    history: &[ModelEvaluation],
) -> String {
    let body = match (state.active_tab, current) {
        (ViewTab::History, _) => render_history(history),
        (ViewTab::Overview, evaluation) => render_overview(evaluation),
        (ViewTab::Threats, Some(evaluation)) => render_threats(evaluation, state),
        (ViewTab::Benchmarks, Some(evaluation)) => render_benchmarks(evaluation),
        (ViewTab::Threats | ViewTab::Benchmarks, None) => NO_EVALUATION_TEXT.to_string(),
    };

    match &state.notice {
        Some(notice) => format!("! {notice}\n\n{body}"),
        None => body,
    }
}

/// Summary cards, benchmark overview and mitigation roadmap.
pub fn render_overview(evaluation: Option<&ModelEvaluation>) -> String {
    let Some(evaluation) = evaluation else {
        return NO_EVALUATION_TEXT.to_string();
    };
    let summary = DashboardSummary::from_evaluation(evaluation);

    let mut out = format!(
        "{} | {} | {}\n\n",
        evaluation.model_name, evaluation.architecture, evaluation.use_case
    );

    let mut cards = new_table();
    cards.set_header(vec![
        "Overall Risk Score",
        "Threats Identified",
        "Critical Vulnerabilities",
        "Evaluation Date",
    ]);
    cards.add_row(vec![
        format!(
            "{} / 100 ({})",
            summary.risk_score,
            summary.risk_tier.label()
        ),
        format!("{} vectors", summary.total_threats),
        summary.critical_threats.to_string(),
        summary.timestamp.clone(),
    ]);
    out.push_str(&cards.to_string());
    out.push('\n');

    let counts: Vec<String> = summary
        .by_severity
        .iter()
        .map(|(severity, count)| format!("{severity}: {count}"))
        .collect();
    out.push_str(&format!("\nBy severity: {}\n", counts.join(", ")));

    if let Some(mean) = summary.mean_benchmark_score {
        out.push_str(&format!(
            "Benchmarks: {} categories, mean score {mean:.1}\n",
            summary.benchmark_count
        ));
    }

    out.push_str("\nPriority Mitigation Roadmap\n");
    let roadmap = mitigation_roadmap(evaluation);
    if roadmap.is_empty() {
        out.push_str("  (no threats reported)\n");
    }
    for (index, threat) in roadmap.iter().enumerate() {
        out.push_str(&format!(
            "  {}. [{}] {}\n     {}\n",
            index + 1,
            threat.severity,
            threat.title,
            threat.mitigation
        ));
    }
    out
}

/// Threat catalog in the state's sort order.
pub fn render_threats(evaluation: &ModelEvaluation, state: &UiState) -> String {
    let threats = sort_threats(&evaluation.threats, state.sort_option);
    let mut out = format!(
        "Threat Library ({} threats, sorted by {})\n",
        threats.len(),
        state.sort_option.label()
    );

    for threat in &threats {
        out.push_str(&format!(
            "\n[{}] {} ({})\n  {}\n  Impact: {}\n  Mitigation Strategy: {}\n",
            threat.severity,
            threat.title,
            threat.category,
            threat.description,
            threat.impact,
            threat.mitigation
        ));
    }
    out
}

/// Benchmark table with a score bar per category.
pub fn render_benchmarks(evaluation: &ModelEvaluation) -> String {
    let mut table = new_table();
    table.set_header(vec!["Category", "Score", "", "Details"]);
    for score in &evaluation.scores {
        table.add_row(vec![
            short_category_label(&score.category).to_string(),
            format!("{}%", score.score),
            score_bar(score.score),
            score.details.clone(),
        ]);
    }
    table.to_string()
}

/// Past evaluations, newest first.
pub fn render_history(history: &[ModelEvaluation]) -> String {
    if history.is_empty() {
        return NO_HISTORY_TEXT.to_string();
    }

    let mut table = new_table();
    table.set_header(vec!["ID", "Model", "Risk", "Date", "Architecture"]);
    for evaluation in history {
        table.add_row(vec![
            evaluation.id.clone(),
            evaluation.model_name.clone(),
            format!("Risk: {}/100", evaluation.overall_risk_score),
            evaluation.timestamp.clone(),
            evaluation.architecture.clone(),
        ]);
    }
    table.to_string()
}

/// Fixed-width bar for a 0-100 score; out-of-range scores are clamped.
pub fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let glyph = match ScoreTier::from_score(score) {
        ScoreTier::Strong => '█',
        ScoreTier::Moderate => '▓',
        ScoreTier::Weak => '░',
    };
    let mut bar: String = std::iter::repeat_n(glyph, filled).collect();
    bar.extend(std::iter::repeat_n(' ', BAR_WIDTH - filled));
    bar
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bar_has_fixed_width() {
        assert_eq!(score_bar(0.0).chars().count(), BAR_WIDTH);
        assert_eq!(score_bar(100.0).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(score_bar(150.0).chars().count(), BAR_WIDTH);
        assert_eq!(score_bar(-5.0).trim(), "");
        assert_eq!(score_bar(50.0).chars().filter(|c| *c == '░').count(), 10);
    }

    #[test]
    fn empty_states() {
        assert_eq!(render_history(&[]), NO_HISTORY_TEXT);
        assert_eq!(render_overview(None), NO_EVALUATION_TEXT);
    }
}
