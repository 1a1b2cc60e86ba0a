//! Render-ready projection of [`AppState`], plus the scoring helpers the
//! projection is built from.
//!
//! Everything here is deterministic. The renderer consumes these structs
//! verbatim; no scoring or phrasing decisions are left to the UI layer.

use std::path::PathBuf;

use crate::progress::{COMPLETE_PHASE_LABEL, INITIAL_PHASE_LABEL};
use crate::results::{
    AtsAnalysis, AtsResults, CoverLetterResults, DocumentPreview, ScoreComparison, WorkflowResults,
};
use crate::state::{AppState, BackendCall, WorkflowError, WorkflowKind, WorkflowPhase};

/// Longest preview body rendered before truncation.
pub const MAX_PREVIEW_CONTENT: usize = 8_192;
const TRUNCATION_MARKER: &str = "\n…[truncated]";

/// Empty-state line for the missing-keywords panel.
pub const NO_MISSING_KEYWORDS: &str = "Great job! No critical keywords missing.";

/// Empty-state line for a category with no suggestions and a sub-excellent score.
pub const NO_CATEGORY_SUGGESTIONS: &str =
    "No specific suggestions were provided for this category.";

/// Severity bucket for one improvement suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Color band for the total score gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Green,
    Teal,
    Amber,
    Red,
}

/// Brings a score onto the 0-100 scale. Values at or below 1 are taken
/// as fractions and scaled up; everything else passes through.
pub fn normalize_score(value: f64) -> f64 {
    if value > 1.0 {
        value
    } else {
        value * 100.0
    }
}

/// Issue count shown next to a category score. Only an exact 100 has
/// none; each 10-point band below adds one, saturating at 6.
pub fn issues_count(score: f64) -> u8 {
    let normalized = normalize_score(score);
    if normalized == 100.0 {
        0
    } else if normalized >= 90.0 {
        1
    } else if normalized >= 80.0 {
        2
    } else if normalized >= 70.0 {
        3
    } else if normalized >= 60.0 {
        4
    } else if normalized >= 50.0 {
        5
    } else {
        6
    }
}

/// Buckets a suggestion by keyword sniffing, case-insensitive. The high
/// markers win over the low ones when both appear.
pub fn classify_suggestion(text: &str) -> Priority {
    const HIGH_MARKERS: [&str; 3] = ["critical", "important", "missing"];
    const LOW_MARKERS: [&str; 2] = ["consider", "could"];

    let lowered = text.to_lowercase();
    if HIGH_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Priority::High
    } else if LOW_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Color band for a normalized total score.
pub fn score_tier(normalized: f64) -> ScoreTier {
    if normalized >= 80.0 {
        ScoreTier::Green
    } else if normalized >= 60.0 {
        ScoreTier::Teal
    } else if normalized >= 40.0 {
        ScoreTier::Amber
    } else {
        ScoreTier::Red
    }
}

fn category_advice(normalized: f64) -> &'static str {
    if normalized >= 90.0 {
        "Excellent! Your resume performs well in this category."
    } else if normalized >= 70.0 {
        "Good job! With a few adjustments, you can improve this score."
    } else if normalized >= 50.0 {
        "This area needs attention to improve your ATS compatibility."
    } else {
        "This is a critical area that requires significant improvement."
    }
}

/// Caps preview text at [`MAX_PREVIEW_CONTENT`] bytes on a char boundary,
/// appending a marker when anything was dropped.
pub fn prepare_preview_content(content: &str) -> String {
    if content.len() <= MAX_PREVIEW_CONTENT {
        return content.to_owned();
    }
    let mut cut = MAX_PREVIEW_CONTENT;
    while cut > 0 && !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = content[..cut].to_owned();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// One suggestion with its severity bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionView {
    pub text: String,
    pub priority: Priority,
}

/// One scored category panel of the ATS report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub label: &'static str,
    pub percent: u8,
    pub issues: u8,
    pub advice: &'static str,
    pub suggestions: Vec<SuggestionView>,
    /// Set when the category has no suggestions worth listing.
    pub empty_note: Option<&'static str>,
}

/// The full ATS report, scores normalized and suggestions classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtsReportView {
    pub total_score: u8,
    pub tier: ScoreTier,
    /// "+N points after optimization", when the optimized score improved.
    pub improvement_banner: Option<String>,
    pub categories: Vec<CategoryView>,
    pub missing_keywords: Vec<String>,
    pub missing_keywords_note: Option<&'static str>,
    pub general_suggestions: Vec<String>,
    pub improved_summary: Option<String>,
    pub improved_bullets: Vec<(String, Vec<String>)>,
    pub suggested_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterView {
    pub body: String,
}

/// Original-versus-optimized scores rendered beside a resume preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonView {
    pub original: i64,
    pub optimized: i64,
    pub improvement: i64,
    /// Relative change, e.g. "+31%"; "N/A" when the original score is zero.
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub title: &'static str,
    pub content: String,
    pub comparison: Option<ComparisonView>,
}

/// Finished-workflow report in either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportView {
    Ats(AtsReportView),
    CoverLetter(CoverLetterView),
}

/// Render-ready state of one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub kind: WorkflowKind,
    pub phase: WorkflowPhase,
    /// True while a submit/poll/fetch cycle is running.
    pub busy: bool,
    pub percent: u8,
    pub phase_label: String,
    pub session_id: Option<String>,
    pub notice: Option<String>,
    pub report: Option<ReportView>,
    pub preview: Option<PreviewView>,
    pub last_download: Option<PathBuf>,
}

/// Render-ready state of the whole app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub resume_file_name: Option<String>,
    pub job_description_len: usize,
    pub analysis: WorkflowView,
    pub generation: WorkflowView,
}

pub(crate) fn build(state: &AppState) -> AppViewModel {
    AppViewModel {
        resume_file_name: state
            .form()
            .resume()
            .map(|resume| resume.file_name.clone()),
        job_description_len: state.form().job_description().chars().count(),
        analysis: workflow_view(state, WorkflowKind::Analysis),
        generation: workflow_view(state, WorkflowKind::Generation),
    }
}

fn workflow_view(state: &AppState, kind: WorkflowKind) -> WorkflowView {
    let machine = state.machine(kind);
    let phase = machine.phase();
    let busy = matches!(
        phase,
        WorkflowPhase::Submitting | WorkflowPhase::Polling | WorkflowPhase::Fetching
    );
    let (percent, phase_label) = match phase {
        WorkflowPhase::Submitting | WorkflowPhase::Polling => {
            let phases = kind.phases();
            (
                machine.progress().percent(phases),
                machine.progress().label(phases).to_owned(),
            )
        }
        WorkflowPhase::Fetching => (100, COMPLETE_PHASE_LABEL.to_owned()),
        WorkflowPhase::Idle | WorkflowPhase::Displaying => (0, INITIAL_PHASE_LABEL.to_owned()),
    };

    WorkflowView {
        kind,
        phase,
        busy,
        percent,
        phase_label,
        session_id: machine.session_id().map(ToOwned::to_owned),
        notice: machine.notice().map(|error| notice_text(kind, error)),
        report: machine.results().map(report_view),
        preview: machine.preview().map(|preview| preview_view(kind, preview)),
        last_download: machine.last_download().cloned(),
    }
}

/// User-facing phrasing for a workflow error.
pub fn notice_text(kind: WorkflowKind, error: &WorkflowError) -> String {
    match error {
        WorkflowError::MissingResume => "Please upload your resume file".to_owned(),
        WorkflowError::MissingJobDescription => "Please enter the job description".to_owned(),
        WorkflowError::Request { call, message } => match call {
            BackendCall::Submit => match kind {
                WorkflowKind::Analysis => {
                    format!("An error occurred during ATS analysis: {message}")
                }
                WorkflowKind::Generation => {
                    format!("An error occurred during cover letter generation: {message}")
                }
            },
            BackendCall::PollStatus => format!("An error occurred: {message}"),
            BackendCall::FetchResults => match kind {
                WorkflowKind::Analysis => format!("Failed to load ATS results: {message}"),
                WorkflowKind::Generation => {
                    format!("Failed to load cover letter results: {message}")
                }
            },
            BackendCall::Regenerate => format!("An error occurred during regeneration: {message}"),
            BackendCall::Preview => format!("Failed to load document preview: {message}"),
            BackendCall::Download => format!("Failed to download document: {message}"),
        },
        WorkflowError::TaskFailed { message } => format!("An error occurred: {message}"),
        WorkflowError::PollTimedOut { waited } => format!(
            "The server did not finish within {} seconds. Please try again.",
            waited.as_secs()
        ),
        WorkflowError::NoActiveSession => {
            "No active session. Run an analysis or generation first.".to_owned()
        }
    }
}

fn report_view(results: &WorkflowResults) -> ReportView {
    match results {
        WorkflowResults::Ats(ats) => ReportView::Ats(ats_report(ats)),
        WorkflowResults::CoverLetter(letter) => ReportView::CoverLetter(cover_letter_view(letter)),
    }
}

fn ats_report(results: &AtsResults) -> AtsReportView {
    let analysis = &results.analysis;
    let total = normalize_score(analysis.total_ats_score);
    let optimization = results.optimization.as_ref();

    AtsReportView {
        total_score: total.round() as u8,
        tier: score_tier(total),
        improvement_banner: improvement_banner(
            analysis.total_ats_score,
            results.optimized_total_score,
        ),
        categories: categories(analysis),
        missing_keywords: analysis.missing_keywords.clone(),
        missing_keywords_note: analysis
            .missing_keywords
            .is_empty()
            .then_some(NO_MISSING_KEYWORDS),
        general_suggestions: analysis.improvement_suggestions.clone(),
        improved_summary: optimization
            .map(|opt| opt.improved_summary.clone())
            .filter(|summary| !summary.is_empty()),
        improved_bullets: optimization
            .map(|opt| opt.improved_bullets.clone())
            .unwrap_or_default(),
        suggested_skills: optimization
            .map(|opt| opt.suggested_skills.clone())
            .unwrap_or_default(),
    }
}

fn categories(analysis: &AtsAnalysis) -> Vec<CategoryView> {
    vec![
        category(
            "Searchability",
            analysis.keyword_match_percentage,
            &analysis.searchability_suggestions,
        ),
        category(
            "Skills balance",
            analysis.hard_soft_skills_balance,
            &analysis.skills_suggestions,
        ),
        category(
            "Formatting",
            analysis.formatting_readability_score,
            &analysis.formatting_suggestions,
        ),
        category(
            "Section completion",
            analysis.section_completion_percentage,
            &analysis.section_suggestions,
        ),
        category(
            "Keyword synonyms",
            analysis.proximity_score,
            &analysis.synonym_suggestions,
        ),
    ]
}

fn category(label: &'static str, score: f64, suggestions: &[String]) -> CategoryView {
    let normalized = normalize_score(score);
    CategoryView {
        label,
        percent: normalized.round() as u8,
        issues: issues_count(score),
        advice: category_advice(normalized),
        suggestions: suggestions
            .iter()
            .map(|text| SuggestionView {
                text: text.clone(),
                priority: classify_suggestion(text),
            })
            .collect(),
        empty_note: (suggestions.is_empty() && normalized < 90.0)
            .then_some(NO_CATEGORY_SUGGESTIONS),
    }
}

fn improvement_banner(original_total: f64, optimized_total: Option<f64>) -> Option<String> {
    let optimized = normalize_score(optimized_total?);
    let improvement = (optimized - normalize_score(original_total)).round() as i64;
    (improvement > 0).then(|| format!("+{improvement} points after optimization"))
}

fn cover_letter_view(results: &CoverLetterResults) -> CoverLetterView {
    CoverLetterView {
        body: results.text.clone(),
    }
}

fn preview_view(kind: WorkflowKind, preview: &DocumentPreview) -> PreviewView {
    PreviewView {
        title: kind.document().title(),
        content: prepare_preview_content(&preview.content),
        comparison: preview.score_comparison.as_ref().map(comparison_view),
    }
}

/// Rounds both scores, then reports the absolute and relative change. The
/// relative figure falls back to "N/A" rather than dividing by zero.
pub fn comparison_view(comparison: &ScoreComparison) -> ComparisonView {
    let original = normalize_score(comparison.original_score).round() as i64;
    let optimized = normalize_score(comparison.optimized_score).round() as i64;
    let improvement = optimized - original;
    let percentage = if original == 0 {
        "N/A".to_owned()
    } else {
        let percent = (improvement as f64 / original as f64 * 100.0).round() as i64;
        if percent > 0 {
            format!("+{percent}%")
        } else {
            format!("{percent}%")
        }
    };
    ComparisonView {
        original,
        optimized,
        improvement,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractional_scores_scale_up_and_percentages_pass_through() {
        assert_eq!(normalize_score(0.62), 62.0);
        assert_eq!(normalize_score(62.0), 62.0);
        assert_eq!(normalize_score(1.0), 100.0);
        assert_eq!(normalize_score(0.0), 0.0);
    }

    #[test]
    fn issue_counts_follow_the_ten_point_ladder() {
        assert_eq!(issues_count(100.0), 0);
        assert_eq!(issues_count(95.0), 1);
        assert_eq!(issues_count(85.0), 2);
        assert_eq!(issues_count(75.0), 3);
        assert_eq!(issues_count(65.0), 4);
        assert_eq!(issues_count(55.0), 5);
        assert_eq!(issues_count(10.0), 6);
        assert_eq!(issues_count(0.95), 1);
        // Only an exact 100 is issue-free; overshooting scores are not.
        assert_eq!(issues_count(130.0), 1);
        assert_eq!(issues_count(100.5), 1);
    }

    #[test]
    fn high_markers_outrank_low_markers() {
        assert_eq!(
            classify_suggestion("missing a critical skill, consider adding it"),
            Priority::High
        );
        assert_eq!(classify_suggestion("You COULD tighten this up"), Priority::Low);
        assert_eq!(classify_suggestion("Reword the summary"), Priority::Medium);
    }

    #[test]
    fn score_tiers_band_at_80_60_40() {
        assert_eq!(score_tier(80.0), ScoreTier::Green);
        assert_eq!(score_tier(79.9), ScoreTier::Teal);
        assert_eq!(score_tier(60.0), ScoreTier::Teal);
        assert_eq!(score_tier(59.9), ScoreTier::Amber);
        assert_eq!(score_tier(40.0), ScoreTier::Amber);
        assert_eq!(score_tier(39.9), ScoreTier::Red);
    }

    #[test]
    fn comparison_avoids_dividing_by_zero() {
        let view = comparison_view(&ScoreComparison {
            original_score: 0.0,
            optimized_score: 40.0,
        });
        assert_eq!(view.original, 0);
        assert_eq!(view.optimized, 40);
        assert_eq!(view.improvement, 40);
        assert_eq!(view.percentage, "N/A");
    }

    #[test]
    fn comparison_reports_signed_relative_change() {
        let gained = comparison_view(&ScoreComparison {
            original_score: 62.0,
            optimized_score: 81.0,
        });
        assert_eq!(gained.improvement, 19);
        assert_eq!(gained.percentage, "+31%");

        let lost = comparison_view(&ScoreComparison {
            original_score: 80.0,
            optimized_score: 76.0,
        });
        assert_eq!(lost.improvement, -4);
        assert_eq!(lost.percentage, "-5%");
    }

    #[test]
    fn long_previews_are_cut_on_a_char_boundary() {
        let content = "é".repeat(MAX_PREVIEW_CONTENT);
        let prepared = prepare_preview_content(&content);
        assert!(prepared.len() < content.len() + TRUNCATION_MARKER.len());
        assert!(prepared.ends_with(TRUNCATION_MARKER));

        let short = "fits as-is";
        assert_eq!(prepare_preview_content(short), short);
    }
}
