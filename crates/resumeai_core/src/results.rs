//! Backend results payloads. Immutable once fetched, held only to render.

/// Scores and suggestion lists from one ATS analysis pass.
///
/// Numeric scores may arrive as 0-1 fractions or 0-100 percentages; the
/// view model normalizes them before display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtsAnalysis {
    pub keyword_match_percentage: f64,
    pub hard_soft_skills_balance: f64,
    pub formatting_readability_score: f64,
    pub section_completion_percentage: f64,
    pub proximity_score: f64,
    pub total_ats_score: f64,
    pub missing_keywords: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub searchability_suggestions: Vec<String>,
    pub skills_suggestions: Vec<String>,
    pub formatting_suggestions: Vec<String>,
    pub section_suggestions: Vec<String>,
    pub synonym_suggestions: Vec<String>,
}

/// Server-proposed resume rewrites accompanying an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResumeOptimization {
    pub improved_summary: String,
    /// Section name paired with its rewritten bullet lines, in render order.
    pub improved_bullets: Vec<(String, Vec<String>)>,
    pub suggested_skills: Vec<String>,
}

/// Full payload for a finished ATS analysis session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtsResults {
    pub analysis: AtsAnalysis,
    /// Total score of the optimized resume, when the backend re-scored it.
    pub optimized_total_score: Option<f64>,
    pub optimization: Option<ResumeOptimization>,
}

/// Payload for a finished cover-letter session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterResults {
    pub text: String,
}

/// What a workflow displays once its task completes.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResults {
    Ats(AtsResults),
    CoverLetter(CoverLetterResults),
}

/// Original-versus-optimized total scores attached to resume previews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComparison {
    pub original_score: f64,
    pub optimized_score: f64,
}

/// Rendered document text fetched for the preview modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPreview {
    pub content: String,
    pub score_comparison: Option<ScoreComparison>,
}
