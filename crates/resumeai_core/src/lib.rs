//! ResumeAI core: pure workflow state machine and view-model helpers.
mod effect;
mod msg;
mod poll;
mod progress;
mod results;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use poll::{PollPolicy, RESULT_FETCH_HOLD};
pub use progress::{
    ANALYSIS_PHASES, COMPLETE_PHASE_LABEL, GENERATION_PHASES, INITIAL_PHASE_LABEL,
    PROGRESS_TICK_INTERVAL, SIMULATED_PERCENT_CAP,
};
pub use results::{
    AtsAnalysis, AtsResults, CoverLetterResults, DocumentPreview, ResumeOptimization,
    ScoreComparison, WorkflowResults,
};
pub use state::{
    ActiveTask, AppState, BackendCall, DocumentKind, FileFormat, ResumeFile, SessionId,
    Submission, TaskId, TaskState, TaskStatus, UploadForm, WorkflowError, WorkflowKind,
    WorkflowMachine, WorkflowPhase,
};
pub use update::update;
pub use view_model::{
    classify_suggestion, comparison_view, issues_count, normalize_score, notice_text,
    prepare_preview_content, score_tier, AppViewModel, AtsReportView, CategoryView,
    ComparisonView, CoverLetterView, PreviewView, Priority, ReportView, ScoreTier,
    SuggestionView, WorkflowView, MAX_PREVIEW_CONTENT, NO_CATEGORY_SUGGESTIONS,
    NO_MISSING_KEYWORDS,
};
