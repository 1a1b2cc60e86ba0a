use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::persist::PersistError;

/// Workflows the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    Ats,
    CoverLetter,
}

impl Workflow {
    /// Path segment naming the document this workflow produces.
    pub fn document_segment(self) -> &'static str {
        match self {
            Workflow::Ats => "resume",
            Workflow::CoverLetter => "cover_letter",
        }
    }
}

/// Export formats the download endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Pdf,
    Docx,
}

impl DownloadFormat {
    pub fn segment(self) -> &'static str {
        match self {
            DownloadFormat::Pdf => "pdf",
            DownloadFormat::Docx => "docx",
        }
    }
}

/// Resume upload accompanying a workflow submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub job_description: String,
}

/// Which backend call an error or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCall {
    Submit,
    Status,
    Results,
    Regenerate,
    Preview,
    Download,
}

/// Accepted submission: the session and its first task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub session_id: String,
    pub task_id: String,
}

/// Accepted regeneration: a new task on the existing session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegenerateResponse {
    pub task_id: String,
}

/// Task lifecycle states as the backend spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStateDto {
    Pending,
    Progress,
    Success,
    Failure,
    /// Future-proofing: unrecognized states are treated as still running.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskStatusResponse {
    pub state: TaskStateDto,
    #[serde(default)]
    pub status: Option<String>,
}

/// Per-category scores and suggestions. Every field is optional on the
/// wire; absent values default to zero or empty, as the UI treats a
/// partial analysis as a weak one rather than an error.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AtsAnalysisDto {
    #[serde(default)]
    pub keyword_match_percentage: f64,
    #[serde(default)]
    pub hard_soft_skills_balance: f64,
    #[serde(default)]
    pub formatting_readability_score: f64,
    #[serde(default)]
    pub section_completion_percentage: f64,
    #[serde(default)]
    pub proximity_score: f64,
    #[serde(default)]
    pub total_ats_score: f64,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
    #[serde(default)]
    pub searchability_suggestions: Vec<String>,
    #[serde(default)]
    pub skills_suggestions: Vec<String>,
    #[serde(default)]
    pub formatting_suggestions: Vec<String>,
    #[serde(default)]
    pub section_suggestions: Vec<String>,
    #[serde(default)]
    pub synonym_suggestions: Vec<String>,
}

/// Rewritten resume content proposed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OptimizationDto {
    #[serde(default)]
    pub improved_summary: String,
    /// Section name to rewritten bullet lines. A sorted map keeps the
    /// render order stable across fetches.
    #[serde(default)]
    pub improved_bullets: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub suggested_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ScoreComparisonDto {
    #[serde(default)]
    pub original_score: f64,
    #[serde(default)]
    pub optimized_score: f64,
}

/// Everything the resume session endpoint may return. The same route
/// serves both the full analysis payload and the lighter preview body,
/// so all fields are optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResumeSessionResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score_comparison: Option<ScoreComparisonDto>,
    #[serde(default)]
    pub original_ats_analysis: Option<AtsAnalysisDto>,
    #[serde(default)]
    pub optimized_ats_analysis: Option<AtsAnalysisDto>,
    #[serde(default)]
    pub optimization_result: Option<OptimizationDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CoverLetterDto {
    #[serde(default)]
    pub cover_letter_text: String,
}

/// Cover letter session endpoint payload, preview body included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CoverLetterSessionResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_letter: Option<CoverLetterDto>,
}

impl CoverLetterSessionResponse {
    /// The generated letter, wherever the backend put it.
    pub fn letter_text(&self) -> &str {
        match &self.cover_letter {
            Some(letter) if !letter.cover_letter_text.is_empty() => &letter.cover_letter_text,
            _ => &self.content,
        }
    }
}

/// Document text for the preview modal, plus the score comparison that
/// resume previews carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewPayload {
    pub content: String,
    pub score_comparison: Option<ScoreComparisonDto>,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
    /// Non-2xx response; `message` is the backend's own wording when it
    /// sent one, otherwise a generic status line.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("document larger than {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Events the engine reports back to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SubmitAccepted {
        workflow: Workflow,
        session_id: String,
        task_id: String,
    },
    RegenerateAccepted {
        workflow: Workflow,
        task_id: String,
    },
    StatusReported {
        workflow: Workflow,
        task_id: String,
        status: TaskStatusResponse,
    },
    ResultsFetched {
        workflow: Workflow,
        session_id: String,
        payload: SessionPayload,
    },
    PreviewFetched {
        workflow: Workflow,
        session_id: String,
        preview: PreviewPayload,
    },
    DownloadSaved {
        workflow: Workflow,
        path: PathBuf,
    },
    CallFailed {
        workflow: Workflow,
        call: ApiCall,
        message: String,
    },
}

/// Results payload in either workflow's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPayload {
    Resume(ResumeSessionResponse),
    CoverLetter(CoverLetterSessionResponse),
}
