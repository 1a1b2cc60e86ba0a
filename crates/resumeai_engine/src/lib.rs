//! ResumeAI engine: backend API client and background work execution.
mod client;
mod engine;
mod persist;
mod routes;
mod types;

pub use client::{BackendClient, ClientSettings, HttpBackendClient};
pub use engine::{EngineHandle, EngineSettings};
pub use persist::{ensure_download_dir, DocumentWriter, PersistError};
pub use types::{
    ApiCall, ApiError, AtsAnalysisDto, CoverLetterDto, CoverLetterSessionResponse, DownloadFormat,
    EngineEvent, OptimizationDto, PreviewPayload, RegenerateResponse, ResumeSessionResponse,
    ScoreComparisonDto, SessionPayload, SubmitResponse, TaskStateDto, TaskStatusResponse,
    UploadPayload, Workflow,
};
