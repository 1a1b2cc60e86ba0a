use std::path::PathBuf;

use crate::results::{DocumentPreview, WorkflowResults};
use crate::state::{BackendCall, FileFormat, TaskStatus, WorkflowKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a resume file to upload.
    ResumeSelected { file_name: String, bytes: Vec<u8> },
    /// User edited the job description text.
    JobDescriptionChanged(String),
    /// User asked to start a workflow.
    SubmitRequested { kind: WorkflowKind },
    /// User asked to rerun a finished workflow on its existing session.
    RegenerateRequested { kind: WorkflowKind },
    /// User asked to return to the upload form.
    ResetRequested,
    /// User opened the document preview for a finished workflow.
    PreviewRequested { kind: WorkflowKind },
    /// User closed the document preview.
    PreviewDismissed,
    /// User asked to export the finished document.
    DownloadRequested { kind: WorkflowKind, format: FileFormat },
    /// Simulated-progress ticker fired for a workflow.
    ProgressTicked { kind: WorkflowKind },
    /// Engine: submission accepted, task queued.
    SubmitAccepted {
        kind: WorkflowKind,
        session_id: String,
        task_id: String,
    },
    /// Engine: regeneration accepted on the existing session.
    RegenerateAccepted { kind: WorkflowKind, task_id: String },
    /// Engine: one task-status response arrived.
    StatusPolled {
        kind: WorkflowKind,
        task_id: String,
        status: TaskStatus,
    },
    /// Engine: results payload arrived for a succeeded task.
    ResultsFetched {
        kind: WorkflowKind,
        session_id: String,
        results: WorkflowResults,
    },
    /// Engine: preview payload arrived.
    PreviewFetched {
        kind: WorkflowKind,
        session_id: String,
        preview: DocumentPreview,
    },
    /// Engine: document saved to disk.
    DownloadFinished { kind: WorkflowKind, path: PathBuf },
    /// Engine: a backend request failed.
    RequestFailed {
        kind: WorkflowKind,
        call: BackendCall,
        message: String,
    },
    /// Persistence: a prior session id was found on startup.
    SessionRestored { kind: WorkflowKind, session_id: String },
    /// Fallback for placeholder wiring.
    NoOp,
}
