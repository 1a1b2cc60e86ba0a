use std::time::Duration;

use crate::state::{FileFormat, Submission, WorkflowKind};

/// Side effects the update function requests from the runtime.
///
/// The state machine never performs IO itself; each variant names one
/// action for the engine or the ticker to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the upload form to start a workflow.
    Submit {
        kind: WorkflowKind,
        submission: Submission,
    },
    /// GET the task status after `delay`.
    SchedulePoll {
        kind: WorkflowKind,
        task_id: String,
        delay: Duration,
    },
    /// GET the session results after `delay`.
    FetchResults {
        kind: WorkflowKind,
        session_id: String,
        delay: Duration,
    },
    /// POST a regeneration for an existing session.
    Regenerate {
        kind: WorkflowKind,
        session_id: String,
    },
    /// GET the rendered document preview.
    FetchPreview {
        kind: WorkflowKind,
        session_id: String,
    },
    /// Download the finished document and save it locally.
    Download {
        kind: WorkflowKind,
        format: FileFormat,
        session_id: String,
    },
    /// Start the simulated-progress ticker for a workflow.
    StartProgressTicker { kind: WorkflowKind },
    /// Stop the simulated-progress ticker for a workflow.
    StopProgressTicker { kind: WorkflowKind },
    /// Abort any in-flight backend requests for a workflow.
    CancelInFlight { kind: WorkflowKind },
}
