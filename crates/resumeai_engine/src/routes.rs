//! Relative API paths, joined onto the configured backend base URL.

use crate::types::{DownloadFormat, Workflow};

pub(crate) fn submit(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Ats => "analyze-ats",
        Workflow::CoverLetter => "generate-cover-letter",
    }
}

pub(crate) fn task_status(task_id: &str) -> String {
    format!("task-status/{task_id}")
}

/// Session content endpoint. The backend serves both the full results
/// payload and the preview body from this one route.
pub(crate) fn session(workflow: Workflow, session_id: &str) -> String {
    format!("preview/{}/{session_id}", workflow.document_segment())
}

pub(crate) fn regenerate(workflow: Workflow, session_id: &str) -> String {
    match workflow {
        Workflow::Ats => format!("regenerate-ats/{session_id}"),
        Workflow::CoverLetter => format!("regenerate-cover-letter/{session_id}"),
    }
}

pub(crate) fn download(workflow: Workflow, format: DownloadFormat, session_id: &str) -> String {
    format!(
        "download/{}/{}/{session_id}",
        format.segment(),
        workflow.document_segment()
    )
}

/// File name the exported document is saved under.
pub(crate) fn download_file_name(workflow: Workflow, format: DownloadFormat) -> String {
    let stem = match workflow {
        Workflow::Ats => "optimized_resume",
        Workflow::CoverLetter => "cover_letter",
    };
    format!("{stem}.{}", format.segment())
}
