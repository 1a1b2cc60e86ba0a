use std::path::PathBuf;
use std::time::Duration;

use crate::poll::PollPolicy;
use crate::progress::{SimulatedProgress, ANALYSIS_PHASES, GENERATION_PHASES};
use crate::results::{DocumentPreview, WorkflowResults};
use crate::view_model::{self, AppViewModel};

/// Backend correlation token for one submission's artifacts.
pub type SessionId = String;
/// Backend identifier for one asynchronous unit of work.
pub type TaskId = String;

/// The two workflows the client drives against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    Analysis,
    Generation,
}

impl WorkflowKind {
    pub fn label(self) -> &'static str {
        match self {
            WorkflowKind::Analysis => "ATS analysis",
            WorkflowKind::Generation => "cover letter generation",
        }
    }

    /// Document a finished session of this workflow produces.
    pub fn document(self) -> DocumentKind {
        match self {
            WorkflowKind::Analysis => DocumentKind::Resume,
            WorkflowKind::Generation => DocumentKind::CoverLetter,
        }
    }

    pub(crate) fn phases(self) -> &'static [&'static str] {
        match self {
            WorkflowKind::Analysis => &ANALYSIS_PHASES,
            WorkflowKind::Generation => &GENERATION_PHASES,
        }
    }
}

/// Documents the backend can preview and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume Preview",
            DocumentKind::CoverLetter => "Cover Letter Preview",
        }
    }
}

/// Export formats offered for finished documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
}

impl FileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Pdf => "pdf",
            FileFormat::Docx => "docx",
        }
    }
}

/// Where a workflow currently sits in its submit/poll/fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    /// Submission (or regeneration) request is in flight.
    Submitting,
    /// Task accepted; status checks are being scheduled.
    Polling,
    /// Task succeeded; results request is in flight.
    Fetching,
    /// Results are on screen.
    Displaying,
}

/// Backend-reported lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// One status response, fetched fresh on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub state: TaskState,
    /// Human-readable detail; carries the failure reason for failed tasks.
    pub message: Option<String>,
}

/// The task a workflow is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTask {
    task_id: TaskId,
    /// Re-polls scheduled so far, indexing the backoff schedule.
    attempt: u32,
    /// Accumulated scheduled delay, counted against the wait budget.
    waited: Duration,
}

impl ActiveTask {
    fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            attempt: 0,
            waited: Duration::ZERO,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn waited(&self) -> Duration {
        self.waited
    }
}

/// Which backend call an error came from. Drives user-facing phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Submit,
    PollStatus,
    FetchResults,
    Regenerate,
    Preview,
    Download,
}

/// Everything that can interrupt a workflow, in notice form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Submit attempted without an uploaded resume.
    MissingResume,
    /// Submit attempted with an empty job description.
    MissingJobDescription,
    /// A backend request failed before or after the task itself.
    Request { call: BackendCall, message: String },
    /// The backend reported the task as failed.
    TaskFailed { message: String },
    /// The poll wait budget ran out before the task finished.
    PollTimedOut { waited: Duration },
    /// A session-scoped action was requested with no session on hand.
    NoActiveSession,
}

/// Resume file staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validated payload for a submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub file_name: String,
    pub resume: Vec<u8>,
    pub job_description: String,
}

/// Shared upload inputs feeding both workflows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadForm {
    resume: Option<ResumeFile>,
    job_description: String,
}

impl UploadForm {
    pub fn resume(&self) -> Option<&ResumeFile> {
        self.resume.as_ref()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub(crate) fn set_resume(&mut self, file_name: String, bytes: Vec<u8>) {
        self.resume = Some(ResumeFile { file_name, bytes });
    }

    pub(crate) fn set_job_description(&mut self, text: String) {
        self.job_description = text;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Builds the submission payload, or reports the first missing input.
    pub(crate) fn submission(&self) -> Result<Submission, WorkflowError> {
        let resume = self.resume.as_ref().ok_or(WorkflowError::MissingResume)?;
        let job_description = self.job_description.trim();
        if job_description.is_empty() {
            return Err(WorkflowError::MissingJobDescription);
        }
        Ok(Submission {
            file_name: resume.file_name.clone(),
            resume: resume.bytes.clone(),
            job_description: job_description.to_owned(),
        })
    }
}

/// Controller state for one workflow, independent of the other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowMachine {
    phase: WorkflowPhase,
    session_id: Option<SessionId>,
    task: Option<ActiveTask>,
    progress: SimulatedProgress,
    results: Option<WorkflowResults>,
    preview: Option<DocumentPreview>,
    notice: Option<WorkflowError>,
    last_download: Option<PathBuf>,
}

impl WorkflowMachine {
    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn task(&self) -> Option<&ActiveTask> {
        self.task.as_ref()
    }

    pub fn results(&self) -> Option<&WorkflowResults> {
        self.results.as_ref()
    }

    pub fn preview(&self) -> Option<&DocumentPreview> {
        self.preview.as_ref()
    }

    pub fn notice(&self) -> Option<&WorkflowError> {
        self.notice.as_ref()
    }

    pub fn last_download(&self) -> Option<&PathBuf> {
        self.last_download.as_ref()
    }

    pub(crate) fn progress(&self) -> &SimulatedProgress {
        &self.progress
    }

    pub(crate) fn task_matches(&self, task_id: &str) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| task.task_id == task_id)
    }

    pub(crate) fn session_matches(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    /// Enter `Submitting`. Existing results are kept so a failed
    /// regeneration can fall back to them.
    pub(crate) fn begin_submit(&mut self) {
        self.phase = WorkflowPhase::Submitting;
        self.notice = None;
        self.preview = None;
        self.task = None;
        self.progress.reset();
    }

    /// Fresh submission accepted; start polling its task.
    pub(crate) fn accept_submission(&mut self, session_id: SessionId, task_id: TaskId) {
        self.session_id = Some(session_id);
        self.task = Some(ActiveTask::new(task_id));
        self.phase = WorkflowPhase::Polling;
    }

    /// Regeneration accepted for the existing session.
    pub(crate) fn accept_regenerated_task(&mut self, task_id: TaskId) {
        self.task = Some(ActiveTask::new(task_id));
        self.phase = WorkflowPhase::Polling;
    }

    /// Record that one more re-poll was scheduled after `delay`.
    pub(crate) fn record_poll_scheduled(&mut self, delay: Duration) {
        if let Some(task) = self.task.as_mut() {
            task.attempt = task.attempt.saturating_add(1);
            task.waited = task.waited.saturating_add(delay);
        }
    }

    /// Task succeeded; the results request is now in flight.
    pub(crate) fn begin_fetch(&mut self) {
        self.phase = WorkflowPhase::Fetching;
        self.task = None;
    }

    pub(crate) fn display(&mut self, results: WorkflowResults) {
        self.results = Some(results);
        self.notice = None;
        self.phase = WorkflowPhase::Displaying;
    }

    /// Abort the workflow: keep the notice, drop everything else.
    pub(crate) fn fail(&mut self, error: WorkflowError) {
        *self = Self {
            notice: Some(error),
            ..Self::default()
        };
    }

    /// Regeneration failed before a task started: put the previous
    /// results back on screen alongside the notice.
    pub(crate) fn restore_display(&mut self, error: WorkflowError) {
        self.phase = if self.results.is_some() {
            WorkflowPhase::Displaying
        } else {
            WorkflowPhase::Idle
        };
        self.task = None;
        self.notice = Some(error);
    }

    pub(crate) fn set_notice(&mut self, error: WorkflowError) {
        self.notice = Some(error);
    }

    pub(crate) fn set_preview(&mut self, preview: DocumentPreview) {
        self.preview = Some(preview);
    }

    pub(crate) fn dismiss_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }

    pub(crate) fn record_download(&mut self, path: PathBuf) {
        self.last_download = Some(path);
    }

    /// Re-adopt a persisted session. Results are gone; the session id is
    /// enough for previews, downloads and regeneration.
    pub(crate) fn restore_session(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
        self.phase = WorkflowPhase::Displaying;
    }

    pub(crate) fn advance_progress(&mut self, phases: &[&'static str]) -> bool {
        self.progress.advance(phases)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Whole-app state: the shared upload form plus one machine per workflow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    form: UploadForm,
    analysis: WorkflowMachine,
    generation: WorkflowMachine,
    poll_policy: PollPolicy,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_policy(poll_policy: PollPolicy) -> Self {
        Self {
            poll_policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self)
    }

    /// True once since the last render-worthy change.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn machine(&self, kind: WorkflowKind) -> &WorkflowMachine {
        match kind {
            WorkflowKind::Analysis => &self.analysis,
            WorkflowKind::Generation => &self.generation,
        }
    }

    pub fn form(&self) -> &UploadForm {
        &self.form
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    pub(crate) fn machine_mut(&mut self, kind: WorkflowKind) -> &mut WorkflowMachine {
        match kind {
            WorkflowKind::Analysis => &mut self.analysis,
            WorkflowKind::Generation => &mut self.generation,
        }
    }

    pub(crate) fn form_mut(&mut self) -> &mut UploadForm {
        &mut self.form
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
