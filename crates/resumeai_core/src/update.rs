use std::path::PathBuf;
use std::time::Duration;

use crate::poll::RESULT_FETCH_HOLD;
use crate::results::{DocumentPreview, WorkflowResults};
use crate::state::{
    BackendCall, TaskState, TaskStatus, WorkflowError, WorkflowKind, WorkflowPhase,
};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Stale continuations are dropped here. Every engine-sourced message
/// carries the task or session it belongs to, and a machine that has
/// moved on (reset, regenerated, failed) no longer matches it.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ResumeSelected { file_name, bytes } => {
            state.form_mut().set_resume(file_name, bytes);
            state.mark_dirty();
            Vec::new()
        }
        Msg::JobDescriptionChanged(text) => {
            state.form_mut().set_job_description(text);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitRequested { kind } => submit(&mut state, kind),
        Msg::RegenerateRequested { kind } => regenerate(&mut state, kind),
        Msg::ResetRequested => reset(&mut state),
        Msg::PreviewRequested { kind } => session_action(&mut state, kind, |session_id| {
            Effect::FetchPreview { kind, session_id }
        }),
        Msg::PreviewDismissed => {
            let mut changed = false;
            for kind in [WorkflowKind::Analysis, WorkflowKind::Generation] {
                changed |= state.machine_mut(kind).dismiss_preview();
            }
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DownloadRequested { kind, format } => {
            session_action(&mut state, kind, |session_id| Effect::Download {
                kind,
                format,
                session_id,
            })
        }
        Msg::ProgressTicked { kind } => progress_ticked(&mut state, kind),
        Msg::SubmitAccepted {
            kind,
            session_id,
            task_id,
        } => submit_accepted(&mut state, kind, session_id, task_id),
        Msg::RegenerateAccepted { kind, task_id } => {
            regenerate_accepted(&mut state, kind, task_id)
        }
        Msg::StatusPolled {
            kind,
            task_id,
            status,
        } => status_polled(&mut state, kind, task_id, status),
        Msg::ResultsFetched {
            kind,
            session_id,
            results,
        } => results_fetched(&mut state, kind, &session_id, results),
        Msg::PreviewFetched {
            kind,
            session_id,
            preview,
        } => preview_fetched(&mut state, kind, &session_id, preview),
        Msg::DownloadFinished { kind, path } => download_finished(&mut state, kind, path),
        Msg::RequestFailed {
            kind,
            call,
            message,
        } => request_failed(&mut state, kind, call, message),
        Msg::SessionRestored { kind, session_id } => {
            let machine = state.machine_mut(kind);
            if machine.phase() == WorkflowPhase::Idle && machine.session_id().is_none() {
                machine.restore_session(session_id);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Submission is accepted from `Idle` only; a second click while the
/// workflow runs is dropped rather than spawning a duplicate task.
fn submit(state: &mut AppState, kind: WorkflowKind) -> Vec<Effect> {
    if state.machine(kind).phase() != WorkflowPhase::Idle {
        return Vec::new();
    }
    match state.form().submission() {
        Ok(submission) => {
            state.machine_mut(kind).begin_submit();
            state.mark_dirty();
            vec![
                Effect::StartProgressTicker { kind },
                Effect::Submit { kind, submission },
            ]
        }
        Err(error) => {
            state.machine_mut(kind).set_notice(error);
            state.mark_dirty();
            Vec::new()
        }
    }
}

fn regenerate(state: &mut AppState, kind: WorkflowKind) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    match machine.phase() {
        WorkflowPhase::Displaying => match machine.session_id() {
            Some(session_id) => {
                let session_id = session_id.to_owned();
                machine.begin_submit();
                state.mark_dirty();
                vec![
                    Effect::StartProgressTicker { kind },
                    Effect::Regenerate { kind, session_id },
                ]
            }
            None => {
                machine.set_notice(WorkflowError::NoActiveSession);
                state.mark_dirty();
                Vec::new()
            }
        },
        WorkflowPhase::Idle => {
            machine.set_notice(WorkflowError::NoActiveSession);
            state.mark_dirty();
            Vec::new()
        }
        WorkflowPhase::Submitting | WorkflowPhase::Polling | WorkflowPhase::Fetching => Vec::new(),
    }
}

/// Back to the upload form. Both machines are cleared; anything still
/// running is told to stop so late responses die at the engine too.
fn reset(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    for kind in [WorkflowKind::Analysis, WorkflowKind::Generation] {
        let machine = state.machine_mut(kind);
        match machine.phase() {
            WorkflowPhase::Idle => {}
            WorkflowPhase::Submitting | WorkflowPhase::Polling => {
                effects.push(Effect::StopProgressTicker { kind });
                effects.push(Effect::CancelInFlight { kind });
            }
            WorkflowPhase::Fetching | WorkflowPhase::Displaying => {
                effects.push(Effect::CancelInFlight { kind });
            }
        }
        machine.clear();
    }
    state.form_mut().clear();
    state.mark_dirty();
    effects
}

/// Preview and download need a displayed session; everything else is a
/// user error or a race with a reset.
fn session_action(
    state: &mut AppState,
    kind: WorkflowKind,
    effect: impl FnOnce(String) -> Effect,
) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    match (machine.phase(), machine.session_id()) {
        (WorkflowPhase::Displaying, Some(session_id)) => vec![effect(session_id.to_owned())],
        (WorkflowPhase::Displaying | WorkflowPhase::Idle, None) => {
            machine.set_notice(WorkflowError::NoActiveSession);
            state.mark_dirty();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Ticks advance the simulated phases only while the workflow is live.
/// A tick that lands after the task finished changes nothing.
fn progress_ticked(state: &mut AppState, kind: WorkflowKind) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    let live = matches!(
        machine.phase(),
        WorkflowPhase::Submitting | WorkflowPhase::Polling
    );
    if live && machine.advance_progress(kind.phases()) {
        state.mark_dirty();
    }
    Vec::new()
}

fn submit_accepted(
    state: &mut AppState,
    kind: WorkflowKind,
    session_id: String,
    task_id: String,
) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Submitting || machine.session_id().is_some() {
        return Vec::new();
    }
    machine.accept_submission(session_id, task_id.clone());
    state.mark_dirty();
    // First poll goes out immediately; backoff starts after it.
    vec![Effect::SchedulePoll {
        kind,
        task_id,
        delay: Duration::ZERO,
    }]
}

fn regenerate_accepted(state: &mut AppState, kind: WorkflowKind, task_id: String) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Submitting || machine.session_id().is_none() {
        return Vec::new();
    }
    machine.accept_regenerated_task(task_id.clone());
    state.mark_dirty();
    vec![Effect::SchedulePoll {
        kind,
        task_id,
        delay: Duration::ZERO,
    }]
}

fn status_polled(
    state: &mut AppState,
    kind: WorkflowKind,
    task_id: String,
    status: TaskStatus,
) -> Vec<Effect> {
    let policy = state.poll_policy();
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Polling || !machine.task_matches(&task_id) {
        return Vec::new();
    }
    match status.state {
        TaskState::Succeeded => {
            let Some(session_id) = machine.session_id().map(ToOwned::to_owned) else {
                return Vec::new();
            };
            machine.begin_fetch();
            state.mark_dirty();
            vec![
                Effect::StopProgressTicker { kind },
                Effect::FetchResults {
                    kind,
                    session_id,
                    delay: RESULT_FETCH_HOLD,
                },
            ]
        }
        TaskState::Failed => {
            let message = status.message.unwrap_or_else(|| "Task failed".to_owned());
            machine.fail(WorkflowError::TaskFailed { message });
            state.mark_dirty();
            vec![Effect::StopProgressTicker { kind }]
        }
        TaskState::Pending | TaskState::InProgress => {
            let Some(task) = machine.task() else {
                return Vec::new();
            };
            let delay = policy.delay_for(task.attempt());
            if policy.exhausted(task.waited(), delay) {
                let waited = task.waited();
                machine.fail(WorkflowError::PollTimedOut { waited });
                state.mark_dirty();
                vec![Effect::StopProgressTicker { kind }]
            } else {
                machine.record_poll_scheduled(delay);
                // Exactly one follow-up per in-progress response.
                vec![Effect::SchedulePoll {
                    kind,
                    task_id,
                    delay,
                }]
            }
        }
    }
}

fn results_fetched(
    state: &mut AppState,
    kind: WorkflowKind,
    session_id: &str,
    results: WorkflowResults,
) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Fetching || !machine.session_matches(session_id) {
        return Vec::new();
    }
    machine.display(results);
    state.mark_dirty();
    Vec::new()
}

fn preview_fetched(
    state: &mut AppState,
    kind: WorkflowKind,
    session_id: &str,
    preview: DocumentPreview,
) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Displaying || !machine.session_matches(session_id) {
        return Vec::new();
    }
    machine.set_preview(preview);
    state.mark_dirty();
    Vec::new()
}

fn download_finished(state: &mut AppState, kind: WorkflowKind, path: PathBuf) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    if machine.phase() != WorkflowPhase::Displaying {
        return Vec::new();
    }
    machine.record_download(path);
    state.mark_dirty();
    Vec::new()
}

/// Failure routing depends on where the workflow was. A failed submit or
/// poll abandons the run; a failed regeneration restores the previous
/// results; preview and download failures only post a notice.
fn request_failed(
    state: &mut AppState,
    kind: WorkflowKind,
    call: BackendCall,
    message: String,
) -> Vec<Effect> {
    let machine = state.machine_mut(kind);
    let error = WorkflowError::Request { call, message };
    match (call, machine.phase()) {
        (BackendCall::Submit, WorkflowPhase::Submitting) => {
            machine.fail(error);
            state.mark_dirty();
            vec![Effect::StopProgressTicker { kind }]
        }
        (BackendCall::Regenerate, WorkflowPhase::Submitting) => {
            machine.restore_display(error);
            state.mark_dirty();
            vec![Effect::StopProgressTicker { kind }]
        }
        (BackendCall::PollStatus, WorkflowPhase::Polling) => {
            machine.fail(error);
            state.mark_dirty();
            vec![Effect::StopProgressTicker { kind }]
        }
        (BackendCall::FetchResults, WorkflowPhase::Fetching) => {
            machine.fail(error);
            state.mark_dirty();
            Vec::new()
        }
        (BackendCall::Preview | BackendCall::Download, WorkflowPhase::Displaying) => {
            machine.set_notice(error);
            state.mark_dirty();
            Vec::new()
        }
        _ => Vec::new(),
    }
}
