use std::time::Duration;

use resumeai_core::{
    update, AppState, BackendCall, Effect, Msg, PollPolicy, TaskState, TaskStatus, WorkflowKind,
    WorkflowPhase,
};

fn init_logging() {
    client_logging::initialize_for_tests();
}

fn polling_state(policy: PollPolicy) -> AppState {
    let kind = WorkflowKind::Analysis;
    let state = AppState::with_poll_policy(policy);
    let (state, _) = update(
        state,
        Msg::ResumeSelected {
            file_name: "resume.pdf".to_string(),
            bytes: b"%PDF-1.4 stub".to_vec(),
        },
    );
    let (state, _) = update(
        state,
        Msg::JobDescriptionChanged("Backend engineer".to_string()),
    );
    let (state, _) = update(state, Msg::SubmitRequested { kind });
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            kind,
            session_id: "s1".to_string(),
            task_id: "t1".to_string(),
        },
    );
    state
}

fn in_progress(kind: WorkflowKind) -> Msg {
    Msg::StatusPolled {
        kind,
        task_id: "t1".to_string(),
        status: TaskStatus {
            state: TaskState::InProgress,
            message: None,
        },
    }
}

fn scheduled_delay(effects: &[Effect]) -> Duration {
    match effects {
        [Effect::SchedulePoll { delay, .. }] => *delay,
        other => panic!("expected exactly one scheduled poll, got {other:?}"),
    }
}

#[test]
fn in_progress_schedules_exactly_one_follow_up() {
    init_logging();
    let state = polling_state(PollPolicy::default());

    let (_state, effects) = update(state, in_progress(WorkflowKind::Analysis));

    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            kind: WorkflowKind::Analysis,
            task_id: "t1".to_string(),
            delay: Duration::from_secs(2),
        }]
    );
}

#[test]
fn pending_is_treated_like_in_progress() {
    init_logging();
    let state = polling_state(PollPolicy::default());

    let (_state, effects) = update(
        state,
        Msg::StatusPolled {
            kind: WorkflowKind::Analysis,
            task_id: "t1".to_string(),
            status: TaskStatus {
                state: TaskState::Pending,
                message: None,
            },
        },
    );

    assert_eq!(scheduled_delay(&effects), Duration::from_secs(2));
}

#[test]
fn poll_delays_double_up_to_the_plateau() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let mut state = polling_state(PollPolicy::default());

    let mut delays = Vec::new();
    for _ in 0..5 {
        let (next, effects) = update(state, in_progress(kind));
        delays.push(scheduled_delay(&effects).as_secs());
        state = next;
    }

    assert_eq!(delays, vec![2, 4, 8, 15, 15]);
}

#[test]
fn poll_budget_exhaustion_fails_the_workflow() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let policy = PollPolicy {
        initial_interval: Duration::from_secs(2),
        max_interval: Duration::from_secs(4),
        max_total_wait: Duration::from_secs(10),
    };
    let mut state = polling_state(policy);

    // Delays 2 + 4 + 4 stay inside the ten-second budget.
    for _ in 0..3 {
        let (next, effects) = update(state, in_progress(kind));
        assert_eq!(effects.len(), 1);
        state = next;
    }

    let (mut state, effects) = update(state, in_progress(kind));

    assert_eq!(effects, vec![Effect::StopProgressTicker { kind }]);
    let view = state.view();
    assert_eq!(view.analysis.phase, WorkflowPhase::Idle);
    assert_eq!(view.analysis.session_id, None);
    assert_eq!(
        view.analysis.notice.as_deref(),
        Some("The server did not finish within 10 seconds. Please try again.")
    );
    assert!(state.consume_dirty());
}

#[test]
fn failed_task_surfaces_the_backend_message() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let state = polling_state(PollPolicy::default());

    let (state, effects) = update(
        state,
        Msg::StatusPolled {
            kind,
            task_id: "t1".to_string(),
            status: TaskStatus {
                state: TaskState::Failed,
                message: Some("Language model unavailable".to_string()),
            },
        },
    );

    assert_eq!(effects, vec![Effect::StopProgressTicker { kind }]);
    let view = state.view();
    assert_eq!(view.analysis.phase, WorkflowPhase::Idle);
    assert_eq!(
        view.analysis.notice.as_deref(),
        Some("An error occurred: Language model unavailable")
    );
}

#[test]
fn failed_task_without_a_message_uses_the_fallback() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let state = polling_state(PollPolicy::default());

    let (state, _effects) = update(
        state,
        Msg::StatusPolled {
            kind,
            task_id: "t1".to_string(),
            status: TaskStatus {
                state: TaskState::Failed,
                message: None,
            },
        },
    );

    assert_eq!(
        state.view().analysis.notice.as_deref(),
        Some("An error occurred: Task failed")
    );
}

#[test]
fn status_for_a_different_task_is_ignored() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let state = polling_state(PollPolicy::default());

    let (mut state, effects) = update(
        state,
        Msg::StatusPolled {
            kind,
            task_id: "t0".to_string(),
            status: TaskStatus {
                state: TaskState::Succeeded,
                message: None,
            },
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().analysis.phase, WorkflowPhase::Polling);
    assert!(!state.consume_dirty());
}

#[test]
fn poll_failure_resets_the_workflow() {
    init_logging();
    let kind = WorkflowKind::Analysis;
    let state = polling_state(PollPolicy::default());

    let (state, effects) = update(
        state,
        Msg::RequestFailed {
            kind,
            call: BackendCall::PollStatus,
            message: "connection refused".to_string(),
        },
    );

    assert_eq!(effects, vec![Effect::StopProgressTicker { kind }]);
    let view = state.view();
    assert_eq!(view.analysis.phase, WorkflowPhase::Idle);
    assert_eq!(
        view.analysis.notice.as_deref(),
        Some("An error occurred: connection refused")
    );
}
