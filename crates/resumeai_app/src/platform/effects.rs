use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::client_info;
use resumeai_core::{
    AtsAnalysis, AtsResults, BackendCall, CoverLetterResults, DocumentPreview, Effect, FileFormat,
    Msg, ResumeOptimization, ScoreComparison, TaskState, TaskStatus, WorkflowKind, WorkflowResults,
};
use resumeai_engine::{
    ApiCall, AtsAnalysisDto, DownloadFormat, EngineEvent, EngineHandle, EngineSettings,
    OptimizationDto, PreviewPayload, ScoreComparisonDto, SessionPayload, TaskStateDto,
    TaskStatusResponse, UploadPayload, Workflow,
};

use super::app::AppMsg;
use super::ticker::ProgressTicker;

/// Carries out the effects the state machine requests: backend calls go
/// to the engine, ticker effects to the progress ticker, and engine
/// events come back as messages on the app channel.
pub(crate) struct EffectRunner {
    engine: Arc<EngineHandle>,
    ticker: ProgressTicker,
}

impl EffectRunner {
    pub(crate) fn new(
        settings: EngineSettings,
        msg_tx: mpsc::Sender<AppMsg>,
    ) -> anyhow::Result<Self> {
        let engine = Arc::new(EngineHandle::new(settings)?);
        spawn_event_pump(engine.clone(), msg_tx.clone());
        Ok(Self {
            engine,
            ticker: ProgressTicker::new(msg_tx),
        })
    }

    pub(crate) fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit { kind, submission } => {
                    client_info!(
                        "submit {} file={} jd_len={}",
                        kind.label(),
                        submission.file_name,
                        submission.job_description.len()
                    );
                    self.engine.submit(
                        workflow_of(kind),
                        UploadPayload {
                            file_name: submission.file_name,
                            bytes: submission.resume,
                            job_description: submission.job_description,
                        },
                    );
                }
                Effect::SchedulePoll {
                    kind,
                    task_id,
                    delay,
                } => {
                    self.engine.poll_status(workflow_of(kind), task_id, delay);
                }
                Effect::FetchResults {
                    kind,
                    session_id,
                    delay,
                } => {
                    self.engine
                        .fetch_results(workflow_of(kind), session_id, delay);
                }
                Effect::Regenerate { kind, session_id } => {
                    client_info!("regenerate {} session={session_id}", kind.label());
                    self.engine.regenerate(workflow_of(kind), session_id);
                }
                Effect::FetchPreview { kind, session_id } => {
                    self.engine.fetch_preview(workflow_of(kind), session_id);
                }
                Effect::Download {
                    kind,
                    format,
                    session_id,
                } => {
                    self.engine
                        .download(workflow_of(kind), format_of(format), session_id);
                }
                Effect::StartProgressTicker { kind } => self.ticker.start(kind),
                Effect::StopProgressTicker { kind } => self.ticker.stop(kind),
                Effect::CancelInFlight { kind } => self.engine.cancel(workflow_of(kind)),
            }
        }
    }
}

fn spawn_event_pump(engine: Arc<EngineHandle>, msg_tx: mpsc::Sender<AppMsg>) {
    thread::spawn(move || loop {
        if let Some(event) = engine.try_recv() {
            if msg_tx.send(AppMsg::Core(msg_of(event))).is_err() {
                break;
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn workflow_of(kind: WorkflowKind) -> Workflow {
    match kind {
        WorkflowKind::Analysis => Workflow::Ats,
        WorkflowKind::Generation => Workflow::CoverLetter,
    }
}

fn kind_of(workflow: Workflow) -> WorkflowKind {
    match workflow {
        Workflow::Ats => WorkflowKind::Analysis,
        Workflow::CoverLetter => WorkflowKind::Generation,
    }
}

fn format_of(format: FileFormat) -> DownloadFormat {
    match format {
        FileFormat::Pdf => DownloadFormat::Pdf,
        FileFormat::Docx => DownloadFormat::Docx,
    }
}

fn call_of(call: ApiCall) -> BackendCall {
    match call {
        ApiCall::Submit => BackendCall::Submit,
        ApiCall::Status => BackendCall::PollStatus,
        ApiCall::Results => BackendCall::FetchResults,
        ApiCall::Regenerate => BackendCall::Regenerate,
        ApiCall::Preview => BackendCall::Preview,
        ApiCall::Download => BackendCall::Download,
    }
}

fn msg_of(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitAccepted {
            workflow,
            session_id,
            task_id,
        } => Msg::SubmitAccepted {
            kind: kind_of(workflow),
            session_id,
            task_id,
        },
        EngineEvent::RegenerateAccepted { workflow, task_id } => Msg::RegenerateAccepted {
            kind: kind_of(workflow),
            task_id,
        },
        EngineEvent::StatusReported {
            workflow,
            task_id,
            status,
        } => Msg::StatusPolled {
            kind: kind_of(workflow),
            task_id,
            status: status_of(status),
        },
        EngineEvent::ResultsFetched {
            workflow,
            session_id,
            payload,
        } => Msg::ResultsFetched {
            kind: kind_of(workflow),
            session_id,
            results: results_of(payload),
        },
        EngineEvent::PreviewFetched {
            workflow,
            session_id,
            preview,
        } => Msg::PreviewFetched {
            kind: kind_of(workflow),
            session_id,
            preview: preview_of(preview),
        },
        EngineEvent::DownloadSaved { workflow, path } => Msg::DownloadFinished {
            kind: kind_of(workflow),
            path,
        },
        EngineEvent::CallFailed {
            workflow,
            call,
            message,
        } => Msg::RequestFailed {
            kind: kind_of(workflow),
            call: call_of(call),
            message,
        },
    }
}

fn status_of(status: TaskStatusResponse) -> TaskStatus {
    let state = match status.state {
        TaskStateDto::Pending => TaskState::Pending,
        TaskStateDto::Progress | TaskStateDto::Unknown => TaskState::InProgress,
        TaskStateDto::Success => TaskState::Succeeded,
        TaskStateDto::Failure => TaskState::Failed,
    };
    TaskStatus {
        state,
        message: status.status,
    }
}

fn results_of(payload: SessionPayload) -> WorkflowResults {
    match payload {
        SessionPayload::Resume(resume) => {
            let optimized_total_score = resume
                .optimized_ats_analysis
                .as_ref()
                .map(|analysis| analysis.total_ats_score)
                .or_else(|| {
                    resume
                        .score_comparison
                        .map(|comparison| comparison.optimized_score)
                });
            WorkflowResults::Ats(AtsResults {
                analysis: resume
                    .original_ats_analysis
                    .map(analysis_of)
                    .unwrap_or_default(),
                optimized_total_score,
                optimization: resume.optimization_result.map(optimization_of),
            })
        }
        SessionPayload::CoverLetter(letter) => WorkflowResults::CoverLetter(CoverLetterResults {
            text: letter.letter_text().to_string(),
        }),
    }
}

fn analysis_of(dto: AtsAnalysisDto) -> AtsAnalysis {
    AtsAnalysis {
        keyword_match_percentage: dto.keyword_match_percentage,
        hard_soft_skills_balance: dto.hard_soft_skills_balance,
        formatting_readability_score: dto.formatting_readability_score,
        section_completion_percentage: dto.section_completion_percentage,
        proximity_score: dto.proximity_score,
        total_ats_score: dto.total_ats_score,
        missing_keywords: dto.missing_keywords,
        improvement_suggestions: dto.improvement_suggestions,
        searchability_suggestions: dto.searchability_suggestions,
        skills_suggestions: dto.skills_suggestions,
        formatting_suggestions: dto.formatting_suggestions,
        section_suggestions: dto.section_suggestions,
        synonym_suggestions: dto.synonym_suggestions,
    }
}

fn optimization_of(dto: OptimizationDto) -> ResumeOptimization {
    ResumeOptimization {
        improved_summary: dto.improved_summary,
        improved_bullets: dto.improved_bullets.into_iter().collect(),
        suggested_skills: dto.suggested_skills,
    }
}

fn preview_of(preview: PreviewPayload) -> DocumentPreview {
    DocumentPreview {
        content: preview.content,
        score_comparison: preview.score_comparison.map(comparison_of),
    }
}

fn comparison_of(comparison: ScoreComparisonDto) -> ScoreComparison {
    ScoreComparison {
        original_score: comparison.original_score,
        optimized_score: comparison.optimized_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_payloads_map_onto_ats_results() {
        let payload = SessionPayload::Resume(resumeai_engine::ResumeSessionResponse {
            content: String::new(),
            score_comparison: Some(ScoreComparisonDto {
                original_score: 62.0,
                optimized_score: 81.0,
            }),
            original_ats_analysis: Some(AtsAnalysisDto {
                total_ats_score: 62.0,
                missing_keywords: vec!["Kubernetes".to_string()],
                ..AtsAnalysisDto::default()
            }),
            optimized_ats_analysis: None,
            optimization_result: Some(OptimizationDto {
                improved_summary: "Stronger summary.".to_string(),
                improved_bullets: [("Experience".to_string(), vec!["Did a thing".to_string()])]
                    .into_iter()
                    .collect(),
                suggested_skills: vec!["gRPC".to_string()],
            }),
        });

        let results = match results_of(payload) {
            WorkflowResults::Ats(results) => results,
            other => panic!("expected ATS results, got {other:?}"),
        };
        assert_eq!(results.analysis.total_ats_score, 62.0);
        assert_eq!(results.analysis.missing_keywords, vec!["Kubernetes"]);
        // With no re-scored analysis, the comparison supplies the total.
        assert_eq!(results.optimized_total_score, Some(81.0));
        let optimization = results.optimization.expect("optimization");
        assert_eq!(
            optimization.improved_bullets,
            vec![("Experience".to_string(), vec!["Did a thing".to_string()])]
        );
    }

    #[test]
    fn unknown_task_states_count_as_still_running() {
        let status = status_of(TaskStatusResponse {
            state: TaskStateDto::Unknown,
            status: None,
        });
        assert_eq!(status.state, TaskState::InProgress);
    }

    #[test]
    fn engine_failures_map_onto_request_failed() {
        let msg = msg_of(EngineEvent::CallFailed {
            workflow: Workflow::CoverLetter,
            call: ApiCall::Preview,
            message: "boom".to_string(),
        });
        assert_eq!(
            msg,
            Msg::RequestFailed {
                kind: WorkflowKind::Generation,
                call: BackendCall::Preview,
                message: "boom".to_string(),
            }
        );
    }
}
