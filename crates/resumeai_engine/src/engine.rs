use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{BackendClient, ClientSettings, HttpBackendClient};
use crate::persist::DocumentWriter;
use crate::routes;
use crate::types::{
    ApiCall, ApiError, DownloadFormat, EngineEvent, PreviewPayload, SessionPayload, UploadPayload,
    Workflow,
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            download_dir: PathBuf::from("downloads"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

enum EngineCommand {
    Submit {
        workflow: Workflow,
        upload: UploadPayload,
    },
    PollStatus {
        workflow: Workflow,
        task_id: String,
        delay: Duration,
    },
    FetchResults {
        workflow: Workflow,
        session_id: String,
        delay: Duration,
    },
    Regenerate {
        workflow: Workflow,
        session_id: String,
    },
    FetchPreview {
        workflow: Workflow,
        session_id: String,
    },
    Download {
        workflow: Workflow,
        format: DownloadFormat,
        session_id: String,
    },
    Cancel {
        workflow: Workflow,
    },
}

impl EngineCommand {
    fn workflow(&self) -> Workflow {
        match self {
            EngineCommand::Submit { workflow, .. }
            | EngineCommand::PollStatus { workflow, .. }
            | EngineCommand::FetchResults { workflow, .. }
            | EngineCommand::Regenerate { workflow, .. }
            | EngineCommand::FetchPreview { workflow, .. }
            | EngineCommand::Download { workflow, .. }
            | EngineCommand::Cancel { workflow } => *workflow,
        }
    }
}

/// Handle to the background worker. Commands go in over a channel, the
/// worker thread runs them on its own tokio runtime, and completed work
/// comes back as [`EngineEvent`]s drained with [`try_recv`].
///
/// Each workflow holds one cancellation token. [`cancel`] trips the
/// token, which drops every spawned task for that workflow, including
/// ones still sleeping out a scheduled delay; later commands get a
/// fresh token.
///
/// [`try_recv`]: EngineHandle::try_recv
/// [`cancel`]: EngineHandle::cancel
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, ApiError> {
        let client = HttpBackendClient::new(
            &settings.base_url,
            ClientSettings {
                connect_timeout: settings.connect_timeout,
                request_timeout: settings.request_timeout,
                ..ClientSettings::default()
            },
        )?;
        let client: Arc<dyn BackendClient> = Arc::new(client);
        let writer = Arc::new(DocumentWriter::new(settings.download_dir));

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut guards: HashMap<Workflow, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Cancel { workflow } = command {
                    if let Some(token) = guards.remove(&workflow) {
                        token.cancel();
                    }
                    continue;
                }

                let token = guards
                    .entry(command.workflow())
                    .or_insert_with(CancellationToken::new)
                    .clone();
                let client = client.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = handle_command(client.as_ref(), &writer, command, &event_tx) => {}
                    }
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    pub fn submit(&self, workflow: Workflow, upload: UploadPayload) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Submit { workflow, upload });
    }

    pub fn poll_status(&self, workflow: Workflow, task_id: impl Into<String>, delay: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::PollStatus {
            workflow,
            task_id: task_id.into(),
            delay,
        });
    }

    pub fn fetch_results(
        &self,
        workflow: Workflow,
        session_id: impl Into<String>,
        delay: Duration,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::FetchResults {
            workflow,
            session_id: session_id.into(),
            delay,
        });
    }

    pub fn regenerate(&self, workflow: Workflow, session_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Regenerate {
            workflow,
            session_id: session_id.into(),
        });
    }

    pub fn fetch_preview(&self, workflow: Workflow, session_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPreview {
            workflow,
            session_id: session_id.into(),
        });
    }

    pub fn download(
        &self,
        workflow: Workflow,
        format: DownloadFormat,
        session_id: impl Into<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            workflow,
            format,
            session_id: session_id.into(),
        });
    }

    /// Drops scheduled and in-flight work for the workflow. The cancel
    /// is handled in command order, so events already sent by completed
    /// tasks can still be drained after this returns.
    pub fn cancel(&self, workflow: Workflow) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { workflow });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    client: &dyn BackendClient,
    writer: &DocumentWriter,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let workflow = command.workflow();
    match command {
        EngineCommand::Submit { upload, .. } => {
            let event = match client.submit(workflow, upload).await {
                Ok(accepted) => EngineEvent::SubmitAccepted {
                    workflow,
                    session_id: accepted.session_id,
                    task_id: accepted.task_id,
                },
                Err(err) => failure(workflow, ApiCall::Submit, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::PollStatus { task_id, delay, .. } => {
            pause(delay).await;
            let event = match client.task_status(&task_id).await {
                Ok(status) => EngineEvent::StatusReported {
                    workflow,
                    task_id,
                    status,
                },
                Err(err) => failure(workflow, ApiCall::Status, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::FetchResults {
            session_id, delay, ..
        } => {
            pause(delay).await;
            let event = match client.session(workflow, &session_id).await {
                Ok(payload) => EngineEvent::ResultsFetched {
                    workflow,
                    session_id,
                    payload,
                },
                Err(err) => failure(workflow, ApiCall::Results, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::Regenerate { session_id, .. } => {
            let event = match client.regenerate(workflow, &session_id).await {
                Ok(accepted) => EngineEvent::RegenerateAccepted {
                    workflow,
                    task_id: accepted.task_id,
                },
                Err(err) => failure(workflow, ApiCall::Regenerate, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::FetchPreview { session_id, .. } => {
            let event = match client.session(workflow, &session_id).await {
                Ok(payload) => EngineEvent::PreviewFetched {
                    workflow,
                    session_id,
                    preview: preview_of(payload),
                },
                Err(err) => failure(workflow, ApiCall::Preview, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::Download {
            format, session_id, ..
        } => {
            let event = match download_document(client, writer, workflow, format, &session_id).await
            {
                Ok(path) => {
                    client_info!("saved download to {}", path.display());
                    EngineEvent::DownloadSaved { workflow, path }
                }
                Err(err) => failure(workflow, ApiCall::Download, err),
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::Cancel { .. } => {}
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// The session endpoint's preview view: document text plus, for
/// resumes, the score comparison.
fn preview_of(payload: SessionPayload) -> PreviewPayload {
    match payload {
        SessionPayload::Resume(resume) => PreviewPayload {
            content: resume.content,
            score_comparison: resume.score_comparison,
        },
        SessionPayload::CoverLetter(letter) => PreviewPayload {
            content: letter.letter_text().to_string(),
            score_comparison: None,
        },
    }
}

async fn download_document(
    client: &dyn BackendClient,
    writer: &DocumentWriter,
    workflow: Workflow,
    format: DownloadFormat,
    session_id: &str,
) -> Result<std::path::PathBuf, ApiError> {
    let bytes = client.download(workflow, format, session_id).await?;
    let path = writer.write(&routes::download_file_name(workflow, format), &bytes)?;
    Ok(path)
}

fn failure(workflow: Workflow, call: ApiCall, err: ApiError) -> EngineEvent {
    client_warn!("{call:?} call failed for {workflow:?}: {err}");
    EngineEvent::CallFailed {
        workflow,
        call,
        message: err.to_string(),
    }
}
