use std::path::PathBuf;
use std::time::Duration;

use resumeai_engine::{
    ApiCall, DownloadFormat, EngineEvent, EngineHandle, EngineSettings, TaskStateDto,
    UploadPayload, Workflow,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer, download_dir: PathBuf) -> EngineHandle {
    EngineHandle::new(EngineSettings {
        base_url: server.uri(),
        download_dir,
        ..EngineSettings::default()
    })
    .expect("engine")
}

fn sample_upload() -> UploadPayload {
    UploadPayload {
        file_name: "resume.pdf".to_string(),
        bytes: b"%PDF-1.4 fake resume".to_vec(),
        job_description: "Senior Rust engineer".to_string(),
    }
}

async fn next_event(engine: &EngineHandle) -> EngineEvent {
    for _ in 0..200 {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no engine event within two seconds");
}

#[tokio::test]
async fn submission_and_status_commands_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze-ats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": "s-1",
            "task_id": "t-1",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/task-status/t-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "SUCCESS"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(&server, dir.path().to_path_buf());

    engine.submit(Workflow::Ats, sample_upload());
    match next_event(&engine).await {
        EngineEvent::SubmitAccepted {
            workflow,
            session_id,
            task_id,
        } => {
            assert_eq!(workflow, Workflow::Ats);
            assert_eq!(session_id, "s-1");
            assert_eq!(task_id, "t-1");
        }
        other => panic!("expected acceptance, got {other:?}"),
    }

    engine.poll_status(Workflow::Ats, "t-1", Duration::ZERO);
    match next_event(&engine).await {
        EngineEvent::StatusReported {
            task_id, status, ..
        } => {
            assert_eq!(task_id, "t-1");
            assert_eq!(status.state, TaskStateDto::Success);
        }
        other => panic!("expected status report, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_drops_scheduled_work_for_one_workflow_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task-status/t-ats"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "PENDING"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/task-status/t-letter"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"state": "PENDING"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(&server, dir.path().to_path_buf());

    // Both polls are still sleeping out their delay when the cancel lands.
    engine.poll_status(Workflow::Ats, "t-ats", Duration::from_millis(300));
    engine.poll_status(Workflow::CoverLetter, "t-letter", Duration::from_millis(300));
    engine.cancel(Workflow::Ats);

    match next_event(&engine).await {
        EngineEvent::StatusReported {
            workflow, task_id, ..
        } => {
            assert_eq!(workflow, Workflow::CoverLetter);
            assert_eq!(task_id, "t-letter");
        }
        other => panic!("expected the cover letter status, got {other:?}"),
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(engine.try_recv().is_none(), "cancelled poll still reported");

    // A fresh command after the cancel runs under a new guard.
    engine.poll_status(Workflow::Ats, "t-ats", Duration::ZERO);
    match next_event(&engine).await {
        EngineEvent::StatusReported { workflow, .. } => assert_eq!(workflow, Workflow::Ats),
        other => panic!("expected the fresh status, got {other:?}"),
    }
}

#[tokio::test]
async fn downloads_are_saved_under_the_download_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/pdf/resume/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 exported".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(&server, dir.path().to_path_buf());

    engine.download(Workflow::Ats, DownloadFormat::Pdf, "s-1");
    let path = match next_event(&engine).await {
        EngineEvent::DownloadSaved { workflow, path } => {
            assert_eq!(workflow, Workflow::Ats);
            path
        }
        other => panic!("expected a saved download, got {other:?}"),
    };

    assert_eq!(path, dir.path().join("optimized_resume.pdf"));
    let stored = std::fs::read(&path).expect("read saved file");
    assert_eq!(stored, b"%PDF-1.4 exported");
}

#[tokio::test]
async fn failed_calls_report_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-cover-letter"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Invalid file type. Please upload a PDF or DOCX file.",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_for(&server, dir.path().to_path_buf());

    engine.submit(Workflow::CoverLetter, sample_upload());
    match next_event(&engine).await {
        EngineEvent::CallFailed {
            workflow,
            call,
            message,
        } => {
            assert_eq!(workflow, Workflow::CoverLetter);
            assert_eq!(call, ApiCall::Submit);
            assert_eq!(message, "Invalid file type. Please upload a PDF or DOCX file.");
        }
        other => panic!("expected a failure report, got {other:?}"),
    }
}
