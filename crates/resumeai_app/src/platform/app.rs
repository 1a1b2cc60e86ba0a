use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use client_logging::client_warn;
use resumeai_core::{update, AppState, Msg, WorkflowKind};
use resumeai_engine::{ensure_download_dir, EngineSettings};

use super::cli::{parse_command, Cli, ConsoleCommand, LogChoice, HELP_TEXT};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::persistence::{self, SessionSnapshot};
use super::ui;

/// Everything the main loop consumes: core messages from the engine and
/// the ticker, plus parsed console input.
#[derive(Debug)]
pub(crate) enum AppMsg {
    Core(Msg),
    Command(ConsoleCommand),
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(match cli.log {
        LogChoice::File => LogDestination::File,
        LogChoice::Terminal => LogDestination::Terminal,
        LogChoice::Both => LogDestination::Both,
    });

    if let Err(err) = ensure_download_dir(&cli.download_dir) {
        client_warn!("download directory check failed: {err}");
        println!("warning: {err}");
    }

    let (msg_tx, msg_rx) = mpsc::channel::<AppMsg>();
    let runner = EffectRunner::new(
        EngineSettings {
            base_url: cli.backend_url.clone(),
            download_dir: cli.download_dir.clone(),
            ..EngineSettings::default()
        },
        msg_tx.clone(),
    )?;

    let mut app = ConsoleApp::new(runner, cli.download_dir.clone());
    app.restore_sessions();
    if let Some(path) = &cli.resume {
        app.load_resume(path);
    }
    if let Some(path) = &cli.job_description {
        app.load_job_description(path);
    }

    println!(
        "resumeai console connected to {}. type 'help' for commands.",
        cli.backend_url
    );
    spawn_input_reader(msg_tx);

    while let Ok(msg) = msg_rx.recv() {
        match msg {
            AppMsg::Core(msg) => app.dispatch(msg),
            AppMsg::Command(command) => {
                if !app.handle_command(command) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Reads console lines off the main thread. Parse errors are answered
/// immediately; EOF turns into a quit so piped input terminates cleanly.
fn spawn_input_reader(tx: mpsc::Sender<AppMsg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(command) => {
                    if tx.send(AppMsg::Command(command)).is_err() {
                        break;
                    }
                }
                Err(hint) => println!("{hint}"),
            }
        }
        let _ = tx.send(AppMsg::Command(ConsoleCommand::Quit));
    });
}

struct ConsoleApp {
    state: AppState,
    runner: EffectRunner,
    renderer: ui::render::Renderer,
    saved: SessionSnapshot,
    /// Session ids are persisted next to the downloads.
    state_dir: PathBuf,
}

impl ConsoleApp {
    fn new(runner: EffectRunner, state_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: ui::render::Renderer::new(),
            saved: SessionSnapshot::default(),
            state_dir,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            for line in self.renderer.render(&self.state.view()) {
                println!("{line}");
            }
        }
        self.sync_sessions();
    }

    /// Runs one console command. Returns false when the app should exit.
    fn handle_command(&mut self, command: ConsoleCommand) -> bool {
        match command {
            ConsoleCommand::LoadResume(path) => self.load_resume(&path),
            ConsoleCommand::SetJobDescription(text) => {
                println!("job description set ({} characters)", text.chars().count());
                self.dispatch(Msg::JobDescriptionChanged(text));
            }
            ConsoleCommand::LoadJobDescription(path) => self.load_job_description(&path),
            ConsoleCommand::Analyze => self.dispatch(Msg::SubmitRequested {
                kind: WorkflowKind::Analysis,
            }),
            ConsoleCommand::Generate => self.dispatch(Msg::SubmitRequested {
                kind: WorkflowKind::Generation,
            }),
            ConsoleCommand::Regenerate(kind) => self.dispatch(Msg::RegenerateRequested { kind }),
            ConsoleCommand::Preview(kind) => self.dispatch(Msg::PreviewRequested { kind }),
            ConsoleCommand::ClosePreview => self.dispatch(Msg::PreviewDismissed),
            ConsoleCommand::Download(kind, format) => {
                self.dispatch(Msg::DownloadRequested { kind, format })
            }
            ConsoleCommand::Reset => self.dispatch(Msg::ResetRequested),
            ConsoleCommand::Status => {
                for line in ui::render::summary(&self.state.view()) {
                    println!("{line}");
                }
            }
            ConsoleCommand::Help => println!("{HELP_TEXT}"),
            ConsoleCommand::Quit => return false,
        }
        true
    }

    /// Re-adopts session ids from the previous run, enough for preview,
    /// download and regeneration without resubmitting.
    fn restore_sessions(&mut self) {
        let restored = persistence::load_sessions(&self.state_dir);
        self.saved = restored.clone();
        let sessions = [
            (WorkflowKind::Analysis, restored.analysis),
            (WorkflowKind::Generation, restored.generation),
        ];
        for (kind, session_id) in sessions {
            let Some(session_id) = session_id else {
                continue;
            };
            println!("restored {} session {session_id}", kind.label());
            self.dispatch(Msg::SessionRestored { kind, session_id });
        }
    }

    fn load_resume(&mut self, path: &Path) {
        match fs::read(path) {
            Ok(bytes) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                println!("staged {file_name} ({} bytes)", bytes.len());
                self.dispatch(Msg::ResumeSelected { file_name, bytes });
            }
            Err(err) => println!("could not read {}: {err}", path.display()),
        }
    }

    fn load_job_description(&mut self, path: &Path) {
        match fs::read_to_string(path) {
            Ok(text) => {
                println!("job description loaded ({} characters)", text.chars().count());
                self.dispatch(Msg::JobDescriptionChanged(text));
            }
            Err(err) => println!("could not read {}: {err}", path.display()),
        }
    }

    /// Persists session ids whenever they change, so the next run can
    /// pick them back up.
    fn sync_sessions(&mut self) {
        let snapshot = SessionSnapshot {
            analysis: self
                .state
                .machine(WorkflowKind::Analysis)
                .session_id()
                .map(ToOwned::to_owned),
            generation: self
                .state
                .machine(WorkflowKind::Generation)
                .session_id()
                .map(ToOwned::to_owned),
        };
        if snapshot != self.saved {
            persistence::save_sessions(&self.state_dir, &snapshot);
            self.saved = snapshot;
        }
    }
}
