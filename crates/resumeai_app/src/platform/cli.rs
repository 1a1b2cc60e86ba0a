use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use resumeai_core::{FileFormat, WorkflowKind};

/// Console client for the resume optimization backend.
#[derive(Debug, Parser)]
#[command(name = "resumeai", version)]
pub(crate) struct Cli {
    /// Backend base URL.
    #[arg(long, default_value = "http://localhost:5000")]
    pub backend_url: String,

    /// Directory exported documents are saved into.
    #[arg(long, default_value = "downloads")]
    pub download_dir: PathBuf,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogChoice::File)]
    pub log: LogChoice,

    /// Resume file to stage before the prompt starts.
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// File whose contents seed the job description.
    #[arg(long)]
    pub job_description: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogChoice {
    File,
    Terminal,
    Both,
}

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    LoadResume(PathBuf),
    SetJobDescription(String),
    LoadJobDescription(PathBuf),
    Analyze,
    Generate,
    Regenerate(WorkflowKind),
    Preview(WorkflowKind),
    ClosePreview,
    Download(WorkflowKind, FileFormat),
    Reset,
    Status,
    Help,
    Quit,
}

pub(crate) const HELP_TEXT: &str = "\
commands:
  resume <path>              stage a resume file (PDF or DOCX)
  jd <text>                  set the job description
  jdfile <path>              load the job description from a file
  analyze                    run the ATS analysis
  generate                   generate a cover letter
  regenerate <ats|letter>    rerun a finished workflow
  preview <ats|letter>       show the finished document
  close                      close the open preview
  download <ats|letter> <pdf|docx>
                             export the finished document
  reset                      clear both workflows and the form
  status                     reprint the current state
  help                       show this text
  quit                       exit";

/// Parses one non-empty input line. Errors carry a usage hint.
pub(crate) fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match head {
        "resume" => {
            if rest.is_empty() {
                return Err("usage: resume <path>".to_string());
            }
            Ok(ConsoleCommand::LoadResume(PathBuf::from(rest)))
        }
        "jd" => {
            if rest.is_empty() {
                return Err("usage: jd <text>".to_string());
            }
            Ok(ConsoleCommand::SetJobDescription(rest.to_string()))
        }
        "jdfile" => {
            if rest.is_empty() {
                return Err("usage: jdfile <path>".to_string());
            }
            Ok(ConsoleCommand::LoadJobDescription(PathBuf::from(rest)))
        }
        "analyze" => Ok(ConsoleCommand::Analyze),
        "generate" => Ok(ConsoleCommand::Generate),
        "regenerate" => Ok(ConsoleCommand::Regenerate(parse_kind(rest)?)),
        "preview" => Ok(ConsoleCommand::Preview(parse_kind(rest)?)),
        "close" => Ok(ConsoleCommand::ClosePreview),
        "download" => {
            let (target, format) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: download <ats|letter> <pdf|docx>".to_string())?;
            Ok(ConsoleCommand::Download(
                parse_kind(target)?,
                parse_format(format.trim())?,
            ))
        }
        "reset" => Ok(ConsoleCommand::Reset),
        "status" => Ok(ConsoleCommand::Status),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(format!("unknown command '{other}'; try 'help'")),
    }
}

fn parse_kind(word: &str) -> Result<WorkflowKind, String> {
    match word {
        "ats" | "analysis" | "resume" => Ok(WorkflowKind::Analysis),
        "letter" | "cover" | "cover-letter" => Ok(WorkflowKind::Generation),
        _ => Err("expected a workflow: ats or letter".to_string()),
    }
}

fn parse_format(word: &str) -> Result<FileFormat, String> {
    match word {
        "pdf" => Ok(FileFormat::Pdf),
        "docx" => Ok(FileFormat::Docx),
        _ => Err("expected a format: pdf or docx".to_string()),
    }
}
