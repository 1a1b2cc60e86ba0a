use std::fs;
use std::path::Path;

use chrono::Utc;
use client_logging::{client_error, client_info, client_warn};
use resumeai_engine::{ensure_download_dir, DocumentWriter};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".resumeai_state.ron";

/// Session ids carried across runs. Results are not persisted; a
/// restored session supports preview, download and regeneration only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SessionSnapshot {
    pub analysis: Option<String>,
    pub generation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSessions {
    saved_at: String,
    analysis: Option<String>,
    generation: Option<String>,
}

pub(crate) fn load_sessions(state_dir: &Path) -> SessionSnapshot {
    let path = state_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return SessionSnapshot::default();
        }
        Err(err) => {
            client_warn!("Failed to read persisted sessions from {:?}: {}", path, err);
            return SessionSnapshot::default();
        }
    };

    let persisted: PersistedSessions = match ron::from_str(&content) {
        Ok(persisted) => persisted,
        Err(err) => {
            client_warn!("Failed to parse persisted sessions from {:?}: {}", path, err);
            return SessionSnapshot::default();
        }
    };

    client_info!(
        "Loaded persisted sessions from {:?} (saved at {})",
        path,
        persisted.saved_at
    );
    SessionSnapshot {
        analysis: persisted.analysis,
        generation: persisted.generation,
    }
}

pub(crate) fn save_sessions(state_dir: &Path, snapshot: &SessionSnapshot) {
    if let Err(err) = ensure_download_dir(state_dir) {
        client_error!("Failed to ensure state dir {:?}: {}", state_dir, err);
        return;
    }

    let persisted = PersistedSessions {
        saved_at: Utc::now().to_rfc3339(),
        analysis: snapshot.analysis.clone(),
        generation: snapshot.generation.clone(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&persisted, pretty) {
        Ok(text) => text,
        Err(err) => {
            client_error!("Failed to serialize persisted sessions: {}", err);
            return;
        }
    };

    let writer = DocumentWriter::new(state_dir.to_path_buf());
    if let Err(err) = writer.write(STATE_FILENAME, content.as_bytes()) {
        client_error!(
            "Failed to write persisted sessions to {:?}: {}",
            state_dir,
            err
        );
    }
}
