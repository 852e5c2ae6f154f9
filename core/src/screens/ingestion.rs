//! File selection, decoding and the indexing request.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use super::{Screen, Settled};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::events::EventSink;
use crate::shell::Route;

pub const ACCEPTED_EXTENSION: &str = ".txt";

const NARROWED_NOTICE: &str = "Only .txt files are allowed.";
const DECODE_FAILED_NOTICE: &str = "Failed to read files.";
const NOTHING_TO_INDEX_NOTICE: &str = "Please select some .txt files first.";
const INDEXED_NOTICE: &str = "Indexing completed successfully.";
const INDEX_FAILED_NOTICE: &str = "Indexing failed. Check logs for details.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn is_accepted(&self) -> bool {
        self.name.ends_with(ACCEPTED_EXTENSION)
    }
}

/// Turns user-supplied paths into a raw selection.
///
/// Directories expand to every file below them, sorted by path; anything else
/// passes through untouched so the extension filter can reject it visibly.
pub fn expand_selection<P: AsRef<Path>>(paths: &[P]) -> Vec<CandidateFile> {
    let mut selection = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    selection.push(CandidateFile::from_path(entry.path()));
                }
            }
        } else {
            selection.push(CandidateFile::from_path(path));
        }
    }
    selection
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionPhase {
    Idle,
    FilesSelected,
    Decoding,
    Decoded,
    Submitting,
    NavigatedAway,
}

impl IngestionPhase {
    /// Whether the picker and the indexing action are enabled.
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Idle | Self::FilesSelected | Self::Decoded)
    }
}

#[derive(Debug)]
struct IngestionState {
    phase: IngestionPhase,
    candidates: Vec<CandidateFile>,
    /// Same order and length as the candidates they were decoded from.
    contents: Vec<String>,
}

pub struct IngestionScreen {
    state: Arc<Mutex<IngestionState>>,
    api: ApiClient,
    events: EventSink,
}

impl IngestionScreen {
    pub fn new(api: ApiClient, events: EventSink) -> Self {
        let state = IngestionState {
            phase: IngestionPhase::Idle,
            candidates: Vec::new(),
            contents: Vec::new(),
        };
        Self { state: Arc::new(Mutex::new(state)), api, events }
    }

    pub fn phase(&self) -> IngestionPhase {
        self.state.lock().phase
    }

    pub fn candidates(&self) -> Vec<CandidateFile> {
        self.state.lock().candidates.clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.state.lock().contents.clone()
    }

    /// Mirrors the enabled state of the "Start Indexing" action.
    pub fn can_submit(&self) -> bool {
        let state = self.state.lock();
        state.phase.accepts_input() && !state.candidates.is_empty()
    }

    /// Narrows `raw` to text files and makes it the current selection.
    ///
    /// Returns `false` when the picker is disabled by a decode or submission
    /// in flight.
    pub fn select_files(&self, raw: Vec<CandidateFile>) -> bool {
        let mut state = self.state.lock();
        if !state.phase.accepts_input() {
            debug!(phase = ?state.phase, "file picker disabled");
            return false;
        }

        let total = raw.len();
        let accepted: Vec<CandidateFile> = raw.into_iter().filter(CandidateFile::is_accepted).collect();
        if accepted.len() != total {
            warn!(rejected = total - accepted.len(), accepted = accepted.len(), "selection narrowed");
            self.events.warn(NARROWED_NOTICE);
        }

        if accepted.is_empty() {
            state.contents.clear();
            state.phase = IngestionPhase::Idle;
        } else {
            state.phase = IngestionPhase::FilesSelected;
        }
        state.candidates = accepted;
        true
    }

    /// Reads every selected file concurrently.
    ///
    /// All or nothing: the decoded set only replaces the previous one when
    /// every file decoded. On failure the selection stays for a retry.
    pub fn decode_all(&self) -> Option<JoinHandle<Settled>> {
        let files = {
            let mut state = self.state.lock();
            if !state.phase.accepts_input() {
                debug!(phase = ?state.phase, "decode already running or screen busy");
                return None;
            }
            if state.candidates.is_empty() {
                warn!("decode requested with no files selected");
                self.events.warn(NOTHING_TO_INDEX_NOTICE);
                return None;
            }
            state.phase = IngestionPhase::Decoding;
            state.candidates.clone()
        };

        let weak = Arc::downgrade(&self.state);
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let outcome = decode_files(files).await;
            let Some(shared) = weak.upgrade() else {
                debug!("ingestion screen unmounted, dropping decoded files");
                return Settled::Discarded;
            };
            let mut state = shared.lock();
            match outcome {
                Ok(contents) => {
                    debug!(files = contents.len(), "selection decoded");
                    state.contents = contents;
                    state.phase = IngestionPhase::Decoded;
                    Settled::Applied
                }
                Err(err) => {
                    error!(error = %err, "failed to read files");
                    state.phase = IngestionPhase::FilesSelected;
                    events.error(DECODE_FAILED_NOTICE);
                    Settled::Failed
                }
            }
        }))
    }

    /// Posts the decoded texts for indexing.
    ///
    /// Only runs from `Decoded`, so the body always matches the current
    /// selection. On success the screen asks the shell to show the index.
    pub fn submit_indexing(&self) -> Option<JoinHandle<Settled>> {
        let (documents, prior) = {
            let mut state = self.state.lock();
            if !state.phase.accepts_input() {
                debug!(phase = ?state.phase, "indexing action disabled");
                return None;
            }
            if state.phase != IngestionPhase::Decoded || state.contents.is_empty() {
                warn!(phase = ?state.phase, decoded = state.contents.len(), "nothing decoded to index");
                self.events.warn(NOTHING_TO_INDEX_NOTICE);
                return None;
            }
            let prior = state.phase;
            state.phase = IngestionPhase::Submitting;
            (state.contents.clone(), prior)
        };

        let weak = Arc::downgrade(&self.state);
        let api = self.api.clone();
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let result = api.index_documents(&documents).await;
            let Some(shared) = weak.upgrade() else {
                debug!("ingestion screen unmounted, dropping indexing result");
                return Settled::Discarded;
            };
            let mut state = shared.lock();
            match result {
                Ok(()) => {
                    state.phase = IngestionPhase::NavigatedAway;
                    events.info(INDEXED_NOTICE);
                    events.navigate(Route::ViewIndex, None);
                    Settled::Applied
                }
                Err(err) => {
                    error!(error = %err, "indexing failed");
                    state.phase = prior;
                    events.error(INDEX_FAILED_NOTICE);
                    Settled::Failed
                }
            }
        }))
    }
}

impl Screen for IngestionScreen {
    fn route(&self) -> Route {
        Route::Indexing
    }

    fn title(&self) -> &'static str {
        "Indexing Interface"
    }

    fn render(&self) -> Result<String, ClientError> {
        let state = self.state.lock();
        let mut out = format!("{}\n", self.title());
        if state.candidates.is_empty() {
            out.push_str("No files selected.\n");
        } else {
            out.push_str("Selected files:\n");
            for file in &state.candidates {
                out.push_str(&format!("  - {}\n", file.name));
            }
        }
        let action = match state.phase {
            IngestionPhase::Decoding => "Reading files...",
            IngestionPhase::Submitting => "[ Indexing... ]",
            IngestionPhase::NavigatedAway => "Indexed.",
            _ if state.candidates.is_empty() => "[ Start Indexing ] (select files first)",
            _ => "[ Start Indexing ]",
        };
        out.push_str(action);
        out.push('\n');
        Ok(out)
    }
}

async fn read_text(file: CandidateFile) -> Result<String, ClientError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| ClientError::Decode { name: file.name.clone(), reason: e.to_string() })?;
    String::from_utf8(bytes).map_err(|e| ClientError::Decode { name: file.name, reason: e.to_string() })
}

/// One task per file, joined in selection order.
async fn decode_files(files: Vec<CandidateFile>) -> Result<Vec<String>, ClientError> {
    let handles: Vec<(String, JoinHandle<Result<String, ClientError>>)> = files
        .into_iter()
        .map(|file| (file.name.clone(), tokio::spawn(read_text(file))))
        .collect();

    let mut contents = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let text = handle
            .await
            .map_err(|e| ClientError::Decode { name, reason: e.to_string() })??;
        contents.push(text);
    }
    Ok(contents)
}
