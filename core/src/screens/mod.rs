//! The three screens of the client.
//!
//! Each screen owns its state behind an `Arc<Mutex<_>>`. Request tasks only
//! hold a `Weak` to it, so a screen that was navigated away from simply
//! drops the late result.

pub mod ingestion;
pub mod inspection;
pub mod query;

pub use ingestion::{CandidateFile, IngestionPhase, IngestionScreen};
pub use inspection::{InspectionScreen, InspectionStatus};
pub use query::{QueryScreen, QueryState};

use crate::error::ClientError;
use crate::shell::Route;

/// How an asynchronous screen action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The result was applied to the screen.
    Applied,
    /// The action failed; the screen rolled back and a notice was emitted.
    Failed,
    /// The screen was unmounted before the action finished.
    Discarded,
}

pub trait Screen: Send {
    fn route(&self) -> Route;

    fn title(&self) -> &'static str;

    /// Renders the screen body as text.
    fn render(&self) -> Result<String, ClientError>;
}
