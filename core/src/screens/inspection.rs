use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{Screen, Settled};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::events::EventSink;
use crate::matrix::{build_tables, IndexTables};
use crate::model::IndexSnapshot;
use crate::shell::Route;

const FETCH_FAILED_NOTICE: &str = "Error fetching index.";

#[derive(Debug, Clone)]
pub enum InspectionStatus {
    Loading,
    Ready(Arc<IndexSnapshot>),
    /// Rendered like `Loading`; there is no retry.
    Failed,
}

/// Shows the index snapshot fetched once on mount.
pub struct InspectionScreen {
    state: Arc<Mutex<InspectionStatus>>,
    events: EventSink,
}

impl InspectionScreen {
    /// Mounts the screen and starts its single snapshot fetch.
    pub fn mount(api: ApiClient, events: EventSink) -> (Self, JoinHandle<Settled>) {
        let state = Arc::new(Mutex::new(InspectionStatus::Loading));
        let weak = Arc::downgrade(&state);
        let notices = events.clone();
        let fetch = tokio::spawn(async move {
            let result = api.fetch_snapshot().await;
            let Some(shared) = weak.upgrade() else {
                debug!("inspection screen unmounted, dropping snapshot");
                return Settled::Discarded;
            };
            let mut status = shared.lock();
            match result {
                Ok(snapshot) => {
                    *status = InspectionStatus::Ready(Arc::new(snapshot));
                    Settled::Applied
                }
                Err(err) => {
                    error!(error = %err, "failed to fetch index snapshot");
                    *status = InspectionStatus::Failed;
                    notices.error(FETCH_FAILED_NOTICE);
                    Settled::Failed
                }
            }
        });
        (Self { state, events }, fetch)
    }

    pub fn status(&self) -> InspectionStatus {
        self.state.lock().clone()
    }

    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        match &*self.state.lock() {
            InspectionStatus::Ready(snapshot) => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    /// Both tables, once the snapshot has arrived.
    pub fn tables(&self) -> Option<Result<IndexTables, ClientError>> {
        self.snapshot().map(|snapshot| build_tables(&snapshot).map_err(ClientError::from))
    }

    /// "Go to Search": hands the snapshot forward. Unavailable while loading.
    pub fn proceed_to_query(&self) -> bool {
        match self.snapshot() {
            Some(snapshot) => {
                self.events.navigate(Route::Search, Some(snapshot));
                true
            }
            None => false,
        }
    }
}

impl Screen for InspectionScreen {
    fn route(&self) -> Route {
        Route::ViewIndex
    }

    fn title(&self) -> &'static str {
        "View Index"
    }

    fn render(&self) -> Result<String, ClientError> {
        let mut out = format!("{}\n", self.title());
        match self.tables() {
            None => out.push_str("Loading...\n"),
            Some(tables) => {
                out.push_str(&tables?.to_string());
                out.push_str("\n[ Go to Search ]\n");
            }
        }
        Ok(out)
    }
}
