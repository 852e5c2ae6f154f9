use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::{Screen, Settled};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::events::EventSink;
use crate::matrix::format_score;
use crate::model::{IndexSnapshot, Metric, SearchHit, SearchRequest};
use crate::shell::Route;

const EMPTY_QUERY_NOTICE: &str = "Please enter a query.";
const NO_RESULTS_NOTICE: &str = "No matching documents found.";
const SEARCH_FAILED_NOTICE: &str = "Search failed. Check logs for details.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub query: String,
    pub metric: Metric,
}

#[derive(Debug, Default)]
struct QueryInner {
    input: QueryState,
    results: Vec<SearchHit>,
    loading: bool,
}

pub struct QueryScreen {
    state: Arc<Mutex<QueryInner>>,
    api: ApiClient,
    events: EventSink,
    context: Option<Arc<IndexSnapshot>>,
}

impl QueryScreen {
    /// `context` is the snapshot handed over by the index screen, if any.
    pub fn new(api: ApiClient, events: EventSink, context: Option<Arc<IndexSnapshot>>) -> Self {
        Self { state: Arc::new(Mutex::new(QueryInner::default())), api, events, context }
    }

    pub fn input(&self) -> QueryState {
        self.state.lock().input.clone()
    }

    pub fn results(&self) -> Vec<SearchHit> {
        self.state.lock().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn indexed_documents(&self) -> Option<usize> {
        self.context.as_ref().map(|snapshot| snapshot.document_count())
    }

    /// Replaces the query text. Ignored while a search is in flight.
    pub fn set_query(&self, query: impl Into<String>) -> bool {
        let mut state = self.state.lock();
        if state.loading {
            return false;
        }
        state.input.query = query.into();
        true
    }

    /// Adds a line to a multi-line query.
    pub fn append_line(&self, line: &str) -> bool {
        let mut state = self.state.lock();
        if state.loading {
            return false;
        }
        if !state.input.query.is_empty() {
            state.input.query.push('\n');
        }
        state.input.query.push_str(line);
        true
    }

    pub fn set_metric(&self, metric: Metric) -> bool {
        let mut state = self.state.lock();
        if state.loading {
            return false;
        }
        state.input.metric = metric;
        true
    }

    /// Sends `{query, metric}` to the service.
    ///
    /// Only an empty query is rejected; whitespace goes through as typed.
    pub fn submit_query(&self) -> Option<JoinHandle<Settled>> {
        let request = {
            let mut state = self.state.lock();
            if state.loading {
                debug!("search already in flight");
                return None;
            }
            if state.input.query.is_empty() {
                warn!("search requested with an empty query");
                self.events.warn(EMPTY_QUERY_NOTICE);
                return None;
            }
            state.loading = true;
            SearchRequest { query: state.input.query.clone(), metric: state.input.metric }
        };

        let weak = Arc::downgrade(&self.state);
        let api = self.api.clone();
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            let result = api.search(&request).await;
            let Some(shared) = weak.upgrade() else {
                debug!("query screen unmounted, dropping search results");
                return Settled::Discarded;
            };
            let mut state = shared.lock();
            state.loading = false;
            match result {
                Ok(response) => {
                    state.results = response.into_hits();
                    debug!(hits = state.results.len(), metric = %request.metric, "results replaced");
                    if state.results.is_empty() {
                        events.info(NO_RESULTS_NOTICE);
                    }
                    Settled::Applied
                }
                Err(err) => {
                    error!(error = %err, "search failed");
                    events.error(SEARCH_FAILED_NOTICE);
                    Settled::Failed
                }
            }
        }))
    }
}

impl Screen for QueryScreen {
    fn route(&self) -> Route {
        Route::Search
    }

    fn title(&self) -> &'static str {
        "Search"
    }

    fn render(&self) -> Result<String, ClientError> {
        let state = self.state.lock();
        let mut out = format!("{}\n", self.title());
        if let Some(count) = self.indexed_documents() {
            out.push_str(&format!("Index: {count} documents\n"));
        }

        out.push_str("Query:\n");
        if state.input.query.is_empty() {
            out.push_str("  (empty)\n");
        } else {
            for line in state.input.query.lines() {
                out.push_str(&format!("  > {line}\n"));
            }
        }

        out.push_str("Similarity method:");
        for metric in Metric::ALL {
            let mark = if metric == state.input.metric { "(*)" } else { "( )" };
            out.push_str(&format!(" {mark} {}", metric.label()));
        }
        out.push('\n');
        out.push_str(if state.loading { "[ Searching... ]\n" } else { "[ Search ]\n" });

        out.push_str("Results:\n");
        if state.loading {
            out.push_str("Loading...\n");
        } else if state.results.is_empty() {
            out.push_str("No results\n");
        } else {
            for hit in &state.results {
                out.push_str(&format!(
                    "Doc {} (Score: {}): {}\n",
                    hit.doc_id,
                    format_score(hit.score),
                    hit.content
                ));
            }
        }
        Ok(out)
    }
}
