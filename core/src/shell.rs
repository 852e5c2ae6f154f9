//! Top-level shell: one mounted screen at a time, chosen by route.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::ApiClient;
use crate::boundary::ErrorBoundary;
use crate::events::{EventSink, Navigation};
use crate::model::IndexSnapshot;
use crate::screens::{IngestionScreen, InspectionScreen, QueryScreen, Screen, Settled};

pub const BRAND: &str = "TF-IDF Search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Indexing,
    ViewIndex,
    Search,
}

const ROUTES: [(Route, &str, &str); 3] = [
    (Route::Indexing, "/", "Indexing"),
    (Route::ViewIndex, "/view-index", "View Index"),
    (Route::Search, "/search", "Search"),
];

impl Route {
    pub const ALL: [Route; 3] = [Route::Indexing, Route::ViewIndex, Route::Search];

    fn entry(self) -> (Route, &'static str, &'static str) {
        // ROUTES lists every variant
        ROUTES[self as usize]
    }

    pub fn path(self) -> &'static str {
        self.entry().1
    }

    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Exact lookup; a trailing slash is tolerated.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim();
        let normalized = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        ROUTES.iter().find(|(_, p, _)| *p == normalized).map(|(route, _, _)| *route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub enum ActiveScreen {
    Ingestion(IngestionScreen),
    Inspection(InspectionScreen),
    Query(QueryScreen),
}

impl ActiveScreen {
    fn as_screen(&self) -> &dyn Screen {
        match self {
            Self::Ingestion(s) => s,
            Self::Inspection(s) => s,
            Self::Query(s) => s,
        }
    }
}

pub struct Shell {
    api: ApiClient,
    events: EventSink,
    active: ActiveScreen,
    boundary: ErrorBoundary,
}

impl Shell {
    /// Starts on the indexing screen.
    pub fn new(api: ApiClient, events: EventSink) -> Self {
        let active = ActiveScreen::Ingestion(IngestionScreen::new(api.clone(), events.clone()));
        Self { api, events, active, boundary: ErrorBoundary::new() }
    }

    pub fn route(&self) -> Route {
        self.active.as_screen().route()
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    /// Unmounts the current screen and mounts the one for `route`.
    ///
    /// Returns the mount-time request, if the new screen starts one. Moving
    /// to the route that is already active keeps the mounted screen.
    pub fn navigate(
        &mut self,
        route: Route,
        payload: Option<Arc<IndexSnapshot>>,
    ) -> Option<JoinHandle<Settled>> {
        if route == self.route() {
            debug!(%route, "already on route");
            return None;
        }
        debug!(from = %self.route(), to = %route, "navigating");
        let (active, pending) = match route {
            Route::Indexing => (
                ActiveScreen::Ingestion(IngestionScreen::new(self.api.clone(), self.events.clone())),
                None,
            ),
            Route::ViewIndex => {
                let (screen, fetch) = InspectionScreen::mount(self.api.clone(), self.events.clone());
                (ActiveScreen::Inspection(screen), Some(fetch))
            }
            Route::Search => (
                ActiveScreen::Query(QueryScreen::new(self.api.clone(), self.events.clone(), payload)),
                None,
            ),
        };
        // the old screen drops here; its in-flight tasks find nothing to update
        self.active = active;
        self.boundary = ErrorBoundary::new();
        pending
    }

    pub fn follow(&mut self, navigation: Navigation) -> Option<JoinHandle<Settled>> {
        self.navigate(navigation.route, navigation.payload)
    }

    pub fn ingestion(&self) -> Option<&IngestionScreen> {
        match &self.active {
            ActiveScreen::Ingestion(s) => Some(s),
            _ => None,
        }
    }

    pub fn inspection(&self) -> Option<&InspectionScreen> {
        match &self.active {
            ActiveScreen::Inspection(s) => Some(s),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&QueryScreen> {
        match &self.active {
            ActiveScreen::Query(s) => Some(s),
            _ => None,
        }
    }

    pub fn nav_bar(&self) -> String {
        let current = self.route();
        let items: Vec<String> = Route::ALL
            .iter()
            .map(|&route| {
                if route == current {
                    format!("[{}]", route.label())
                } else {
                    format!(" {} ", route.label())
                }
            })
            .collect();
        format!("{BRAND} | {}", items.join(" "))
    }

    /// Navigation bar followed by the active screen, behind the boundary.
    pub fn render(&mut self) -> String {
        let screen = self.active.as_screen();
        let body = self.boundary.render(screen.title(), || screen.render());
        format!("{}\n\n{}", self.nav_bar(), body)
    }
}
