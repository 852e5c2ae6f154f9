//! Client-side workflow for a TF-IDF indexing and search service.
//!
//! The service does all the numeric work. This crate collects input, talks
//! to the service over HTTP, reconciles the index snapshot into tables and
//! renders the three screens of the terminal client.

pub mod api;
pub mod boundary;
pub mod config;
pub mod error;
pub mod events;
pub mod matrix;
pub mod model;
pub mod screens;
pub mod shell;

pub use api::ApiClient;
pub use boundary::{ErrorBoundary, Fault};
pub use config::ClientConfig;
pub use error::{ClientError, ContractViolation, ErrorKind};
pub use events::{EventSink, Navigation, Notice, NoticeLevel, UiEvent};
pub use model::{IndexSnapshot, Metric, SearchHit, SearchRequest, SearchResponse};
pub use screens::{Screen, Settled};
pub use shell::{Route, Shell};
