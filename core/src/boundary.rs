//! Confines a failing render to the active screen's area.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ClientError;

pub const FALLBACK_MESSAGE: &str = "Something went wrong. Check the logs for details.";

/// A render fault kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub screen: String,
    pub message: String,
    pub recorded_at: String,
}

/// Wraps one mounted screen. After the first fault it only ever renders the
/// fallback; a fresh boundary comes with the next mount.
#[derive(Debug, Default)]
pub struct ErrorBoundary {
    fault: Option<Fault>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Runs `render`; an error or a panic is recorded and replaced by
    /// [`FALLBACK_MESSAGE`].
    pub fn render<F>(&mut self, screen: &str, render: F) -> String
    where
        F: FnOnce() -> Result<String, ClientError>,
    {
        if self.fault.is_some() {
            return fallback();
        }
        let message = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(output)) => return output,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        tracing::error!(screen, error = %message, "render fault");
        self.fault = Some(Fault {
            screen: screen.to_string(),
            message,
            recorded_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        });
        fallback()
    }
}

fn fallback() -> String {
    format!("{FALLBACK_MESSAGE}\n")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic during render".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractViolation;

    #[test]
    fn passes_output_through() {
        let mut boundary = ErrorBoundary::new();
        assert_eq!(boundary.render("s", || Ok("hello".into())), "hello");
        assert!(!boundary.has_fault());
    }

    #[test]
    fn error_latches_fallback() {
        let mut boundary = ErrorBoundary::new();
        let out = boundary.render("View Index", || {
            Err(ContractViolation::MissingTfidf { term: "cat".into(), doc: 1 }.into())
        });
        assert_eq!(out.trim_end(), FALLBACK_MESSAGE);
        let fault = boundary.fault().unwrap();
        assert_eq!(fault.screen, "View Index");
        assert!(fault.message.contains("cat"));
        assert!(!fault.recorded_at.is_empty());

        // no recovery on the same mount
        assert_eq!(boundary.render("View Index", || Ok("fine".into())).trim_end(), FALLBACK_MESSAGE);
    }

    #[test]
    fn panic_is_contained() {
        let mut boundary = ErrorBoundary::new();
        let out = boundary.render("Search", || panic!("boom"));
        assert_eq!(out.trim_end(), FALLBACK_MESSAGE);
        assert_eq!(boundary.fault().unwrap().message, "boom");
    }
}
