//! View state machines for the console's pages.
//!
//! Each presenter is a plain struct driven by `update(action)`. An update may
//! hand back an effect (a request to perform); the caller executes it and
//! feeds the outcome back as another action tagged with the [`RequestId`] the
//! effect carried. Outcomes whose id is no longer the one being waited on are
//! dropped, which is how late responses for a page the operator already left
//! are ignored.

pub mod list;
pub mod pagination;
pub mod prompt;

pub use list::{ListAction, ListEffect, ListItem, ListState};
pub use pagination::{page_window, PageItem};
pub use prompt::{EditorMode, PromptAction, PromptEditor, PromptEffect};

/// Identifies one issued request so its outcome can be matched up later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Monotonic source of [`RequestId`]s, one per presenter
#[derive(Debug, Default)]
pub(crate) struct RequestSeq(u64);

impl RequestSeq {
    pub(crate) fn next(&mut self) -> RequestId {
        self.0 += 1;
        RequestId(self.0)
    }
}

/// Fetch lifecycle of a page or resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// In-flight tracking for a single mutation (save, toggle).
///
/// Only one call per mutation may be outstanding; its error, if any, stays
/// attached here so it can be shown next to the control that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    in_flight: Option<RequestId>,
    error: Option<String>,
}

impl Mutation {
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark a call as started. Returns false if one is already running.
    pub(crate) fn begin(&mut self, request: RequestId) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(request);
        self.error = None;
        true
    }

    /// Record the outcome of a call. Returns false for an outcome that does
    /// not belong to the running call.
    pub(crate) fn settle(&mut self, request: RequestId, error: Option<String>) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        self.error = error;
        true
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_increase() {
        let mut seq = RequestSeq::default();
        let a = seq.next();
        let b = seq.next();
        assert!(b > a);
    }

    #[test]
    fn test_mutation_allows_one_call_at_a_time() {
        let mut seq = RequestSeq::default();
        let mut mutation = Mutation::default();
        let first = seq.next();
        let second = seq.next();

        assert!(mutation.begin(first));
        assert!(mutation.is_pending());
        assert!(!mutation.begin(second));

        assert!(!mutation.settle(second, None));
        assert!(mutation.settle(first, Some("boom".into())));
        assert!(!mutation.is_pending());
        assert_eq!(mutation.error(), Some("boom"));

        assert!(mutation.begin(second));
        assert_eq!(mutation.error(), None);
    }
}
