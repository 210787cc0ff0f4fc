//! Dispatch metrics.
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! application installs a recorder.

use crate::event::LifecycleEvent;
use metrics::counter;

/// Metric names.
pub mod names {
    pub const EVENTS_DISPATCHED_TOTAL: &str = "conduit_events_dispatched_total";
    pub const LIFECYCLE_DISPATCHED_TOTAL: &str = "conduit_lifecycle_dispatched_total";
}

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A handler ran and succeeded.
    Handled,
    /// No handler was registered.
    Unmatched,
    /// A handler ran and returned an error.
    Failed,
}

impl Outcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::Unmatched => "unmatched",
            Outcome::Failed => "failed",
        }
    }
}

/// Describe the dispatch metrics to the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(
        names::EVENTS_DISPATCHED_TOTAL,
        "Total number of event dispatches by outcome"
    );
    metrics::describe_counter!(
        names::LIFECYCLE_DISPATCHED_TOTAL,
        "Total number of namespace lifecycle hooks fired"
    );
}

/// Record an event dispatch.
pub fn record_event(outcome: Outcome) {
    counter!(names::EVENTS_DISPATCHED_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// Record a lifecycle hook dispatch.
pub fn record_lifecycle(hook: LifecycleEvent) {
    counter!(names::LIFECYCLE_DISPATCHED_TOTAL, "hook" => hook.label()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Handled.as_str(), "handled");
        assert_eq!(Outcome::Unmatched.as_str(), "unmatched");
        assert_eq!(Outcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: every call is a no-op
        describe_metrics();
        record_event(Outcome::Handled);
        record_lifecycle(LifecycleEvent::Disconnect);
    }
}
