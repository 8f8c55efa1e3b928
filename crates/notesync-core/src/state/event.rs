//! Triggering events for interactor jobs.

/// An event that launches one interactor job.
///
/// `event_name` is the key used to suppress duplicate dispatch while a job of
/// the same kind is in flight.
pub trait StateEvent: Send + Sync {
    /// Prefix for error messages produced by this event's job.
    fn error_info(&self) -> String;

    /// Stable name of the operation kind.
    fn event_name(&self) -> &'static str;

    /// Whether a progress indicator should be shown while the job runs.
    fn should_display_progress_bar(&self) -> bool;
}
