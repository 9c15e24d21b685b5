use eppo_core::events::AssignmentEvent;

/// Error type a logger implementation may report back to the caller.
pub type LoggerError = Box<dyn std::error::Error + Send + Sync>;

/// Implement this trait to save assignment events to your data warehouse.
///
/// Unlike the historical convention of treating loggers as infallible, `log_assignment` may
/// return `Err`: in strict mode that error is surfaced to the caller of the assignment that
/// triggered it, and (by construction, see [`crate::client::Client`]) a failing call is never
/// recorded in the deduplication cache, so the next assignment for the same subject/flag will
/// retry the sink rather than silently suppressing it forever.
pub trait AssignmentLogger {
    fn log_assignment(&self, event: AssignmentEvent) -> Result<(), LoggerError>;
}

/// A logger that discards every event. Used when the caller doesn't care about assignment logs.
pub struct NoopAssignmentLogger;

impl AssignmentLogger for NoopAssignmentLogger {
    fn log_assignment(&self, _event: AssignmentEvent) -> Result<(), LoggerError> {
        Ok(())
    }
}

impl<T: Fn(AssignmentEvent) -> Result<(), LoggerError>> AssignmentLogger for T {
    fn log_assignment(&self, event: AssignmentEvent) -> Result<(), LoggerError> {
        self(event)
    }
}
