use eppo_core::events::BanditEvent;

use crate::assignment_logger::LoggerError;

/// Implement this trait to save bandit action events to your data warehouse. See
/// [`crate::AssignmentLogger`] for the fallibility/cache-ordering contract, which applies
/// identically here.
pub trait BanditLogger {
    fn log_bandit_action(&self, event: BanditEvent) -> Result<(), LoggerError>;
}

/// A logger that discards every event.
pub struct NoopBanditLogger;

impl BanditLogger for NoopBanditLogger {
    fn log_bandit_action(&self, _event: BanditEvent) -> Result<(), LoggerError> {
        Ok(())
    }
}

impl<T: Fn(BanditEvent) -> Result<(), LoggerError>> BanditLogger for T {
    fn log_bandit_action(&self, event: BanditEvent) -> Result<(), LoggerError> {
        self(event)
    }
}
