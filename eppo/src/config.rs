use crate::assignment_logger::NoopAssignmentLogger;
use crate::bandit_logger::NoopBanditLogger;
use crate::{AssignmentLogger, BanditLogger, Client};

/// How a [`Client`] handles an evaluation failure (missing flag, type mismatch, internal error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Return the caller-supplied default value, with evaluation details populated to explain
    /// why. This is the default; feature flag evaluation should rarely be critical enough to
    /// justify crashing the caller.
    Graceful,
    /// Surface a typed [`eppo_core::Error`] instead of a default value.
    Strict,
}

/// Configuration for a [`Client`].
///
/// # Examples
/// ```
/// # use eppo::ClientConfig;
/// let client = ClientConfig::new()
///     .assignment_logger(|event| {
///         println!("{:?}", event);
///         Ok(())
///     })
///     .to_client();
/// ```
pub struct ClientConfig<'a> {
    pub(crate) failure_mode: FailureMode,
    pub(crate) assignment_logger: Box<dyn AssignmentLogger + Send + Sync + 'a>,
    pub(crate) bandit_logger: Box<dyn BanditLogger + Send + Sync + 'a>,
    pub(crate) assignment_cache_capacity: usize,
    pub(crate) bandit_cache_capacity: usize,
}

impl<'a> Default for ClientConfig<'a> {
    fn default() -> Self {
        ClientConfig {
            failure_mode: FailureMode::Graceful,
            assignment_logger: Box::new(NoopAssignmentLogger),
            bandit_logger: Box::new(NoopBanditLogger),
            assignment_cache_capacity: 10_000,
            bandit_cache_capacity: 10_000,
        }
    }
}

impl<'a> ClientConfig<'a> {
    /// Create a default client configuration: graceful failure mode, no-op loggers.
    ///
    /// ```
    /// # use eppo::ClientConfig;
    /// ClientConfig::new();
    /// ```
    pub fn new() -> Self {
        ClientConfig::default()
    }

    /// Set assignment logger to store variation assignments to your data warehouse.
    pub fn assignment_logger(
        mut self,
        assignment_logger: impl AssignmentLogger + Send + Sync + 'a,
    ) -> Self {
        self.assignment_logger = Box::new(assignment_logger);
        self
    }

    /// Set bandit logger to store bandit action assignments to your data warehouse.
    pub fn bandit_logger(mut self, bandit_logger: impl BanditLogger + Send + Sync + 'a) -> Self {
        self.bandit_logger = Box::new(bandit_logger);
        self
    }

    /// Switch to strict failure mode: evaluation failures become `Err` instead of a default
    /// value.
    pub fn strict(mut self) -> Self {
        self.failure_mode = FailureMode::Strict;
        self
    }

    /// Override the assignment-log deduplication cache's capacity (default 10,000 entries).
    pub fn assignment_cache_capacity(mut self, capacity: usize) -> Self {
        self.assignment_cache_capacity = capacity;
        self
    }

    /// Override the bandit-log deduplication cache's capacity (default 10,000 entries).
    pub fn bandit_cache_capacity(mut self, capacity: usize) -> Self {
        self.bandit_cache_capacity = capacity;
        self
    }

    /// Create a new [`Client`] using the specified configuration.
    ///
    /// ```
    /// # use eppo::{ClientConfig, Client};
    /// let client: Client = ClientConfig::new().to_client();
    /// ```
    pub fn to_client(self) -> Client<'a> {
        Client::new(self)
    }
}
