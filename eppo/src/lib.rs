//! The Rust SDK for Eppo, a next-generation feature flagging and experimentation platform.
//!
//! # Overview
//!
//! The SDK revolves around a [`Client`] that evaluates feature flag values for "subjects", where
//! each subject has a unique key and key-value attributes associated with it. Feature flag
//! evaluation results in a typed value being returned to the caller, representing the specific
//! variation assigned to the subject. Flags whose variation is bandit-controlled additionally
//! select one action out of a caller-supplied set via [`Client::get_bandit_action`].
//!
//! # Typed assignments
//!
//! Every Eppo flag has a return type that is set once on creation. Assignments in code should be
//! made using the corresponding typed function:
//! - [`Client::get_boolean_assignment()`]
//! - [`Client::get_integer_assignment()`]
//! - [`Client::get_numeric_assignment()`]
//! - [`Client::get_string_assignment()`]
//! - [`Client::get_json_assignment()`]
//!
//! # Assignment and bandit loggers
//!
//! An [`AssignmentLogger`] and/or [`BanditLogger`] should be provided to save assignment/bandit
//! events to your storage, facilitating tracking of which subject received which value.
//!
//! ```
//! # use eppo::ClientConfig;
//! let config = ClientConfig::new().assignment_logger(|event| {
//!   println!("{:?}", event);
//!   Ok(())
//! });
//! ```
//!
//! # Error Handling
//!
//! By default, the client runs in graceful mode: every evaluation failure (missing flag, type
//! mismatch, missing configuration) returns the caller-supplied default value, with
//! [`Client::get_assignment_with_details`] available to see why. Calling
//! [`ClientConfig::strict`] switches failures to surface as a typed [`Error`].
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for its own diagnostic
//! messages. Consider integrating a `log`-compatible logger implementation for visibility into
//! SDK operations.

#![warn(missing_docs)]

mod assignment_logger;
mod bandit_logger;
mod client;
mod config;

#[doc(inline)]
pub use eppo_core::{
    ufc::eval_details::*, ufc::AssignmentValue, AttributeValue, Attributes, Error,
    EvaluationError, Result,
};

pub use assignment_logger::AssignmentLogger;
pub use bandit_logger::BanditLogger;
pub use client::{BanditActionResult, Client};
pub use config::{ClientConfig, FailureMode};
