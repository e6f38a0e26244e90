//! Docgate - rate-limited document submission
//!
//! This crate submits create-document calls to a remote API that enforces a
//! fixed quota of N calls per time unit. Every caller in the process goes
//! through one shared [`ratelimit::RateGate`], which admits at most N calls
//! per fixed window and suspends the rest until the window resets.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod ratelimit;
pub mod transport;

pub use client::SubmissionClient;
pub use error::{DocgateError, Result};
