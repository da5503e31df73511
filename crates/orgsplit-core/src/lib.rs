//! # orgsplit-core
//!
//! Core types and utilities shared by the orgsplit tool set.
//!
//! This crate provides the error taxonomy, configuration, typed identifiers and
//! the bounded fan-out primitive used to batch requests against the Dashboard API.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status classification
//! - [`ids`] - Strongly-typed identifier wrappers for Dashboard resources
//! - [`types`] - Domain enums (product types, client tracking, license status)
//! - [`config`] - Validated configuration for a Dashboard session
//! - [`client`] - HTTP client settings and retry policy
//! - [`query`] - Query parameter builder
//! - [`fanout`] - Bounded-concurrency fan-out with progress reporting

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod fanout;
pub mod ids;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fanout::{fan_out, FanOutItem, FanOutOutcome, ItemFailure, NoProgress, ProgressReporter};
