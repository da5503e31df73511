//! Dashboard API client and data models for the orgsplit tools.
//!
//! Provides typed structures and an asynchronous client for the handful of
//! Dashboard API v1 operations the workflows consume, behind the
//! [`DirectoryApi`] trait.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{DashboardClient, DashboardClientBuilder, DirectoryApi};
pub use models::{
    ApplianceSettings, CombineNetworksRequest, CombineNetworksResponse, Device, LicenseOverview,
    Network, Organization, UpdateNetworkRequest,
};

/// Convenient result alias sharing the `orgsplit-core` error type.
pub type Result<T> = orgsplit_core::Result<T>;
