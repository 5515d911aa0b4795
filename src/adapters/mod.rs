// Copyright (c) 2025 - Cowboy AI, Inc.

//! Source-of-truth adapters
//!
//! Concrete implementations of the [`SourceOfTruth`](crate::repair::SourceOfTruth)
//! trait for real systems.

#[cfg(feature = "netbox")]
pub mod netbox;

#[cfg(feature = "netbox")]
pub use netbox::{NetBoxClient, NetBoxConfig};
