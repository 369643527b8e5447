//! Shared building blocks for `beacon`.
//!
//! Everything in this crate is free of network I/O apart from local interface
//! inspection: address arithmetic, scan targets, the error taxonomy, the JSON
//! navigation wrapper and the [`cache::AddressCache`] hand-off primitive.

pub mod cache;
pub mod config;
pub mod error;
pub mod json;
pub mod log;
pub mod network;
pub mod utils;

pub use error::{BeaconError, Result};
