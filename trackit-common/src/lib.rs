//! # TrackIt Common Library
//!
//! Shared code for the TrackIt attendance service including:
//! - Error type shared by the service and its tools
//! - Bootstrap configuration loading
//! - Relay wire contract (event names, payloads, room naming)
//! - Client-side notification cache
//! - Database schema bootstrap and row models

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod notifications;
pub mod time;

pub use error::{Error, Result};
