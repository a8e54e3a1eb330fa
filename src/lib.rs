//! EOF Fetcher Library
//!
//! Finds and downloads the Sentinel-1 orbit ephemeris (EOF) file covering
//! a given observation, preferring precise (POEORB) orbits and falling
//! back to restituted (RESORB) ones when precise files are not yet
//! published.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
