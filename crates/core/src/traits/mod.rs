//! Platform-agnostic trait abstractions.

pub mod time;

pub use time::TimeSource;
