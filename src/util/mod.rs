//! Shared helpers for the viewer backend.

pub mod error;

pub use error::BlockViewError;
