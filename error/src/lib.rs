//! Cuttle error types.

pub mod error;
