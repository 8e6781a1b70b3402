//! Shared helpers.

pub mod hex;
