//! Shared kernel - types, errors, config and utilities

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;
