//! Domain layer - core business logic and entities

pub mod agent;
pub mod execution;
pub mod market;
pub mod strategy;
