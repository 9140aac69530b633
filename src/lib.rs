//! Vault Strategy Engine - autonomous strategies for a Solana yield vault
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use domain::agent::{Agent, AgentManager};
pub use domain::execution::ExecutionTracker;
pub use domain::market::PriceMonitor;
pub use domain::strategy::{Strategy, StrategyFactory, StrategyKind};
