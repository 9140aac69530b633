//! Infrastructure layer - external service clients

pub mod chain;
pub mod quote;
