//! Application layer - wiring and runtime orchestration

mod app;

pub use app::run;
