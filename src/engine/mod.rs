//! Simulation engine: state store, synthesis, trades, signals and scheduling.

pub mod activity;
pub mod analytics;
pub mod controller;
pub mod executor;
pub mod scheduler;
pub mod signal;
pub mod state;
pub mod synthesizer;
