//! DeFiSwarm — simulated multi-agent ETH/USDT trading swarm
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod rng;
pub mod feed;
pub mod engine;
pub mod dashboard;
