//! RecoveryPro — loss-recovery staking calculator and session tracker
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod display;
pub mod engine;
pub mod strategy;
pub mod types;
