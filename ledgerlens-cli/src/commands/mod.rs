//! CLI command implementations.

pub mod auth;
pub mod chart;
pub mod config;
pub mod report;
pub mod temps;
