//! GitHub Deployments action library
//!
//! Core modules for driving GitHub deployments from a CI workflow step.

pub mod app;
pub mod ci;
pub mod config;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod logs;
pub mod steps;
pub mod utils;
