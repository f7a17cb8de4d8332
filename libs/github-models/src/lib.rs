//! Wire models for the GitHub deployments REST API

pub mod models;

pub use models::*;
