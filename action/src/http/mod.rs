//! GitHub REST client

pub mod client;
pub mod deployments;
