//! Workflow runner integration: inputs, event context, outputs and annotations

pub mod event;
pub mod inputs;
pub mod outputs;
