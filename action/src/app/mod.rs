//! Application entry wiring

pub mod run;
