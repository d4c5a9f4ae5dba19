//! Shared plumbing for buzzer functions: tracing setup and env-config helpers.

pub mod config;
pub mod tracing;
