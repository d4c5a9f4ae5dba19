//! Test utilities for buzzer functions.
//!
//! Provides the contract fixture loader and Amazon Connect event builders.
//! Import from `[dev-dependencies]` only — never in production code.

pub mod event;
pub mod fixture;
