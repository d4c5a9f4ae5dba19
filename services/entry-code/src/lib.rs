pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod state;
pub mod usecase;
