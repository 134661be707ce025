//! ssmenv: run commands with `ssm://` references resolved (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod env;
pub mod launcher;
pub mod loader;
pub mod resolver;
pub mod runner;
pub mod store;
