//! Query Workbench - a multi-tab terminal workbench for a remote query service.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod highlight;
pub mod logging;
pub mod result;
pub mod service;
pub mod session;
pub mod tui;
