//! Common test utilities for statevuln-core
//!
//! Shared fixtures and a fake live implementation for integration tests.

#![allow(dead_code)]

mod fake_sul;
mod fixtures;

pub use fake_sul::*;
pub use fixtures::*;
