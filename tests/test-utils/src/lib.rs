//! Test utilities for the suite credential bootstrap
//!
//! - A wiremock-backed login service
//! - Login response and configuration fixtures
//! - Logging and temporary config helpers

pub mod fixtures;
pub mod helpers;
pub mod mocks;

pub use fixtures::*;
pub use helpers::*;
pub use mocks::*;
