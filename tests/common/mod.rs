//! Common test utilities and helpers
//!
//! Recording doubles for the process and VCS seams plus fixtures for
//! Shopware project layouts.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_fixtures;

pub use mock_services::{FakeVcs, RecordingRunner};
pub use test_fixtures::ProjectFixture;
