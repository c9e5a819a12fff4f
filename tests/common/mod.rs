//! Common test infrastructure
//!
//! Fake provider implementations and fixture builders shared by the
//! end-to-end tests. Tests should only import from this module.

mod constants;
mod fakes;
mod fixtures;

pub use constants::*;
pub use fakes::{FakeRegistry, FakeSource};
#[allow(unused_imports)]
pub use fixtures::{
    day, hitting_line, pitch, pitching_line, plate_appearance, temp_store, TestStore,
};
