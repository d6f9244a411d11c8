//! Shared fixtures: an in-process fake of the banking service backed by the
//! in-memory store, and the harness wired against it over real HTTP.

#![allow(dead_code)]

pub mod fake_bank;
pub mod fixtures;

pub use fake_bank::*;
pub use fixtures::*;
