//! zipweather library
//!
//! Exposes the storage medium, response cache, location list, weather client
//! and dashboard for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod display;
pub mod locations;
pub mod storage;
