pub mod adapters;
pub mod config;
pub mod error;
pub mod services;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod web;
