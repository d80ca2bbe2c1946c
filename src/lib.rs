//! Client-side data layer for the student depression-risk dashboard.
//!
//! Typed contract with the scoring backend, the controllers that own the
//! list and prediction state, and the read-side transforms behind the
//! analytics and export views.

pub mod analytics;
pub mod browse;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod models;
pub mod options;
pub mod report;
pub mod risk;
pub mod session;
pub mod students;

#[cfg(test)]
pub(crate) mod testing;
