//! Quality assurance and data point assembly backend for ESG datasets.
//!
//! Uploaded framework datasets are split into single data points, validated against their
//! specifications and stored individually. Reviewers accept or reject datasets and data points;
//! the message dispatcher keeps the "currently active" flags in step with those decisions.

pub mod accounting;
pub mod auth;
pub mod config;
pub mod datapoints;
pub mod error;
pub mod messaging;
pub mod qa;
pub mod services;
pub mod specification;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
