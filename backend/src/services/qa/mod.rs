//! QA endpoints under `/qa`.
//!
//! - `datasets`: the dataset review queue, status decisions and dataset QA reports.
//! - `data_points`: the same for single data points.
//! - `dataset_reviews`: aggregate reviews of assembled datasets.

pub mod data_points;
pub mod dataset_reviews;
pub mod datasets;
