//! Upload, storage and assembly of datasets and data points.
//!
//! - `assembled_data_manager`: splits framework datasets into data points and puts them back
//!   together.
//! - `data_manager`: datasets stored as a single document.
//! - `data_point_manager`: single data points.
//! - `data_point_validator`: content checks per data point base type.
//! - `referenced_reports`: agreement between `referencedReports` and data sources.
//! - `qa_status_listener`: applies QA decisions to the meta information.

pub mod assembled_data_manager;
pub mod data_manager;
pub mod data_point_manager;
pub mod data_point_validator;
pub mod qa_status_listener;
pub mod referenced_reports;
