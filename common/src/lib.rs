//! Shared types of the Dataland QA and assembly backend.
//!
//! - `model`: wire DTOs exchanged over the REST API (data points, datasets, QA, accounting).
//! - `messages`: payloads travelling over the message queue between the upload, QA and
//!   accounting sides.
//! - `requests`: request bodies and query parameters accepted by the REST API.
//! - `validation`: stateless field validators applied to uploaded content.
//! - `merge`: helpers combining several data points of one type into a synthetic one.

pub mod merge;
pub mod messages;
pub mod model;
pub mod requests;
pub mod validation;
