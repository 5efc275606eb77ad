pub mod accounting;
pub mod company;
pub mod data_point;
pub mod dataset;
pub mod document;
pub mod qa;
pub mod quality;
