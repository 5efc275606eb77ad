//! Credit bookkeeping of companies.
//!
//! Admins grant credits through transactions; every data sourcing request a company member puts
//! into processing is billed once. The balance is the difference, rounded to one decimal place.

pub mod billed_request_listener;
pub mod credit_manager;
