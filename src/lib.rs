//! Kuso Search - filtered search over the actress dataset stored in S3
//!
//! Filter tags from the query string are turned into an S3 Select expression,
//! the matching CSV rows are streamed back, and each row is normalized into a
//! display record with a derived age.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_expression, build_predicate, parse_records, Clock, FixedClock, SystemClock};
pub use models::Record;
pub use services::{fetch_records, S3SelectClient, SelectRequest, SelectSource};
