// Core exports
pub mod age;
pub mod clock;
pub mod query;
pub mod rows;

pub use age::{approximate_age, derive_age, BirthdateError, UNKNOWN_AGE};
pub use clock::{Clock, FixedClock, SystemClock};
pub use query::{build_expression, build_predicate, parse_tags, rule_for, TagRule};
pub use rows::{parse_records, RowError};
