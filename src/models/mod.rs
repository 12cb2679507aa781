// Model exports
pub mod record;
pub mod responses;

pub use record::{Record, COLUMN_COUNT};
pub use responses::HealthResponse;
