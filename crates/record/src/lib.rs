pub mod classify;
pub mod rotation;
pub mod schema;

mod builder;

pub use builder::build_record;
pub use classify::classify_role;
pub use schema::{CanonicalRecord, RawMessage};
