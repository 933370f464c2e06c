//! Persistence gateway: database operations over the flat storage schema.

pub mod courses;
pub mod sections;
pub mod semesters;
