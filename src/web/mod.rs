//! Web API module: read endpoints over stored sections plus the admin import
//! trigger.

pub mod admin;
pub mod courses;
pub mod error;
pub mod routes;
pub mod sections;
pub mod semesters;
pub mod status;

pub use routes::*;
