//! Homeward: backend for a pet-adoption marketplace connecting shelters,
//! adopters, and administrators. The core is the adoption-application
//! workflow engine under [`workflows::adoption`]; the HTTP layer and
//! entity CRUD are thin shells around it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
