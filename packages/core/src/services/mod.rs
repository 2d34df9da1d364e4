//! Business Services
//!
//! - `TreeService` - create, extend, rename and delete trees
//!
//! Services coordinate between the database layer and application logic,
//! implementing argument checks and emitting domain events.

pub mod error;
pub mod tree_service;


pub use error::TreeServiceError;
pub use tree_service::TreeService;
