//! Paginated listing retrieval.
//!
//! [`ResourceController`] owns the query state for one list view and drives
//! every fetch through the resilient facade.

mod controller;


pub use controller::{ResourceController, ResourceState};
