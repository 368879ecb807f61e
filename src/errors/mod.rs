//! Error types for the listings client.
//!
//! One taxonomy covers the whole fetch path: deadlines, transport failures,
//! structured HTTP errors, body parsing, admission control, and caller aborts.

mod error;

pub use error::{FetchError, FetchResult};
