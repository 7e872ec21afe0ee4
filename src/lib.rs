//! Biblio application library
//!
//! Authors and books resources, their storage, and the service bootstrap.

pub mod app;
pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use app::{registry_for, App};
pub use modules::*;
