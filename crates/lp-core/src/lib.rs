//! # lp-core
//!
//! The central domain logic and interface definitions for Linkpage: the
//! Profile document model, legacy migration, the name uniqueness protocol,
//! the editor session, and the rendering composer. Adapters implement the
//! port traits in [`traits`]; nothing in this crate performs I/O itself.

pub mod editor;
pub mod error;
pub mod memory;
pub mod merge;
pub mod migrate;
pub mod models;
pub mod names;
pub mod render;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::{AppError, Result};
pub use models::*;
pub use traits::*;
