pub mod analyzer;
pub mod config;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod sitemap;
pub mod table;
pub mod weather;

pub use error::{FailureKind, GleanError, Result};
