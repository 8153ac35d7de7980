//! Utility functions for building Service Layer paths.

pub mod odata;

pub use odata::{entity_path, escape_key};
