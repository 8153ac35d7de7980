//! Authentication state for the Service Layer.
//!
//! This module provides:
//! - `Credentials`: company/user/password used to build login requests
//! - `Session`: the cached session token shared by all callers of one client
//!
//! Sessions live in memory only and end when the Service Layer rejects them.

pub mod credentials;
pub(crate) mod session;

pub use credentials::Credentials;
