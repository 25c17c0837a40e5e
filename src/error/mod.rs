//! Error Handling Module
//!
//! Provides the normalized error contract for the client runtime:
//! - Core error type ([`ClientError`]) with the `{status, detail}` shape
//!   backends speak
//! - Response-body normalization constructors used by the read and write
//!   paths
//! - Type conversions from common error types

mod conversions;
pub mod types;

pub use types::*;
