//! postdesk
//!
//! Multi-origin API client runtime for the Postdesk content-approval backend.
//!
//! The crate routes outbound requests to one of several configured backend
//! origins, keeps bearer-token authentication in sync across all of them,
//! normalizes heterogeneous backend error shapes into [`ClientError`], and
//! provides a keyed read-through cache with in-flight request deduplication.
#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod execution;
pub mod registry;
pub mod utils;

pub use cache::{CacheKey, CachePolicy, QueryCache};
pub use config::RegistryConfig;
pub use error::ClientError;
pub use execution::encoding::{ParamValue, QueryParams};
pub use execution::mutation::{MutationBody, MutationRequest};
pub use execution::query::{QueryRequest, ServerResponse};
pub use registry::{ClientRegistry, Origin, Transport};
pub use utils::cancel::CancelHandle;
