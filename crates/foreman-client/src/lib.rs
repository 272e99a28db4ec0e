//! Foreman client: authenticated REST access with resilient resource search.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod retry;
pub mod search;
pub mod transport;

pub use client::{ForemanClient, NewHost};
pub use config::ClientConfig;
pub use envelope::{Envelope, Object, Resource};
pub use error::{ForemanError, ForemanResult};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use search::{MatchMode, ResourceSearch, SearchQuery, DEFAULT_PER_PAGE};
pub use transport::{HttpTransport, Method, Transport};
