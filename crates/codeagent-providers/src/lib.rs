//! LLM provider layer for codeagent.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait the agent loop talks to
//! - [`http_provider::HttpProvider`] — Messages API client over `reqwest`
//! - [`error::ProviderError`] — transport failures (never retried)

pub mod error;
pub mod http_provider;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
