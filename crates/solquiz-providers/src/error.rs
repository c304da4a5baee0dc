//! Provider error types.
//!
//! The error enum lives in `solquiz-core` so the generator can downcast it
//! when deciding whether to retry.

pub use solquiz_core::error::ProviderError;
