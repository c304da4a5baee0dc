//! solquiz-core — question collection model, standards parser, and generator.
//!
//! This crate defines the data model, the collection operations (merge,
//! filter, search, statistics, append, delete), the provider trait, and the
//! generation pipeline that the rest of solquiz builds on.

pub mod collection;
pub mod error;
pub mod export;
pub mod generator;
pub mod model;
pub mod prompt;
pub mod session;
pub mod standards;
pub mod statistics;
pub mod traits;
