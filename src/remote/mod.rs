//! Remote service client module
//!
//! Provides the HTTP client for the esa.io posts API.

mod client;
mod types;

pub use client::EsaClient;
pub use types::*;
