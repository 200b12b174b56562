pub mod analytics_impl;
pub mod client;

pub use client::{ApiClient, ApiError, RetryPolicy};
