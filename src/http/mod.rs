//! HTTP client module
//!
//! Provides the single execution path for seller API requests.
//!
//! # Features
//!
//! - **Request descriptors**: method, URL, headers, query and JSON body per page
//! - **Automatic Retries**: 429, 5xx, timeouts and connect errors with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Bearer token from the shared token provider

mod client;
mod rate_limit;
mod request;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::RequestDescriptor;
