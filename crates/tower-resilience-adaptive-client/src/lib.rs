//! A dependency-light egress mirror of the server-side rate limiter and
//! backpressure calculator.
//!
//! This crate bundles no HTTP client. Instead it reads three response
//! signals the server side of this workspace already emits —
//! `Retry-After`, `X-RateLimit-Retry-After-Ms`, and `X-Backpressure` — off a
//! caller-supplied [`ResponseHeaderView`], and turns them into a
//! wait/proceed/reject [`Decision`] for the next call on that client.
//!
//! # Example
//!
//! ```
//! use tower_resilience_adaptive_client::{AdaptiveClient, AdaptiveClientConfig, Decision};
//! use tower_resilience_adaptive_client::headers::SimpleHeaders;
//!
//! let client = AdaptiveClient::new(AdaptiveClientConfig::builder().build());
//!
//! match client.before_call(Some("checkout-service")) {
//!     Decision::Proceed => { /* issue the call */ }
//!     Decision::Wait(_) | Decision::Reject(_) => { /* back off */ }
//! }
//!
//! let response_headers = SimpleHeaders::new().with("X-Backpressure", "0.92");
//! client.on_response(Some("checkout-service"), &response_headers, 200);
//! ```

mod client;
mod config;
mod events;
pub mod headers;

pub use client::{AdaptiveClient, BackoffOutcome, Decision};
pub use config::{AdaptiveClientConfig, AdaptiveClientConfigBuilder, Strategy};
pub use events::{AdaptiveClientEvent, WaitReason};
pub use headers::ResponseHeaderView;
