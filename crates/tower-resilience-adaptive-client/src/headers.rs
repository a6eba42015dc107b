//! Header parsing, decoupled from any particular HTTP client.
//!
//! The adaptive client never touches a socket; callers hand it a view over
//! whatever response headers their HTTP stack produced, and it reads the
//! three signals it cares about.

use std::collections::HashMap;
use std::time::Duration;

/// A read-only view over a single response's headers.
///
/// Implement this over your HTTP client's header map (`reqwest::HeaderMap`,
/// `http::HeaderMap`, …); [`SimpleHeaders`] is a small owned map provided for
/// tests and for callers who already extracted the handful of headers they
/// care about.
pub trait ResponseHeaderView {
    /// Returns the header's value, case-insensitively, if present.
    fn header(&self, name: &str) -> Option<&str>;
}

/// An owned, case-insensitive header map, useful for tests and for callers
/// that only want to hand over the headers this crate actually reads.
#[derive(Debug, Clone, Default)]
pub struct SimpleHeaders {
    values: HashMap<String, String>,
}

impl SimpleHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

impl ResponseHeaderView for SimpleHeaders {
    fn header(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// The three signals this crate reads off a response, already parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerSignal {
    /// `Retry-After`, in seconds (default 1 when a 429/503 carries neither
    /// header), or the millisecond-precision override when present.
    pub retry_after: Option<Duration>,
    /// `X-Backpressure`, a float typically in `[0, 1]`.
    pub backpressure: Option<f64>,
}

/// Reads `Retry-After`, `X-RateLimit-Retry-After-Ms`, and `X-Backpressure`
/// off `headers`. `status` is used only to pick the `Retry-After` default of
/// one second when the call was rejected (429/503) and carried no explicit
/// header.
pub fn read_server_signal(headers: &dyn ResponseHeaderView, status: u16) -> ServerSignal {
    let retry_after_ms = headers
        .header("x-ratelimit-retry-after-ms")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis);

    let retry_after_secs = headers
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let retry_after = retry_after_ms.or(retry_after_secs).or_else(|| {
        if matches!(status, 429 | 503) {
            Some(Duration::from_secs(1))
        } else {
            None
        }
    });

    let backpressure = headers
        .header("x-backpressure")
        .and_then(|v| v.trim().parse::<f64>().ok());

    ServerSignal {
        retry_after,
        backpressure,
    }
}
