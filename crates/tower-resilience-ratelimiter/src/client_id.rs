//! Client identification, independent of any HTTP framework.
//!
//! Extraction is a pure function over a small trait so this crate never
//! depends on `http`/`hyper`/`axum` directly — callers (the control-plane
//! crate, the adaptive client, or a user's own tower middleware) provide an
//! adapter that implements [`ClientIdSource`] for their request type.

use sha2::{Digest, Sha256};

/// A narrow view over a request's identifying headers/peer info.
///
/// Implement this for whatever request type a caller's stack actually uses;
/// this crate ships no implementations.
pub trait ClientIdSource {
    /// The value of a header, case-insensitively, if present.
    fn header(&self, name: &str) -> Option<&str>;
    /// The remote peer address, if known.
    fn remote_addr(&self) -> Option<&str>;
}

/// Extracts a stable client identifier using the default precedence:
/// `X-Client-Id` header, then a short SHA-256 digest of `Authorization`,
/// then the first hop of `X-Forwarded-For`, then the remote peer address,
/// falling back to `"anonymous"`.
pub fn extract_client_id<S: ClientIdSource>(source: &S) -> String {
    if let Some(id) = source.header("X-Client-Id") {
        if !id.is_empty() {
            return id.to_string();
        }
    }

    if let Some(auth) = source.header("Authorization") {
        if !auth.is_empty() {
            return hash_authorization(auth);
        }
    }

    if let Some(xff) = source.header("X-Forwarded-For") {
        if let Some(first) = xff.split(',').next().map(str::trim) {
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(addr) = source.remote_addr() {
        if !addr.is_empty() {
            return addr.to_string();
        }
    }

    "anonymous".to_string()
}

/// SHA-256 over the raw header value, truncated to 16 hex characters — long
/// enough to avoid accidental collisions between distinct tokens, short
/// enough to stay cheap as a map key.
fn hash_authorization(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    hex[..16].to_string()
}
