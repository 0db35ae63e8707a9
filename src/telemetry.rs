// src/telemetry.rs
//! Tracing setup and log-safe query fingerprints.

use sha2::{Digest, Sha256};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::intent::normalize;

pub const ENV_DEV_LOG: &str = "ADDMATHS_DEV_LOG";

// Dev logging gate: ADDMATHS_DEV_LOG=1
pub fn dev_logging_enabled() -> bool {
    std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1")
}

/// Install a compact tracing subscriber when dev logging is enabled (no-op otherwise).
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("addmaths_expert=info,intent=debug,warn"));

    // try_init: a second call (tests, embedding) must not panic.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Digest bytes kept in a query fingerprint (hex-encoded, so twice as many chars).
pub const FINGERPRINT_BYTES: usize = 6;

/// Fingerprint of a normalized query. Logs carry this instead of the raw text, and
/// queries differing only in case or spacing share one fingerprint.
pub fn query_fingerprint(text: &str) -> String {
    sha256_hex_prefix(&normalize(text), FINGERPRINT_BYTES)
}

/// First `bytes` bytes of the SHA-256 digest of `text`, hex-encoded. Capped at 32.
pub fn sha256_hex_prefix(text: &str, bytes: usize) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .take(bytes)
        .map(|b| format!("{b:02x}"))
        .collect()
}
