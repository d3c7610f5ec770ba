//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to USGS:
//!     → per-attempt timeout (reqwest client)
//!     → On failure: retries.rs (check if retryable)
//!     → backoff.rs (exponential delay with jitter, bounded attempts)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Retries only for idempotent requests (all USGS calls are GETs)
//! - Jittered backoff prevents thundering herd

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, RetryPolicy};
