//! Observability: structured, single-line JSON logging.
//!
//! # Principles
//!
//! 1. Observability is read-only; it never changes control flow.
//! 2. No buffering: one call writes one line.
//! 3. Deterministic field ordering, so identical events produce identical
//!    output regardless of call-site argument order.

mod logger;

pub use logger::{Logger, Severity};
