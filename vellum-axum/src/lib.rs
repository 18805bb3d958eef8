//! vellum-axum: Axum adapter for vellum.
//!
//! Exposes a router that serves stored content from any
//! [`StorageAdapter`](vellum_blob::StorageAdapter), mapping serve outcomes
//! onto HTTP responses with streaming bodies, range support, and
//! long-lived cache headers.

pub mod content;
mod range;

pub use content::{content_router, ContentState};
