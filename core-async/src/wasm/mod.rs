//! Single-threaded replacements for primitives that have no browser-friendly
//! Tokio equivalent.

pub mod cancellation_token;
