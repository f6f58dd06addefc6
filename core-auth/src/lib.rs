//! # Session Module
//!
//! Authentication state for the EcoLife web client.
//!
//! ## Overview
//!
//! The backend issues a bearer token and a user profile on login. This crate
//! keeps that pair in memory as an [`AuthState`], persists it through any
//! [`KeyValueStore`](bridge_traits::KeyValueStore) (native bridge storage,
//! browser `localStorage`, SQLite), and publishes every transition on the
//! core event bus.
//!
//! ## Features
//!
//! - `Unknown -> Authenticated | Anonymous` lifecycle driven by [`SessionManager`]
//! - Sequential token/user writes with rollback, and recovery from a
//!   half-persisted session
//! - Optional token expiry, checked lazily against an injected clock
//! - Forced logout when the backend answers 401

pub mod error;
pub mod manager;
pub mod session_store;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::{SessionManager, LOGIN_ROUTE};
pub use session_store::{SessionStore, StoredSession};
pub use types::{AuthState, AuthTokens, UserProfile, UserStatus};
