//! # Persistent Values
//!
//! [`PersistentValue`] gives a view one `(value, loading, error)` triple for a
//! single key, with `save`, `remove`, `update` and `reload`, over whichever
//! [`KeyValueStore`](bridge_traits::KeyValueStore) the host selected.
//!
//! When the store publishes change notifications (browser `localStorage`,
//! shared in-memory stores) the value follows writes made by other tabs until
//! it is detached.

pub mod value;

pub use value::{Persistable, PersistentValue, ValueSnapshot};
