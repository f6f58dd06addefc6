//! # Event Bus System
//!
//! Typed notifications between the core modules and the view layer, carried
//! over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────┐  emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ AndroidApi / ├────────>│           ├────────────>│ view layer │
//! │ hook poller  │         │ EventBus  │             └────────────┘
//! └──────────────┘         │ (broadcast│
//! ┌──────────────┐  emit   │  channel) │  subscribe  ┌────────────┐
//! │ Persistent-  ├────────>│           ├────────────>│ diagnostics│
//! │ Value / Auth │         │           │             └────────────┘
//! └──────────────┘         └───────────┘
//! ```
//!
//! Publishers ignore the "no subscribers" error: an event nobody listens to is
//! simply dropped.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Auth(AuthEvent::SignedOut)).ok();
//! assert_eq!(stream.recv().await.unwrap(), CoreEvent::Auth(AuthEvent::SignedOut));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - `RecvError::Lagged(n)`: the subscriber missed `n` events; keep reading.
//! - `RecvError::Closed`: every sender is gone; the core is shutting down.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Bridge(BridgeEvent),
    Storage(StorageEvent),
    Auth(AuthEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Bridge(e) => e.description(),
            CoreEvent::Storage(e) => e.description(),
            CoreEvent::Auth(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Bridge(BridgeEvent::CapabilityFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Storage(StorageEvent::Failed { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SessionIncomplete) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::Unauthorized { .. }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Auth(AuthEvent::SignedOut) => EventSeverity::Info,
            CoreEvent::Bridge(BridgeEvent::AvailabilityChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Bridge Events
// ============================================================================

/// Native bridge availability and capability outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BridgeEvent {
    /// The availability flag flipped.
    AvailabilityChanged {
        available: bool,
        /// Provider that resolved the handle, when available.
        provider: Option<String>,
    },
    /// A capability call failed and was converted into a failure result.
    CapabilityFailed { capability: String, message: String },
}

impl BridgeEvent {
    fn description(&self) -> &str {
        match self {
            BridgeEvent::AvailabilityChanged { available: true, .. } => "Native bridge attached",
            BridgeEvent::AvailabilityChanged { .. } => "Native bridge detached",
            BridgeEvent::CapabilityFailed { .. } => "Native capability failed",
        }
    }
}

// ============================================================================
// Storage Events
// ============================================================================

/// Where a persisted value change came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeSource {
    /// This process wrote it.
    Local,
    /// Another writer sharing the backend (another tab) wrote it.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StorageEvent {
    Saved { key: String, source: ChangeSource },
    Removed { key: String, source: ChangeSource },
    Failed { key: String, message: String },
}

impl StorageEvent {
    fn description(&self) -> &str {
        match self {
            StorageEvent::Saved { .. } => "Persisted value saved",
            StorageEvent::Removed { .. } => "Persisted value removed",
            StorageEvent::Failed { .. } => "Persisted value operation failed",
        }
    }
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Session lifecycle transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut,
    /// Stored token was past its expiry and has been discarded.
    SessionExpired,
    /// Only one of token/user was persisted; both were cleared.
    SessionIncomplete,
    ProfileUpdated { user_id: String },
    TokensUpdated,
    /// Backend rejected the bearer token; the view should navigate to
    /// `redirect_to`.
    Unauthorized { redirect_to: String },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SignedIn { .. } => "User signed in",
            AuthEvent::SignedOut => "User signed out",
            AuthEvent::SessionExpired => "Session expired",
            AuthEvent::SessionIncomplete => "Incomplete session discarded",
            AuthEvent::ProfileUpdated { .. } => "User profile updated",
            AuthEvent::TokensUpdated => "Auth tokens updated",
            AuthEvent::Unauthorized { .. } => "Backend rejected credentials",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Cloneable handle to the broadcast channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus where each subscriber may fall `capacity` events behind
    /// before receiving `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes to every subscriber; errors only when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New independent receiver of future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let auth_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Auth(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
