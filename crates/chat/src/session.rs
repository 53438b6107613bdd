//! Session attributes and lifecycle events shared with the transport.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Attribute key holding the display name chosen when the user joined.
pub const USERNAME_ATTRIBUTE: &str = "username";

/// Read access to the key/value state the transport keeps per connection.
pub trait SessionAttributes: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Shared, cloneable attribute map for a single connection.
///
/// Clones point at the same underlying map, so the transport can keep one
/// handle while lifecycle events carry another.
#[derive(Clone, Default)]
pub struct AttributeStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut attributes = self.inner.write().unwrap_or_else(|e| e.into_inner());
        attributes.insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut attributes = self.inner.write().unwrap_or_else(|e| e.into_inner());
        attributes.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionAttributes for AttributeStore {
    fn get(&self, key: &str) -> Option<String> {
        let attributes = self.inner.read().unwrap_or_else(|e| e.into_inner());
        attributes.get(key).cloned()
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("len", &self.len())
            .finish()
    }
}

/// Which lifecycle transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventKind {
    Connected,
    Disconnected,
}

/// Lifecycle notification for one connection.
pub struct SessionEvent {
    session_id: String,
    kind: SessionEventKind,
    attributes: Arc<dyn SessionAttributes>,
}

impl SessionEvent {
    pub fn new(
        session_id: impl Into<String>,
        kind: SessionEventKind,
        attributes: impl SessionAttributes + 'static,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            kind,
            attributes: Arc::new(attributes),
        }
    }

    pub fn connected(session_id: impl Into<String>, attributes: impl SessionAttributes + 'static) -> Self {
        Self::new(session_id, SessionEventKind::Connected, attributes)
    }

    pub fn disconnected(session_id: impl Into<String>, attributes: impl SessionAttributes + 'static) -> Self {
        Self::new(session_id, SessionEventKind::Disconnected, attributes)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn kind(&self) -> SessionEventKind {
        self.kind
    }

    pub fn attributes(&self) -> &dyn SessionAttributes {
        self.attributes.as_ref()
    }
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvent")
            .field("session_id", &self.session_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
