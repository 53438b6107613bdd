//! # Lobby Chat Crate
//!
//! Domain layer for the Lobby chat backend. It owns the wire model for chat
//! messages, the session attribute abstraction shared with the transport, the
//! in-process topic broker and the two message producers built on top of it:
//!
//! - **PresenceNotifier**: turns session lifecycle events into `LEAVE` notices
//! - **ChatController**: handles `/app/chat.addUser` and `/app/chat.sendMessage`
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use lobby_chat::{AttributeStore, PresenceNotifier, SessionEvent, TopicBroker, PUBLIC_TOPIC};
//!
//! let broker = Arc::new(TopicBroker::new(16, vec!["/topic".to_string()]));
//! let mut public = broker.subscribe(PUBLIC_TOPIC).unwrap();
//!
//! let attributes = AttributeStore::new();
//! attributes.insert("username", "alice");
//!
//! let notifier = PresenceNotifier::new(broker.clone());
//! notifier.handle(&SessionEvent::disconnected("s-1", attributes)).unwrap();
//!
//! assert_eq!(public.try_recv().unwrap().sender, "alice");
//! ```

pub mod broker;
pub mod controller;
pub mod error;
pub mod message;
pub mod presence;
pub mod publisher;
pub mod session;

pub use broker::TopicBroker;
pub use controller::{ChatController, ADD_USER_ROUTE, SEND_MESSAGE_ROUTE};
pub use error::{ChatError, ChatResult};
pub use message::{ChatMessage, MessageType};
pub use presence::PresenceNotifier;
pub use publisher::Publisher;
pub use session::{AttributeStore, SessionAttributes, SessionEvent, SessionEventKind, USERNAME_ATTRIBUTE};

/// Destination every participant subscribes to for presence and chat traffic.
pub const PUBLIC_TOPIC: &str = "/topic/public";
