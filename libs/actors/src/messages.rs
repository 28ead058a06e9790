//! Actor System Messages
//!
//! Message shapes delivered through actor mailboxes. Application payloads
//! travel as `Arc<dyn Any>` within the process (no serialization); exit
//! notifications are plain serializable structs because supervisors log and
//! persist them.

use crate::registry::ActorId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Notification that a linked peer terminated
///
/// The wire shape is the 4-tuple (sender, receiver, exit tag, reason); the
/// tag is carried by the [`ActorMessage::Exit`] discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitNotification {
    /// Actor that terminated
    pub from: ActorId,
    /// Linked peer being notified
    pub to: ActorId,
    /// Terminal exit reason
    pub reason: u32,
}

/// A message delivered through an actor mailbox
pub enum ActorMessage {
    /// A linked peer exited
    Exit(ExitNotification),
    /// Application payload, shared by reference within the process
    User(Arc<dyn Any + Send + Sync>),
}

impl ActorMessage {
    /// Wrap an application payload
    pub fn user<M: Send + Sync + 'static>(msg: M) -> Self {
        ActorMessage::User(Arc::new(msg))
    }

    /// The exit notification, when this is one
    pub fn as_exit(&self) -> Option<&ExitNotification> {
        match self {
            ActorMessage::Exit(note) => Some(note),
            ActorMessage::User(_) => None,
        }
    }
}

impl fmt::Debug for ActorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorMessage::Exit(note) => f.debug_tuple("Exit").field(note).finish(),
            ActorMessage::User(_) => f.write_str("User(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_messages_expose_their_notification() {
        let note = ExitNotification {
            from: ActorId::new(),
            to: ActorId::new(),
            reason: 42,
        };
        let msg = ActorMessage::Exit(note.clone());
        assert_eq!(msg.as_exit(), Some(&note));
    }

    #[test]
    fn user_messages_carry_the_payload_by_reference() {
        let msg = ActorMessage::user("ping".to_string());
        assert!(msg.as_exit().is_none());

        match msg {
            ActorMessage::User(payload) => {
                let text = payload.downcast::<String>().expect("payload type");
                assert_eq!(*text, "ping");
            }
            ActorMessage::Exit(_) => panic!("expected a user message"),
        }
    }
}
