//! Actor Error Types
//!
//! Failures at this layer are either the one-shot terminate signal raised by
//! `quit` or a delivery problem against a gone actor. There are no retries;
//! retry policy belongs to outer supervisors.

use crate::registry::ActorId;
use thiserror::Error;

/// Convenience result alias for actor operations
pub type Result<T> = std::result::Result<T, ActorError>;

/// Main error type for the actor core
#[derive(Error, Debug)]
pub enum ActorError {
    /// One-shot terminate signal. Unwinds execution up to the owning
    /// actor's run loop and must never cross actor boundaries.
    #[error("actor exited with reason {reason:#x}")]
    Exited { reason: u32 },

    /// The receiving run loop is gone; the mailbox accepts nothing more
    #[error("mailbox closed for {actor}")]
    MailboxClosed { actor: ActorId },

    /// Lookup failed against the live-actor registry
    #[error("actor {actor} not found in registry")]
    UnknownActor { actor: ActorId },
}

impl ActorError {
    /// Terminal reason carried by a terminate signal, if this is one
    pub fn exit_reason(&self) -> Option<u32> {
        match self {
            ActorError::Exited { reason } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reason_only_on_terminate_signal() {
        let signal = ActorError::Exited { reason: 42 };
        assert_eq!(signal.exit_reason(), Some(42));

        let closed = ActorError::MailboxClosed {
            actor: ActorId::new(),
        };
        assert_eq!(closed.exit_reason(), None);
    }

    #[test]
    fn display_includes_reason_code() {
        let signal = ActorError::Exited { reason: 0x10 };
        assert!(signal.to_string().contains("0x10"));
    }
}
