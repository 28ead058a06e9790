//! Actor Mailbox
//!
//! FIFO inbound queue for an actor. The sender half lives in the actor's
//! cell and is reached by peers through their `ActorRef`; the receiver half
//! is handed to the run loop at spawn. The mailbox is its own
//! synchronization domain, not covered by the cell's lifecycle lock.
//!
//! Capacity and backpressure are out of scope at this layer, so the queue
//! is unbounded.

use crate::error::{ActorError, Result};
use crate::messages::ActorMessage;
use crate::registry::ActorId;
use tokio::sync::mpsc;

/// Sender half of an actor's inbound queue
#[derive(Debug, Clone)]
pub struct Mailbox {
    owner: ActorId,
    tx: mpsc::UnboundedSender<ActorMessage>,
}

/// Receiver half, held by the actor's run loop
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::UnboundedReceiver<ActorMessage>,
}

impl Mailbox {
    /// Create the mailbox pair for a new actor
    pub fn new(owner: ActorId) -> (Self, MailboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { owner, tx }, MailboxReceiver { rx })
    }

    /// Queue a message; fails only when the receiving run loop is gone
    pub fn send(&self, msg: ActorMessage) -> Result<()> {
        self.tx.send(msg).map_err(|_| ActorError::MailboxClosed {
            actor: self.owner.clone(),
        })
    }

    /// True once the receiver half has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl MailboxReceiver {
    /// Wait for the next message; `None` when every sender is gone
    pub async fn recv(&mut self) -> Option<ActorMessage> {
        self.rx.recv().await
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Option<ActorMessage> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_fifo_order() {
        let (mailbox, mut receiver) = Mailbox::new(ActorId::new());

        mailbox.send(ActorMessage::user(1u32)).unwrap();
        mailbox.send(ActorMessage::user(2u32)).unwrap();
        mailbox.send(ActorMessage::user(3u32)).unwrap();

        let mut seen = Vec::new();
        while let Some(ActorMessage::User(payload)) = receiver.try_recv() {
            seen.push(*payload.downcast::<u32>().unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn send_fails_once_receiver_is_gone() {
        let owner = ActorId::new();
        let (mailbox, receiver) = Mailbox::new(owner.clone());
        assert!(!mailbox.is_closed());

        drop(receiver);
        assert!(mailbox.is_closed());

        let err = mailbox.send(ActorMessage::user(1u32)).unwrap_err();
        match err {
            ActorError::MailboxClosed { actor } => assert_eq!(actor, owner),
            other => panic!("unexpected error: {other}"),
        }
    }
}
