//! Actor Cell and References
//!
//! The supervision core of the runtime. Each actor owns one cell holding
//! its mailbox sender and a single coarse mutex over its lifecycle state:
//! exit reason, link set, and attachable registry. Guarding the three
//! together keeps the `cleanup` snapshot atomic with respect to concurrent
//! `link_to`/`unlink_from`/`attach` calls on the same actor.
//!
//! # Lock discipline (CRITICAL for deadlock prevention)
//!
//! The lifecycle lock is NEVER held across a call into another actor. Two
//! actors linking to each other concurrently would otherwise take the two
//! locks in opposite orders and deadlock. `link_to` releases its own lock
//! before `establish_backlink`, re-acquires it to insert, and undoes the
//! peer-side backlink if its own termination raced in between. The same
//! rule puts every exit notification and attachable callback in `cleanup`
//! after the lock is released, so a peer's re-entrant `remove_backlink`
//! cannot collide with this cell's lock.

use crate::attachable::{AttachToken, Attachable};
use crate::error::{ActorError, Result};
use crate::exit_code;
use crate::links::LinkSet;
use crate::mailbox::{Mailbox, MailboxReceiver};
use crate::messages::{ActorMessage, ExitNotification};
use crate::registry::ActorId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle state guarded by the cell's single mutex
///
/// One coarse lock, not three per-field locks: `cleanup` must observe and
/// drain the exit reason, links, and attachables as one atomic snapshot.
struct LifecycleState {
    exit_reason: u32,
    links: LinkSet,
    attachables: Vec<Box<dyn Attachable>>,
}

/// Per-actor supervision state: identity, mailbox sender, lifecycle lock
pub struct ActorCell {
    id: ActorId,
    mailbox: Mailbox,
    state: Mutex<LifecycleState>,
}

impl ActorCell {
    /// Create the cell for a new actor, returning the shared handle and
    /// the receiver half of its mailbox for the run loop
    pub fn new(id: ActorId) -> (ActorRef, MailboxReceiver) {
        let (mailbox, receiver) = Mailbox::new(id.clone());
        let cell = ActorCell {
            id,
            mailbox,
            state: Mutex::new(LifecycleState {
                exit_reason: exit_code::NOT_EXITED,
                links: LinkSet::default(),
                attachables: Vec::new(),
            }),
        };
        (
            ActorRef {
                cell: Arc::new(cell),
            },
            receiver,
        )
    }
}

impl fmt::Debug for ActorCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell").field("id", &self.id).finish()
    }
}

/// Shared, reference-counted handle to an actor, compared by identity
#[derive(Debug, Clone)]
pub struct ActorRef {
    cell: Arc<ActorCell>,
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.cell.id == other.cell.id
    }
}

impl Eq for ActorRef {}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cell.id)
    }
}

impl ActorRef {
    /// Actor identity
    pub fn id(&self) -> &ActorId {
        &self.cell.id
    }

    /// Queue a message into this actor's mailbox
    pub fn enqueue(&self, msg: ActorMessage) -> Result<()> {
        self.cell.mailbox.send(msg)
    }

    /// Queue an application payload
    pub fn send<M: Send + Sync + 'static>(&self, msg: M) -> Result<()> {
        self.enqueue(ActorMessage::user(msg))
    }

    /// True once a terminal exit reason has been set
    pub fn exited(&self) -> bool {
        exit_code::is_terminal(self.cell.state.lock().exit_reason)
    }

    /// Current exit reason; `exit_code::NOT_EXITED` while the actor is live
    pub fn exit_reason(&self) -> u32 {
        self.cell.state.lock().exit_reason
    }

    /// Link this actor to `peer`, so each is notified when the other exits
    ///
    /// Returns false without touching any state when `peer` is this actor,
    /// when this actor has already exited, or when the peer rejects the
    /// backlink (already linked, or the peer has exited and delivers its
    /// exit notification instead).
    pub fn link_to(&self, peer: &ActorRef) -> bool {
        if peer == self || self.exited() {
            return false;
        }
        // The peer's lock is taken inside establish_backlink; ours is not
        // held across the call.
        if !peer.establish_backlink(self) {
            return false;
        }
        let mut state = self.cell.state.lock();
        if exit_code::is_terminal(state.exit_reason) {
            // Terminated between the exit check and the backlink handshake.
            // Our cleanup drained the link set before the peer was in it, so
            // take the backlink out again rather than leak a one-sided link.
            drop(state);
            peer.remove_backlink(self);
            return false;
        }
        let added = state.links.insert(peer.clone());
        let links = state.links.len();
        drop(state);
        if added {
            debug!(actor_id = %self.cell.id, peer_id = %peer.id(), links, "link established");
        }
        added
    }

    /// True if `peer` is currently in this actor's link set
    pub fn is_linked_to(&self, peer: &ActorRef) -> bool {
        self.cell.state.lock().links.contains(peer)
    }

    /// Dissolve the link with `peer` on both sides
    ///
    /// No-op returning false when `peer` is this actor, when this actor has
    /// exited, or when the peer had no backlink to report removed.
    pub fn unlink_from(&self, peer: &ActorRef) -> bool {
        if peer == self || self.exited() {
            return false;
        }
        if !peer.remove_backlink(self) {
            return false;
        }
        let removed = self.cell.state.lock().links.remove_all(peer);
        if removed > 0 {
            debug!(actor_id = %self.cell.id, peer_id = %peer.id(), "link dissolved");
        }
        true
    }

    /// Reciprocal half of `link_to`, invoked by a peer on this actor
    ///
    /// Returns whether a new link was added. When this actor has already
    /// exited no link is created; the caller is sent this actor's exit
    /// notification instead, so a late link request still observes the
    /// termination.
    pub fn establish_backlink(&self, peer: &ActorRef) -> bool {
        if peer == self {
            return false;
        }
        let reason = {
            let mut state = self.cell.state.lock();
            if !exit_code::is_terminal(state.exit_reason) {
                return state.links.insert(peer.clone());
            }
            state.exit_reason
        };
        // The notification goes out after the lock is released, like all
        // exit side effects.
        let note = ExitNotification {
            from: self.cell.id.clone(),
            to: peer.id().clone(),
            reason,
        };
        if let Err(e) = peer.enqueue(ActorMessage::Exit(note)) {
            warn!(
                actor_id = %self.cell.id,
                peer_id = %peer.id(),
                error = %e,
                "could not deliver exit to late link request"
            );
        }
        false
    }

    /// Reciprocal half of `unlink_from`: removes every occurrence of `peer`
    ///
    /// Works even after exit, so a peer's `unlink_from` never wedges
    /// against a terminated actor.
    pub fn remove_backlink(&self, peer: &ActorRef) -> bool {
        if peer == self {
            return false;
        }
        self.cell.state.lock().links.remove_all(peer) > 0
    }

    /// Register a lifecycle observer
    ///
    /// Stores the attachable and returns true. When this actor has already
    /// exited, invokes `detach` with the terminal reason right away and
    /// returns false without retaining the observer.
    pub fn attach(&self, attachable: Box<dyn Attachable>) -> bool {
        let reason = {
            let mut state = self.cell.state.lock();
            if !exit_code::is_terminal(state.exit_reason) {
                state.attachables.push(attachable);
                return true;
            }
            state.exit_reason
        };
        // The stored reason cannot change once terminal; invoke unlocked.
        attachable.detach(reason);
        false
    }

    /// Remove a stored attachable by token without invoking it
    ///
    /// Explicit removal is a silent unregister, not a cleanup call.
    pub fn detach(&self, token: &AttachToken) -> bool {
        let mut state = self.cell.state.lock();
        match state.attachables.iter().position(|a| a.matches(token)) {
            Some(idx) => {
                state.attachables.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Finalize the exit state and drain links and attachables
    ///
    /// The sentinel reason is a no-op, as is any call after the first
    /// terminal reason: the stored reason is sticky and the side effects
    /// fire exactly once. One exit notification is enqueued per drained
    /// peer and each drained attachable gets its `detach(reason)` call,
    /// all after the lock is released.
    pub fn cleanup(&self, reason: u32) {
        if !exit_code::is_terminal(reason) {
            return;
        }
        let (links, attachables) = {
            let mut state = self.cell.state.lock();
            if exit_code::is_terminal(state.exit_reason) {
                return;
            }
            state.exit_reason = reason;
            (state.links.take(), std::mem::take(&mut state.attachables))
        };
        debug!(
            actor_id = %self.cell.id,
            reason,
            links = links.len(),
            attachables = attachables.len(),
            "actor exited"
        );
        for peer in links {
            let note = ExitNotification {
                from: self.cell.id.clone(),
                to: peer.id().clone(),
                reason,
            };
            if let Err(e) = peer.enqueue(ActorMessage::Exit(note)) {
                warn!(
                    actor_id = %self.cell.id,
                    peer_id = %peer.id(),
                    error = %e,
                    "linked peer unreachable during exit"
                );
            }
        }
        for attachable in attachables {
            attachable.detach(reason);
        }
    }

    /// Voluntarily terminate: drain state, then raise the terminate signal
    ///
    /// The returned error unwinds execution up to this actor's run loop;
    /// it must not cross actor boundaries. The sentinel reason is mapped
    /// to `NORMAL` since it can never be a real termination reason.
    pub fn quit(&self, reason: u32) -> Result<()> {
        let reason = if exit_code::is_terminal(reason) {
            reason
        } else {
            exit_code::NORMAL
        };
        self.cleanup(reason);
        Err(ActorError::Exited { reason })
    }

    /// Force-exit from outside the actor, e.g. a supervisor kill
    ///
    /// Runs `cleanup` and then wakes the run loop with a self-addressed
    /// exit message in case it is parked on an empty mailbox.
    pub fn force_exit(&self, reason: u32) {
        if !exit_code::is_terminal(reason) {
            return;
        }
        self.cleanup(reason);
        let note = ExitNotification {
            from: self.cell.id.clone(),
            to: self.cell.id.clone(),
            // cleanup may have lost the race to an earlier terminal reason
            reason: self.exit_reason(),
        };
        let _ = self.enqueue(ActorMessage::Exit(note));
    }

    /// Identities of currently linked peers, in insertion order
    pub fn linked_peers(&self) -> Vec<ActorId> {
        self.cell
            .state
            .lock()
            .links
            .iter()
            .map(|p| p.id().clone())
            .collect()
    }

    /// Number of stored attachables
    pub fn attachment_count(&self) -> usize {
        self.cell.state.lock().attachables.len()
    }
}
