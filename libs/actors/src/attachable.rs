//! Attachables
//!
//! Owned lifecycle observers. An attachable stored on a live actor is
//! guaranteed a single `detach(reason)` call when the actor exits; one
//! attached to an already-exited actor is invoked immediately and never
//! stored. Before exit, a stored attachable can be removed by token without
//! being invoked.

use std::fmt;
use uuid::Uuid;

/// Token identifying a stored attachable for pre-exit removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachToken {
    id: Uuid,
}

impl AttachToken {
    /// Create a fresh, unique token
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for AttachToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attach-{}", self.id.simple())
    }
}

/// Lifecycle observer owned by an actor until detached or removed
///
/// `detach` consumes the box, so the at-most-once contract is enforced by
/// ownership: once invoked, the observer is gone.
pub trait Attachable: Send + 'static {
    /// Invoked with the actor's terminal exit reason
    fn detach(self: Box<Self>, reason: u32);

    /// True if `token` identifies this attachable for removal
    fn matches(&self, token: &AttachToken) -> bool {
        let _ = token;
        false
    }
}

/// Closure-based attachable carrying a removal token
pub struct ExitHook<F> {
    token: AttachToken,
    hook: F,
}

impl<F> ExitHook<F>
where
    F: FnOnce(u32) + Send + 'static,
{
    /// Wrap a closure to run on actor exit
    pub fn new(hook: F) -> Self {
        Self {
            token: AttachToken::new(),
            hook,
        }
    }

    /// Token to later remove this hook without firing it
    pub fn token(&self) -> AttachToken {
        self.token
    }
}

impl<F> Attachable for ExitHook<F>
where
    F: FnOnce(u32) + Send + 'static,
{
    fn detach(self: Box<Self>, reason: u32) {
        (self.hook)(reason)
    }

    fn matches(&self, token: &AttachToken) -> bool {
        *token == self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(AttachToken::new(), AttachToken::new());
    }

    #[test]
    fn exit_hook_receives_the_reason() {
        let seen = Arc::new(AtomicU32::new(0));
        let seen_by_hook = Arc::clone(&seen);

        let hook: Box<dyn Attachable> =
            Box::new(ExitHook::new(move |reason| seen_by_hook.store(reason, Ordering::SeqCst)));
        hook.detach(42);

        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn exit_hook_matches_only_its_own_token() {
        let hook = ExitHook::new(|_| {});
        let token = hook.token();

        assert!(hook.matches(&token));
        assert!(!hook.matches(&AttachToken::new()));
    }
}
