//! Link Set
//!
//! Insertion-ordered, duplicate-free collection of linked peers. Peers are
//! compared by actor identity. A link set never contains its owning actor;
//! that guard lives with the callers in `cell`.

use crate::cell::ActorRef;

#[derive(Debug, Default)]
pub(crate) struct LinkSet {
    peers: Vec<ActorRef>,
}

impl LinkSet {
    /// Insert keeping uniqueness; true if a new link was added
    pub fn insert(&mut self, peer: ActorRef) -> bool {
        if self.peers.contains(&peer) {
            return false;
        }
        self.peers.push(peer);
        true
    }

    /// Remove every occurrence of `peer` rather than assuming at most one
    /// entry; returns how many were removed
    pub fn remove_all(&mut self, peer: &ActorRef) -> usize {
        let before = self.peers.len();
        self.peers.retain(|p| p != peer);
        before - self.peers.len()
    }

    pub fn contains(&self, peer: &ActorRef) -> bool {
        self.peers.contains(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorRef> {
        self.peers.iter()
    }

    /// Move the whole set out, leaving this one empty
    pub fn take(&mut self) -> Vec<ActorRef> {
        std::mem::take(&mut self.peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ActorCell;
    use crate::registry::ActorId;
    use proptest::prelude::*;

    fn new_ref() -> ActorRef {
        let (actor, _receiver) = ActorCell::new(ActorId::new());
        actor
    }

    #[test]
    fn insert_is_duplicate_free() {
        let mut set = LinkSet::default();
        let peer = new_ref();

        assert!(set.insert(peer.clone()));
        assert!(!set.insert(peer.clone()));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&peer));
    }

    #[test]
    fn remove_all_clears_every_occurrence() {
        let mut set = LinkSet::default();
        let a = new_ref();
        let b = new_ref();

        set.insert(a.clone());
        set.insert(b.clone());
        // Corrupted duplicate state, bypassing the unique insert.
        set.peers.push(a.clone());

        assert_eq!(set.remove_all(&a), 2);
        assert!(!set.contains(&a));
        assert!(set.contains(&b));
        assert_eq!(set.remove_all(&a), 0);
    }

    #[test]
    fn take_leaves_the_set_empty() {
        let mut set = LinkSet::default();
        let a = new_ref();
        let b = new_ref();
        set.insert(a.clone());
        set.insert(b.clone());

        let drained = set.take();
        assert_eq!(drained, vec![a, b]);
        assert_eq!(set.len(), 0);
    }

    proptest! {
        // Any interleaving of inserts and removals keeps the set an
        // insertion-ordered, duplicate-free subsequence of the model.
        #[test]
        fn mirrors_a_duplicate_free_model(
            ops in proptest::collection::vec((any::<bool>(), 0usize..4), 0..64),
        ) {
            let pool: Vec<ActorRef> = (0..4).map(|_| new_ref()).collect();
            let mut set = LinkSet::default();
            let mut model: Vec<usize> = Vec::new();

            for (is_insert, idx) in ops {
                if is_insert {
                    let added = set.insert(pool[idx].clone());
                    prop_assert_eq!(added, !model.contains(&idx));
                    if added {
                        model.push(idx);
                    }
                } else {
                    let removed = set.remove_all(&pool[idx]);
                    prop_assert_eq!(removed, usize::from(model.contains(&idx)));
                    model.retain(|i| *i != idx);
                }
            }

            let ids: Vec<ActorId> = set.iter().map(|p| p.id().clone()).collect();
            let expected: Vec<ActorId> = model.iter().map(|i| pool[*i].id().clone()).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
