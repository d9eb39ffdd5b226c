//! Identity Registry
//!
//! Two lookup tables pair every raw object with its reactive wrapper:
//!
//! - forward: raw ID → pair, answers "is there already a wrapper for this?"
//! - backward: wrapper ID → pair, answers "is this already a wrapper?"
//!
//! Both tables are keyed by [`ObjectId`], so two raw objects with equal
//! contents never share a wrapper.
//!
//! # Lifetime
//!
//! The registry holds weak references only. A wrapper keeps its raw target
//! alive, the caller keeps the wrapper alive, and once the wrapper is gone
//! the pair is dead. Dead pairs are dropped by [`IdentityRegistry::sweep`].
//!
//! The registry itself is not synchronized; the runtime keeps it behind a
//! mutex so that lookup and registration happen as one step.

use std::collections::HashMap;

use crate::object::{ObjectId, ObjectRef, WeakObjectRef};

#[derive(Debug, Clone)]
struct Pair {
    raw_id: ObjectId,
    wrapper_id: ObjectId,
    raw: WeakObjectRef,
    wrapper: WeakObjectRef,
}

impl Pair {
    /// A pair lives exactly as long as its wrapper.
    fn is_alive(&self) -> bool {
        self.wrapper.is_alive()
    }
}

/// Bidirectional raw ⇄ wrapper bookkeeping.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    forward: HashMap<ObjectId, Pair>,
    backward: HashMap<ObjectId, Pair>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `wrapper` is the reactive view of `raw`.
    ///
    /// The caller must have checked that neither object is registered. A
    /// dead pair still sitting in the tables for `raw` is replaced.
    pub fn register(&mut self, raw: &ObjectRef, wrapper: &ObjectRef) {
        debug_assert!(self.lookup_wrapper_for(raw).is_none(), "raw object already has a wrapper");
        debug_assert!(!self.is_known_wrapper(raw), "wrappers cannot be registered as raw");
        debug_assert!(!self.backward.contains_key(&wrapper.id()), "wrapper already registered");

        let pair = Pair {
            raw_id: raw.id(),
            wrapper_id: wrapper.id(),
            raw: raw.downgrade(),
            wrapper: wrapper.downgrade(),
        };

        if let Some(stale) = self.forward.insert(pair.raw_id, pair.clone()) {
            self.backward.remove(&stale.wrapper_id);
        }
        self.backward.insert(pair.wrapper_id, pair);
    }

    /// Find the live wrapper registered for `raw`.
    pub fn lookup_wrapper_for(&self, raw: &ObjectRef) -> Option<ObjectRef> {
        self.forward.get(&raw.id())?.wrapper.upgrade()
    }

    /// Whether `candidate` is a wrapper created through this registry.
    pub fn is_known_wrapper(&self, candidate: &ObjectRef) -> bool {
        self.backward.contains_key(&candidate.id())
    }

    /// The raw object behind `wrapper`, if it is a known wrapper.
    pub fn raw_of(&self, wrapper: &ObjectRef) -> Option<ObjectRef> {
        self.backward.get(&wrapper.id())?.raw.upgrade()
    }

    /// Drop every pair whose wrapper is gone. Returns the number of pairs
    /// removed.
    pub fn sweep(&mut self) -> usize {
        let dead: Vec<Pair> = self
            .forward
            .values()
            .filter(|pair| !pair.is_alive())
            .cloned()
            .collect();

        for pair in &dead {
            self.forward.remove(&pair.raw_id);
            self.backward.remove(&pair.wrapper_id);
        }
        dead.len()
    }

    /// Number of registered pairs, including dead ones not yet swept.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
