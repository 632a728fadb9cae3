//! Identifier allocation
//!
//! Identifiers are owned by the document that issues them. Relationship
//! ids are opaque random strings so that relationship sets merged from a
//! cloned archive do not collide; comments, bookmarks, numbering and styles
//! use the first free integer key.

use std::collections::BTreeSet;

/// Source of opaque relationship identifiers
#[derive(Debug, Clone)]
pub struct IdAllocator {
    rng: fastrand::Rng,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Allocator seeded from the process entropy source
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Deterministic allocator, for reproducible output and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Split off an independent allocator, deterministic if this one is
    pub fn fork(&mut self) -> Self {
        Self {
            rng: self.rng.fork(),
        }
    }

    /// Next identifier that `taken` does not already claim
    pub fn next_unique(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let candidate = format!("rId{:08x}", self.rng.u32(..));
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}

/// "First available integer" allocator
#[derive(Debug, Clone, Default)]
pub struct KeyAllocator {
    start: u32,
    taken: BTreeSet<u32>,
}

impl KeyAllocator {
    /// Allocator whose first key is `start`
    pub fn starting_at(start: u32) -> Self {
        Self {
            start,
            taken: BTreeSet::new(),
        }
    }

    /// Claim and return the lowest free key
    pub fn next(&mut self) -> u32 {
        let mut key = self.start;
        for &taken in self.taken.range(self.start..) {
            if taken != key {
                break;
            }
            key += 1;
        }
        self.taken.insert(key);
        key
    }

    /// Mark a key as used; returns `false` if it already was
    pub fn claim(&mut self, key: u32) -> bool {
        self.taken.insert(key)
    }

    /// Whether a key is in use
    pub fn contains(&self, key: u32) -> bool {
        self.taken.contains(&key)
    }

    /// Free a key for reuse
    pub fn release(&mut self, key: u32) {
        self.taken.remove(&key);
    }
}
