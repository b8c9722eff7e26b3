//! Ordered, bounded collection of the active domains.
//!
//! The registry owns no transform logic. Its one hard rule is that every
//! mutation clears the derived caches of the cache collaborator handed to
//! the mutating call, so no cached value outlives the domain set it was
//! computed from.

use std::collections::VecDeque;

use crate::engine::CacheStore;

use super::{Domain, DomainError, DomainId, DomainKind, DomainSpec, DomainVariant};

pub const DEFAULT_MAX_ACTIVE_DOMAINS: usize = 5;

#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: VecDeque<Domain>,
    capacity: usize,
    next_id: u64,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ACTIVE_DOMAINS)
    }
}

impl DomainRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry holding at most `capacity` domains (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            domains: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Builds and registers a domain, evicting the oldest entries first when
    /// the registry is full.
    ///
    /// Validation happens before eviction: a rejected request leaves the
    /// registry and the caches untouched.
    ///
    /// # Errors
    /// Returns [`DomainError`] when `spec` is invalid for `kind`.
    pub fn create(
        &mut self,
        kind: DomainKind,
        spec: &DomainSpec,
        cache: &mut dyn CacheStore,
    ) -> Result<DomainId, DomainError> {
        let variant = DomainVariant::build(kind, spec)?;

        self.evict_to(self.capacity - 1);

        let id = DomainId::new(self.next_id);
        self.next_id += 1;
        self.domains.push_back(Domain::new(id, variant));
        log::debug!("created {kind} {id} ({} active)", self.domains.len());

        invalidate(cache, "create");
        Ok(id)
    }

    /// Removes the domain with `id`. Returns `false` when it is not registered.
    pub fn remove(&mut self, id: DomainId, cache: &mut dyn CacheStore) -> bool {
        let Some(index) = self.domains.iter().position(|d| d.id() == id) else {
            return false;
        };
        self.domains.remove(index);
        log::debug!("removed {id} ({} active)", self.domains.len());
        invalidate(cache, "remove");
        true
    }

    pub fn clear(&mut self, cache: &mut dyn CacheStore) {
        self.domains.clear();
        log::debug!("cleared domain registry");
        invalidate(cache, "clear");
    }

    /// Changes the capacity; shrinking evicts the oldest domains.
    pub fn set_capacity(&mut self, capacity: usize, cache: &mut dyn CacheStore) {
        self.capacity = capacity.max(1);
        self.evict_to(self.capacity);
        invalidate(cache, "capacity");
    }

    fn evict_to(&mut self, max_len: usize) {
        while self.domains.len() > max_len {
            if let Some(evicted) = self.domains.pop_front() {
                log::debug!("evicted {} ({})", evicted.id(), evicted.kind());
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: DomainId) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id() == id)
    }

    /// Domains in registration order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Domain> + ExactSizeIterator {
        self.domains.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<DomainId> {
        self.domains.iter().map(Domain::id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

fn invalidate(cache: &mut dyn CacheStore, reason: &str) {
    cache.clear_all();
    log::debug!("derived caches invalidated ({reason})");
}
