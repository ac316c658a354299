// ── Generic reactive entity collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{EntityId, ListEntity};

/// A lock-free, reactive collection for a single entity kind.
///
/// Uses `DashMap` for O(1) concurrent lookups keyed by [`EntityId`]
/// (pending and assigned ids share one keyspace, so an optimistic record
/// is addressable the moment it exists). Every mutation rebuilds the
/// sorted snapshot that subscribers receive.
pub(crate) struct EntityCollection<T: ListEntity> {
    by_id: DashMap<EntityId, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: ListEntity> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or update an entity under its own id. Returns `true` if
    /// the id was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let id = entity.id();
        let is_new = self.by_id.insert(id, Arc::new(entity)).is_none();

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Swap a record keyed under `old_id` for `entity` (keyed under its
    /// own, usually newly assigned, id). Exactly one record results even
    /// if the two ids differ.
    pub(crate) fn replace(&self, old_id: &EntityId, entity: T) {
        self.by_id.remove(old_id);
        self.by_id.insert(entity.id(), Arc::new(entity));
        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Look up an entity by id.
    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Return all current ids in the collection.
    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.by_id.iter().map(|r| *r.key()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a sorted snapshot vec and broadcast to
    /// subscribers. Sort order: the entity's own sort key where it has
    /// one (display position, publish date), then id -- deterministic
    /// even for kinds with no explicit ordering field.
    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| {
            let ka = (a.sort_key(), a.id());
            let kb = (b.sort_key(), b.id());
            ka.cmp(&kb)
        });
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Faq;

    fn faq(id: EntityId, position: i32) -> Faq {
        Faq {
            id,
            question: format!("q-{id}"),
            answer: String::new(),
            visible: true,
            position,
        }
    }

    #[test]
    fn upsert_returns_true_for_new_id() {
        let col: EntityCollection<Faq> = EntityCollection::new();
        assert!(col.upsert(faq(EntityId::Assigned(1), 0)));
        assert!(!col.upsert(faq(EntityId::Assigned(1), 1)));
    }

    #[test]
    fn remove_returns_the_entity() {
        let col: EntityCollection<Faq> = EntityCollection::new();
        col.upsert(faq(EntityId::Assigned(1), 0));

        let removed = col.remove(&EntityId::Assigned(1)).unwrap();
        assert_eq!(removed.id, EntityId::Assigned(1));
        assert!(col.get(&EntityId::Assigned(1)).is_none());
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn replace_swaps_pending_for_assigned() {
        let col: EntityCollection<Faq> = EntityCollection::new();
        let pending = EntityId::Pending(3);
        col.upsert(faq(pending, 0));

        col.replace(&pending, faq(EntityId::Assigned(10), 0));

        assert_eq!(col.len(), 1);
        assert!(col.get(&pending).is_none());
        assert!(col.get(&EntityId::Assigned(10)).is_some());
    }

    #[test]
    fn snapshot_is_sorted_by_position_then_id() {
        let col: EntityCollection<Faq> = EntityCollection::new();
        col.upsert(faq(EntityId::Assigned(3), 2));
        col.upsert(faq(EntityId::Assigned(1), 5));
        col.upsert(faq(EntityId::Assigned(2), 2));

        let snap = col.snapshot();
        let ids: Vec<_> = snap.iter().map(|f| f.id).collect();
        assert_eq!(
            ids,
            vec![
                EntityId::Assigned(2),
                EntityId::Assigned(3),
                EntityId::Assigned(1)
            ]
        );
    }

    #[test]
    fn subscribers_see_mutations() {
        let col: EntityCollection<Faq> = EntityCollection::new();
        let rx = col.subscribe();
        col.upsert(faq(EntityId::Assigned(1), 0));
        assert_eq!(rx.borrow().len(), 1);
    }
}
