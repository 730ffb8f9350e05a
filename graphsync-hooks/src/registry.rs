//! Ordered, concurrently mutable collections of hooks.
//!
//! Hooks are kept in a copy-on-write vector behind a single mutex. Taking a
//! [`Snapshot`] only clones a pointer, and registration or removal replaces
//! the vector if a snapshot is still alive. The lock is never held while a
//! hook runs, so hooks may register and unregister other hooks.
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Stable identity of a registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entries<H> {
    /// Identity of the next registration.
    next: u64,
    /// Registered hooks, in registration order.
    hooks: Arc<Vec<(HookId, H)>>,
}

fn lock<H>(entries: &Mutex<Entries<H>>) -> MutexGuard<'_, Entries<H>> {
    // SAFETY: We deliberately propagate panics from other threads holding the lock.
    // Hooks never run under it.
    #[allow(clippy::unwrap_used)]
    entries.lock().unwrap()
}

/// Removal of a registration by identity.
trait Remove: Send + Sync {
    fn remove(&self, id: HookId) -> bool;
}

impl<H: Clone + Send + Sync> Remove for Mutex<Entries<H>> {
    fn remove(&self, id: HookId) -> bool {
        let mut entries = lock(self);
        let Some(ix) = entries.hooks.iter().position(|(i, _)| *i == id) else {
            return false;
        };
        Arc::make_mut(&mut entries.hooks).remove(ix);

        true
    }
}

/// A collection of hooks of one kind.
pub struct Registry<H> {
    kind: &'static str,
    entries: Arc<Mutex<Entries<H>>>,
}

impl<H> Clone for Registry<H> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            entries: self.entries.clone(),
        }
    }
}

impl<H> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("len", &lock(&self.entries).hooks.len())
            .finish()
    }
}

impl<H: Clone + Send + Sync + 'static> Registry<H> {
    /// Create an empty registry. The `kind` is only used for logging.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: Arc::new(Mutex::new(Entries {
                next: 0,
                hooks: Arc::new(Vec::new()),
            })),
        }
    }

    /// Add a hook after all currently registered hooks.
    pub fn register(&self, hook: H) -> Unregister {
        let id = {
            let mut entries = lock(&self.entries);
            let id = HookId(entries.next);

            entries.next += 1;
            Arc::make_mut(&mut entries.hooks).push((id, hook));
            id
        };
        log::debug!(target: "hooks", "Registered {} hook {id}", self.kind);

        let registry: Weak<Mutex<Entries<H>>> = Arc::downgrade(&self.entries);
        let registry: Weak<dyn Remove> = registry;
        Unregister {
            id,
            kind: self.kind,
            registry,
        }
    }

    /// The hooks registered at this point in time, in registration order.
    pub fn snapshot(&self) -> Snapshot<H> {
        Snapshot(lock(&self.entries).hooks.clone())
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        lock(&self.entries).hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Point-in-time view of a [`Registry`].
pub struct Snapshot<H>(Arc<Vec<(HookId, H)>>);

impl<H> Snapshot<H> {
    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.0.iter().map(|(_, h)| h)
    }

    /// Identities of the hooks, in order.
    pub fn ids(&self) -> impl Iterator<Item = HookId> + '_ {
        self.0.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Capability removing one registration.
///
/// Dropping it leaves the hook registered. Removing is idempotent, and does
/// nothing once the registry itself is gone.
pub struct Unregister {
    id: HookId,
    kind: &'static str,
    registry: Weak<dyn Remove>,
}

impl Unregister {
    /// Identity of the registration this removes.
    pub fn id(&self) -> HookId {
        self.id
    }

    /// Remove the hook. Returns `true` if this call removed it.
    pub fn unregister(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.remove(self.id);
        if removed {
            log::debug!(target: "hooks", "Unregistered {} hook {}", self.kind, self.id);
        }
        removed
    }
}

impl fmt::Debug for Unregister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unregister")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;
    use pretty_assertions::assert_eq;
    use qcheck_macros::quickcheck;

    fn values(snapshot: &Snapshot<u8>) -> Vec<u8> {
        snapshot.iter().copied().collect()
    }

    #[quickcheck]
    fn prop_registration_order(hooks: Vec<u8>) {
        let registry = Registry::new("test");
        for h in hooks.iter() {
            registry.register(*h);
        }
        let snapshot = registry.snapshot();

        assert_eq!(values(&snapshot), hooks);
        assert!(snapshot.ids().zip(snapshot.ids().skip(1)).all(|(a, b)| a < b));
    }

    #[quickcheck]
    fn prop_remove_by_identity(hooks: Vec<u8>, remove: Vec<bool>) {
        let registry = Registry::new("test");
        let handles = hooks
            .iter()
            .map(|h| registry.register(*h))
            .collect::<Vec<_>>();
        let mut expected = Vec::new();

        for (i, (h, handle)) in hooks.iter().zip(handles.iter()).enumerate() {
            if remove.get(i).copied().unwrap_or(false) {
                assert!(handle.unregister());
            } else {
                expected.push(*h);
            }
        }
        assert_eq!(values(&registry.snapshot()), expected);
    }

    #[test]
    fn test_snapshot_isolation() {
        let registry = Registry::new("test");
        let a = registry.register(1u8);
        registry.register(2);

        let before = registry.snapshot();
        a.unregister();
        registry.register(3);

        assert_eq!(values(&before), vec![1, 2]);
        assert_eq!(values(&registry.snapshot()), vec![2, 3]);
    }

    #[test]
    fn test_unregister_idempotent() {
        let registry = Registry::new("test");
        let a = registry.register(1u8);
        let _b = registry.register(2);

        assert!(a.unregister());
        assert!(!a.unregister());
        assert_eq!(values(&registry.snapshot()), vec![2]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_after_drop() {
        let registry = Registry::new("test");
        let a = registry.register(1u8);

        drop(registry);
        assert!(!a.unregister());
    }

    #[test]
    fn test_identical_hooks() {
        let registry = Registry::new("test");
        let a = registry.register(7u8);
        let b = registry.register(7u8);

        assert_ne!(a.id(), b.id());
        assert!(b.unregister());
        assert_eq!(values(&registry.snapshot()), vec![7]);
        assert_eq!(registry.snapshot().ids().collect::<Vec<_>>(), vec![a.id()]);
    }

    #[test]
    fn test_concurrent_register() {
        let registry = Registry::new("test");
        let threads = (0..8u8)
            .map(|t| {
                let registry = registry.clone();
                thread::spawn(move || {
                    (0..64u8)
                        .map(|_| registry.register(t))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        let handles = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(registry.len(), 8 * 64);
        for h in handles.iter() {
            assert!(h.unregister());
        }
        assert!(registry.is_empty());
    }
}
