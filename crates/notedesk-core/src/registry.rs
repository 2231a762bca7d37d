//! Selector-based subscriptions to the state tree.
//!
//! Each subscriber registers a selector that picks an ordered dependency
//! sequence out of the tree, plus a callback. After every store mutation the
//! registry re-runs each selector and compares the result with the cached
//! sequence from the previous run, position by position:
//!
//! ```text
//! selector(tree) ──► [Slice, Slice, ...]
//!                       │      │
//!          cached ──► [Slice, Slice, ...]   same length, each position same?
//!                                            yes ─► skip
//!                                            no  ─► cache + callback(tree)
//! ```
//!
//! `Arc` slices compare by pointer identity, primitives by value. Because
//! the store shares every untouched subtree between successive trees, a
//! subscriber whose slice was not touched is never called.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::types::StateTree;

/// One positional element of a dependency sequence
#[derive(Clone)]
pub enum Slice {
    /// The selected value does not exist (e.g. no profile yet)
    Absent,
    /// A shared value, compared by pointer identity
    Ref(Arc<dyn Any + Send + Sync>),
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Slice {
    /// Slice compared by the identity of `value`.
    pub fn of<T: Send + Sync + 'static>(value: &Arc<T>) -> Self {
        Slice::Ref(value.clone())
    }

    /// Like [`Slice::of`], with `None` mapped to [`Slice::Absent`].
    pub fn opt<T: Send + Sync + 'static>(value: Option<&Arc<T>>) -> Self {
        value.map(Slice::of).unwrap_or(Slice::Absent)
    }

    /// Shallow equality: identity for shared values, value for primitives.
    pub fn same_as(&self, other: &Slice) -> bool {
        match (self, other) {
            (Slice::Absent, Slice::Absent) => true,
            (Slice::Ref(a), Slice::Ref(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            (Slice::Bool(a), Slice::Bool(b)) => a == b,
            (Slice::Int(a), Slice::Int(b)) => a == b,
            (Slice::Text(a), Slice::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slice::Absent => write!(f, "Absent"),
            Slice::Ref(a) => write!(f, "Ref({:p})", Arc::as_ptr(a) as *const ()),
            Slice::Bool(b) => write!(f, "Bool({})", b),
            Slice::Int(i) => write!(f, "Int({})", i),
            Slice::Text(s) => write!(f, "Text({:?})", s),
        }
    }
}

impl From<bool> for Slice {
    fn from(value: bool) -> Self {
        Slice::Bool(value)
    }
}

impl From<i64> for Slice {
    fn from(value: i64) -> Self {
        Slice::Int(value)
    }
}

impl From<usize> for Slice {
    fn from(value: usize) -> Self {
        Slice::Int(value as i64)
    }
}

impl From<&str> for Slice {
    fn from(value: &str) -> Self {
        Slice::Text(value.to_string())
    }
}

impl From<String> for Slice {
    fn from(value: String) -> Self {
        Slice::Text(value)
    }
}

/// Positional shallow comparison of two dependency sequences
pub fn same_dependencies(a: &[Slice], b: &[Slice]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
}

/// Extracts the dependency sequence a subscriber reacts to
pub type Selector = Arc<dyn Fn(&StateTree) -> Vec<Slice> + Send + Sync>;

/// Called with the new tree when a subscriber's dependencies change
pub type Callback = Arc<dyn Fn(&Arc<StateTree>) + Send + Sync>;

struct SubscriberCache {
    deps: Vec<Slice>,
    /// Notification epoch the cache was last evaluated at
    epoch: u64,
}

struct Subscriber {
    id: u64,
    selector: Selector,
    callback: Callback,
    cache: Mutex<SubscriberCache>,
    active: AtomicBool,
}

/// Registry of selector subscriptions
///
/// Callbacks are invoked with no registry lock held, so a callback may
/// mutate the store, subscribe, or unsubscribe. A notification triggered
/// from inside a callback supersedes the outer one: subscribers it has
/// already evaluated are skipped when the outer loop resumes, so nobody
/// is handed an older tree after a newer one.
pub struct SubscriptionRegistry {
    subscribers: RwLock<Vec<Arc<Subscriber>>>,
    next_id: AtomicU64,
    epoch: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            epoch: AtomicU64::new(0),
        })
    }

    /// Register a subscriber, evaluating its selector once against `tree`.
    pub fn subscribe(
        self: &Arc<Self>,
        tree: &StateTree,
        selector: Selector,
        callback: Callback,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deps = selector(tree);
        let subscriber = Arc::new(Subscriber {
            id,
            selector,
            callback,
            cache: Mutex::new(SubscriberCache {
                deps,
                epoch: self.epoch.load(Ordering::Acquire),
            }),
            active: AtomicBool::new(true),
        });

        let weak_subscriber = Arc::downgrade(&subscriber);
        self.subscribers.write().push(subscriber);
        tracing::debug!(subscriber = id, "Subscribed");

        Subscription {
            id,
            registry: Arc::downgrade(self),
            subscriber: weak_subscriber,
            released: AtomicBool::new(false),
        }
    }

    /// Re-evaluate every subscriber against `tree`, calling those whose
    /// dependencies changed, in subscription order.
    ///
    /// Returns how many callbacks fired.
    pub fn notify(&self, tree: &Arc<StateTree>) -> usize {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let subscribers: Vec<Arc<Subscriber>> = self.subscribers.read().clone();
        let mut fired = 0;

        for subscriber in subscribers {
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }

            let deps = (subscriber.selector)(tree);
            {
                let mut cache = subscriber.cache.lock();
                if cache.epoch > epoch {
                    continue;
                }
                cache.epoch = epoch;
                if same_dependencies(&cache.deps, &deps) {
                    continue;
                }
                cache.deps = deps;
            }

            // Unsubscribed by an earlier callback in this round
            if !subscriber.active.load(Ordering::Acquire) {
                continue;
            }
            (subscriber.callback)(tree);
            fired += 1;
        }

        tracing::trace!(epoch, fired, "Notified subscribers");
        fired
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.subscribers.write().retain(|s| s.id != id);
    }
}

/// Handle to a registered subscriber
///
/// Dropping the handle unsubscribes. [`Subscription::unsubscribe`] may be
/// called any number of times; only the first call has an effect.
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriptionRegistry>,
    subscriber: Weak<Subscriber>,
    released: AtomicBool,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(subscriber) = self.subscriber.upgrade() {
            subscriber.active.store(false, Ordering::Release);
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
        tracing::debug!(subscriber = self.id, "Unsubscribed");
    }

    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_callback(counter: &Arc<AtomicUsize>) -> Callback {
        let counter = counter.clone();
        Arc::new(move |_tree| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_slice_identity_vs_value() {
        let a = Arc::new(String::from("x"));
        let b = Arc::new(String::from("x"));
        assert!(Slice::of(&a).same_as(&Slice::of(&a.clone())));
        assert!(!Slice::of(&a).same_as(&Slice::of(&b)));
        assert!(Slice::from("x").same_as(&Slice::from(String::from("x"))));
        assert!(Slice::from(true).same_as(&Slice::Bool(true)));
        assert!(!Slice::Absent.same_as(&Slice::Bool(false)));
    }

    #[test]
    fn test_length_mismatch_is_a_change() {
        assert!(!same_dependencies(&[Slice::Absent], &[]));
        assert!(same_dependencies(&[], &[]));
    }

    #[test]
    fn test_unchanged_selector_skips_callback() {
        let registry = SubscriptionRegistry::new();
        let tree = Arc::new(StateTree::default());
        let counter = Arc::new(AtomicUsize::new(0));

        let _sub = registry.subscribe(
            &tree,
            Arc::new(|t: &StateTree| vec![Slice::of(&t.notes)]),
            counting_callback(&counter),
        );

        // New root, same notes map
        let next = Arc::new(StateTree {
            folders: Arc::new(Default::default()),
            ..(*tree).clone()
        });
        assert_eq!(registry.notify(&next), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let changed = Arc::new(StateTree {
            notes: Arc::new(Default::default()),
            ..(*next).clone()
        });
        assert_eq!(registry.notify(&changed), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let tree = StateTree::default();
        let counter = Arc::new(AtomicUsize::new(0));

        let sub = registry.subscribe(
            &tree,
            Arc::new(|_: &StateTree| vec![]),
            counting_callback(&counter),
        );
        let _other = registry.subscribe(
            &tree,
            Arc::new(|_: &StateTree| vec![]),
            counting_callback(&counter),
        );
        assert_eq!(registry.len(), 2);

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(registry.len(), 1);
        assert!(!sub.is_active());

        drop(sub);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_is_gone() {
        let registry = SubscriptionRegistry::new();
        let sub = registry.subscribe(
            &StateTree::default(),
            Arc::new(|_: &StateTree| vec![]),
            Arc::new(|_| {}),
        );
        drop(registry);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
