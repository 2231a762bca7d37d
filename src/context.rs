//! Session context for NoteDesk.
//!
//! The session is built in `main` and handed to the launcher as root
//! context. Components reach the store, the shared prompt and the AI
//! collaborator through `use_session`, and store subscriptions are bridged
//! into signals here.
//!
//! ## Usage
//!
//! ```ignore
//! // In child components
//! let session = use_session();
//! let rows = use_store_view(ContactList::selector, ContactList::rows);
//! ```

use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use notedesk_core::{
    AiService, ContinuationModal, EntityStore, KeywordAi, NoteDeskResult,
    SessionConfig, Slice, StateTree,
};
use tokio::sync::mpsc;

/// Everything a window shares across its components
#[derive(Clone)]
pub struct Session {
    pub store: EntityStore,
    pub modal: ContinuationModal,
    pub ai: Arc<dyn AiService>,
    pub config: SessionConfig,
}

impl Session {
    pub fn open(config: SessionConfig) -> NoteDeskResult<Self> {
        Ok(Self {
            store: config.open_store()?,
            modal: ContinuationModal::new(),
            ai: Arc::new(KeywordAi::default()),
            config,
        })
    }
}

/// Hook to access the session from context.
pub fn use_session() -> Session {
    use_context::<Session>()
}

/// Subscribe to the store for the lifetime of the component.
///
/// Store callbacks can run on any thread, so trees are handed to the
/// component's task through a channel before touching signals.
fn use_store_bridge(
    selector: fn(&StateTree) -> Vec<Slice>,
    mut on_tree: impl FnMut(Arc<StateTree>) + 'static,
) {
    let store = use_session().store;
    use_hook(move || {
        let (tx, mut rx) = mpsc::unbounded_channel::<Arc<StateTree>>();
        let subscription = store.subscribe(selector, move |tree| {
            let _ = tx.send(tree.clone());
        });
        spawn(async move {
            while let Some(tree) = rx.recv().await {
                on_tree(tree);
            }
        });
        Rc::new(subscription)
    });
}

/// Signal holding `project(tree)`, refreshed whenever `selector`'s slices
/// change.
pub fn use_store_view<T: Clone + PartialEq + 'static>(
    selector: fn(&StateTree) -> Vec<Slice>,
    project: fn(&StateTree) -> T,
) -> ReadOnlySignal<T> {
    let store = use_session().store;
    let mut value = use_signal(move || project(&store.get_state()));
    use_store_bridge(selector, move |tree| {
        let next = project(&tree);
        if *value.peek() != next {
            value.set(next);
        }
    });
    value.into()
}

/// Counter bumped whenever `selector`'s slices change. Read it to
/// re-render on store changes that live outside signals.
pub fn use_store_tick(selector: fn(&StateTree) -> Vec<Slice>) -> ReadOnlySignal<u64> {
    let mut tick = use_signal(|| 0u64);
    use_store_bridge(selector, move |_| tick += 1);
    tick.into()
}
