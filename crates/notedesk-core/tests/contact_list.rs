//! Contact list view-model tests
//!
//! ## What These Tests Verify
//!
//! - Removal waits for confirmation and does nothing on "no"
//! - The add-contact prompt chain validates the key and accepts an empty alias
//! - Rows follow the store through the list's own subscription

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notedesk_core::{
    Confirmer, Contact, ContactEvent, ContactList, ContactOutcome, ContinuationModal, EntityStore,
    NeverConfirm, StateTree, UserProfile,
};

/// Confirmer that records each question and gives a fixed answer
struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirm {
    async fn confirm_destructive(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

fn seeded_store() -> EntityStore {
    let store = EntityStore::new(StateTree::default());
    store.init_profile(UserProfile::new(
        vec![Contact::new("abc123", "Ana"), Contact::new("def456", "")],
        Default::default(),
    ));
    store
}

/// Declining the confirmation changes nothing and notifies nobody.
#[tokio::test]
async fn test_declined_removal_is_a_no_op() {
    let store = seeded_store();
    let confirm = ScriptedConfirm::new(false);
    let list = ContactList::new(store.clone(), ContinuationModal::new(), confirm.clone());

    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    let _sub = list.subscribe(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    let before = store.get_state();

    let outcome = list
        .handle(ContactEvent::RemoveRequested {
            pubkey: "abc123".into(),
        })
        .await;

    assert_eq!(outcome, ContactOutcome::Declined);
    assert!(Arc::ptr_eq(&before, &store.get_state()));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(*confirm.asked.lock().unwrap(), vec!["Remove Ana from your contacts?"]);
}

#[tokio::test]
async fn test_confirmed_removal_removes_once() {
    let store = seeded_store();
    let list = ContactList::new(
        store.clone(),
        ContinuationModal::new(),
        ScriptedConfirm::new(true),
    );

    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    let _sub = list.subscribe(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = list
        .handle(ContactEvent::RemoveRequested {
            pubkey: "abc123".into(),
        })
        .await;

    assert_eq!(outcome, ContactOutcome::Removed);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let rows = ContactList::rows(&store.get_state());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pubkey, "def456");
}

/// The bundled "no" confirmer never lets a removal through.
#[tokio::test]
async fn test_never_confirm() {
    let store = seeded_store();
    let list = ContactList::new(store.clone(), ContinuationModal::new(), Arc::new(NeverConfirm));
    let outcome = list
        .handle(ContactEvent::RemoveRequested {
            pubkey: "def456".into(),
        })
        .await;
    assert_eq!(outcome, ContactOutcome::Declined);
    assert_eq!(store.get_state().contacts().len(), 2);
}

/// Key `abc123` with an empty alias adds exactly one contact.
#[test]
fn test_add_contact_prompt_chain() {
    let store = EntityStore::new(StateTree::default());
    store.ensure_profile();
    let modal = ContinuationModal::new();
    let list = ContactList::new(store.clone(), modal.clone(), ScriptedConfirm::new(true));

    list.request_add_contact();
    assert_eq!(modal.view().label, "Public key");
    modal.set_input("  abc123 ");
    modal.confirm();
    assert_eq!(modal.view().label, "Alias");
    modal.confirm();

    let state = store.get_state();
    assert_eq!(state.contacts().len(), 1);
    assert_eq!(state.contacts()[0].pubkey, "abc123");
    assert_eq!(state.contacts()[0].alias, "");
    assert!(!modal.is_visible());
}

#[test]
fn test_add_contact_empty_key_aborts() {
    let store = EntityStore::new(StateTree::default());
    store.ensure_profile();
    let modal = ContinuationModal::new();
    let list = ContactList::new(store.clone(), modal.clone(), ScriptedConfirm::new(true));

    list.request_add_contact();
    modal.set_input("   ");
    modal.confirm();

    assert!(!modal.is_visible());
    assert!(store.get_state().contacts().is_empty());
}

/// A duplicate key entered through the prompt is rejected by the store.
#[test]
fn test_add_contact_duplicate_is_ignored() {
    let store = seeded_store();
    let modal = ContinuationModal::new();
    let list = ContactList::new(store.clone(), modal.clone(), ScriptedConfirm::new(true));

    list.request_add_contact();
    modal.set_input("abc123");
    modal.confirm();
    modal.set_input("Other");
    modal.confirm();

    let state = store.get_state();
    assert_eq!(state.contacts().len(), 2);
    assert_eq!(state.contacts()[0].alias, "Ana");
}

#[test]
fn test_rows_follow_subscription() {
    let store = seeded_store();
    let list = ContactList::new(store.clone(), ContinuationModal::new(), ScriptedConfirm::new(true));

    let rendered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let r = rendered.clone();
    let _sub = list.subscribe(move |tree| {
        *r.lock().unwrap() = ContactList::rows(tree).into_iter().map(|row| row.label).collect();
    });

    store.update_contact_alias("def456", "Dee").unwrap();
    assert_eq!(*rendered.lock().unwrap(), vec!["Ana", "Dee"]);
}
