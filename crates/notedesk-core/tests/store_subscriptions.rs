//! Entity store and selector subscription tests
//!
//! ## What These Tests Verify
//!
//! - Subscribers fire only when their selected slices change identity
//! - Untouched subtrees are shared between successive trees
//! - Rejected mutations leave the tree alone and notify nobody
//! - Subscriptions survive re-entrant mutations and unsubscribe cleanly

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use notedesk_core::{
    Contact, EntityStore, Note, NoteId, NotePatch, Slice, StateTree, StoreError, UserProfile,
};

fn store_with_profile() -> EntityStore {
    let store = EntityStore::new(StateTree::default());
    store.init_profile(UserProfile::default());
    store
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&Arc<StateTree>) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (count, move |_: &Arc<StateTree>| {
        c.fetch_add(1, Ordering::SeqCst);
    })
}

/// Note edits never wake a contact-list subscriber.
#[test]
fn test_contact_subscriber_ignores_note_edits() {
    let store = store_with_profile();
    let id = store.create_note("Groceries", None).unwrap();

    let (fired, callback) = counter();
    let _sub = store.subscribe(|t| vec![Slice::opt(t.user_profile.as_ref())], callback);

    store
        .update_note(&id, NotePatch::content("milk, eggs"))
        .unwrap();
    store.create_folder("Errands").unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    store.add_contact(Contact::new("abc123", "")).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// Adding `{abc123, ""}` yields exactly one contact with an empty alias.
#[test]
fn test_add_contact_with_empty_alias() {
    let store = store_with_profile();
    store.add_contact(Contact::new("abc123", "")).unwrap();

    let state = store.get_state();
    assert_eq!(state.contacts().len(), 1);
    assert_eq!(state.contacts()[0].pubkey, "abc123");
    assert_eq!(state.contacts()[0].alias, "");
    assert_eq!(state.contacts()[0].display_label(), "abc123");

    assert_eq!(
        store.add_contact(Contact::new("abc123", "again")),
        Err(StoreError::DuplicateContact("abc123".to_string()))
    );
    assert_eq!(store.get_state().contacts().len(), 1);
}

/// Updating one note shares everything else with the previous tree.
#[test]
fn test_update_note_shares_untouched_subtrees() {
    let store = store_with_profile();
    let a = store.create_note("A", None).unwrap();
    let b = store.create_note("B", None).unwrap();
    store.create_folder("Work").unwrap();

    let before = store.get_state();
    store.update_note(&a, NotePatch::content("changed")).unwrap();
    let after = store.get_state();

    assert!(!Arc::ptr_eq(&before, &after));
    assert!(Arc::ptr_eq(
        before.user_profile.as_ref().unwrap(),
        after.user_profile.as_ref().unwrap()
    ));
    assert!(Arc::ptr_eq(&before.folders, &after.folders));
    assert!(Arc::ptr_eq(before.note(&b).unwrap(), after.note(&b).unwrap()));
    assert!(!Arc::ptr_eq(before.note(&a).unwrap(), after.note(&a).unwrap()));
    assert_eq!(after.note(&a).unwrap().content, "changed");
}

/// A rejected mutation keeps the same root and fires nothing.
#[test]
fn test_rejected_mutation_is_silent() {
    let store = store_with_profile();
    let (fired, callback) = counter();
    let _sub = store.subscribe(
        |t| vec![Slice::of(&t.notes), Slice::opt(t.user_profile.as_ref())],
        callback,
    );
    let before = store.get_state();

    assert!(store.add_contact(Contact::new("  ", "blank")).is_err());
    assert!(store
        .update_note(&NoteId::from("missing"), NotePatch::title("x"))
        .is_err());
    assert!(store.remove_contact("nobody").is_err());

    assert!(Arc::ptr_eq(&before, &store.get_state()));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

/// Unsubscribing twice is harmless and stops further callbacks.
#[test]
fn test_unsubscribe_is_idempotent() {
    let store = store_with_profile();
    let (fired, callback) = counter();
    let sub = store.subscribe(|t| vec![Slice::of(&t.notes)], callback);

    store.create_note("One", None).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_active());
    assert_eq!(store.subscriber_count(), 0);

    store.create_note("Two", None).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// A callback that mutates the store does not hand later subscribers an
/// older tree than the one they already saw.
#[test]
fn test_reentrant_mutation_delivers_latest_tree() {
    let store = store_with_profile();

    let writer = store.clone();
    let _filer = store.subscribe(
        |t| vec![Slice::of(&t.notes)],
        move |tree| {
            if tree.folders.is_empty() {
                writer.create_folder("Inbox").unwrap();
            }
        },
    );

    let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let _watcher = store.subscribe(
        |t| vec![Slice::of(&t.notes), Slice::of(&t.folders)],
        move |tree| s.lock().unwrap().push((tree.notes.len(), tree.folders.len())),
    );

    store.add_note(Note::new("n1", "First")).unwrap();

    // The nested notification already delivered the newest tree, so the
    // outer one skips the watcher
    assert_eq!(*seen.lock().unwrap(), vec![(1, 1)]);
}

/// Subscribing from inside a callback does not deadlock.
#[test]
fn test_subscribe_inside_callback() {
    let store = store_with_profile();
    let late: Arc<Mutex<Vec<notedesk_core::Subscription>>> = Arc::new(Mutex::new(Vec::new()));

    let inner_store = store.clone();
    let l = late.clone();
    let _sub = store.subscribe(
        |t| vec![Slice::from(t.notes.len())],
        move |_| {
            let sub = inner_store.subscribe(|t| vec![Slice::of(&t.folders)], |_| {});
            l.lock().unwrap().push(sub);
        },
    );

    store.create_note("One", None).unwrap();
    assert_eq!(store.subscriber_count(), 2);
}

/// Removing a folder leaves the note's reference dangling, which lookups
/// degrade to "no folder".
#[test]
fn test_dangling_folder_reference_degrades() {
    let store = store_with_profile();
    let folder = store.create_folder("Work").unwrap();
    let id = store.create_note("Plan", Some(folder.clone())).unwrap();

    store.remove_folder(&folder).unwrap();

    let state = store.get_state();
    let note = state.note(&id).unwrap();
    assert_eq!(note.folder_id.as_ref(), Some(&folder));
    assert!(state.folder_of(note).is_none());
}

/// Toggling AI to its current value is a no-op for subscribers.
#[test]
fn test_same_ai_value_does_not_notify() {
    let store = store_with_profile();
    let (fired, callback) = counter();
    let _sub = store.subscribe(|t| vec![Slice::opt(t.preferences())], callback);

    store.set_ai_enabled(false).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    store.set_ai_enabled(true).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
