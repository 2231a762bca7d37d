//! The entity store: owner of the session's state tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  EntityStore (cheap clone, Arc inside)                       │
//! │  ├── state: RwLock<Arc<StateTree>>                           │
//! │  │   └── swapped wholesale on every mutation                 │
//! │  ├── write: Mutex<()>                                        │
//! │  │   └── serializes read-modify-swap of the tree             │
//! │  └── registry: SubscriptionRegistry                          │
//! │      └── notified synchronously after each swap              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A mutation builds new entity values, new containing collections and a
//! new root. Everything it did not touch is shared with the previous tree,
//! which keeps change detection in the registry down to pointer compares.
//!
//! Rejected mutations return a [`StoreError`]: the tree is left alone and
//! nobody is notified. Callers are expected to log and carry on.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;
use crate::registry::{Slice, Subscription, SubscriptionRegistry};
use crate::types::{
    Contact, Folder, FolderId, Note, NoteId, NotePatch, Preferences, StateTree, UserProfile,
};

struct StoreInner {
    state: RwLock<Arc<StateTree>>,
    write: Mutex<()>,
    registry: Arc<SubscriptionRegistry>,
}

/// Shared, explicitly constructed state container
///
/// Create one per session and hand clones to every component that needs
/// it. All clones observe the same tree.
///
/// # Example
///
/// ```
/// use notedesk_core::{Contact, EntityStore, StateTree, UserProfile};
///
/// let store = EntityStore::new(StateTree::default());
/// store.init_profile(UserProfile::default());
///
/// let _sub = store.subscribe(
///     |tree| vec![notedesk_core::Slice::opt(tree.user_profile.as_ref())],
///     |tree| println!("{} contacts", tree.contacts().len()),
/// );
/// store.add_contact(Contact::new("abc123", "")).unwrap();
/// ```
#[derive(Clone)]
pub struct EntityStore {
    inner: Arc<StoreInner>,
}

impl EntityStore {
    pub fn new(tree: StateTree) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Arc::new(tree)),
                write: Mutex::new(()),
                registry: SubscriptionRegistry::new(),
            }),
        }
    }

    /// Current snapshot; the same `Arc` until the next mutation.
    pub fn get_state(&self) -> Arc<StateTree> {
        self.inner.state.read().clone()
    }

    /// Register `callback` to run whenever the slices picked by `selector`
    /// change.
    pub fn subscribe<S, C>(&self, selector: S, callback: C) -> Subscription
    where
        S: Fn(&StateTree) -> Vec<Slice> + Send + Sync + 'static,
        C: Fn(&Arc<StateTree>) + Send + Sync + 'static,
    {
        let tree = self.get_state();
        self.inner
            .registry
            .subscribe(&tree, Arc::new(selector), Arc::new(callback))
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Apply `f` to the current tree and, if it produced a new tree, swap it
    /// in and notify subscribers before returning.
    fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&StateTree) -> Result<(Option<StateTree>, T), StoreError>,
    ) -> Result<T, StoreError> {
        let (next, output) = {
            let _guard = self.inner.write.lock();
            let current = self.get_state();
            match f(&current) {
                Ok((Some(tree), output)) => {
                    let tree = Arc::new(tree);
                    *self.inner.state.write() = tree.clone();
                    (Some(tree), output)
                }
                Ok((None, output)) => (None, output),
                Err(e) => {
                    tracing::warn!(op, error = %e, "Mutation rejected");
                    return Err(e);
                }
            }
        };

        if let Some(tree) = next {
            let fired = self.inner.registry.notify(&tree);
            tracing::trace!(op, fired, "Mutation applied");
        }
        Ok(output)
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    /// Install a profile, replacing any existing one.
    pub fn init_profile(&self, profile: UserProfile) {
        let _ = self.mutate("init_profile", |tree| {
            Ok((
                Some(StateTree {
                    user_profile: Some(Arc::new(profile)),
                    ..tree.clone()
                }),
                (),
            ))
        });
    }

    /// Install an empty profile unless one exists.
    pub fn ensure_profile(&self) {
        let _ = self.mutate("ensure_profile", |tree| {
            if tree.user_profile.is_some() {
                return Ok((None, ()));
            }
            Ok((
                Some(StateTree {
                    user_profile: Some(Arc::new(UserProfile::default())),
                    ..tree.clone()
                }),
                (),
            ))
        });
    }

    /// Toggle the AI capability flag. Setting the current value is a no-op.
    pub fn set_ai_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.mutate("set_ai_enabled", |tree| {
            let profile = tree.user_profile.as_ref().ok_or(StoreError::NoProfile)?;
            if profile.preferences.ai_enabled == enabled {
                return Ok((None, ()));
            }
            let mut preferences: Preferences = (*profile.preferences).clone();
            preferences.ai_enabled = enabled;
            let profile = UserProfile {
                preferences: Arc::new(preferences),
                contacts: profile.contacts.clone(),
            };
            tracing::info!(enabled, "AI controls toggled");
            Ok((Some(with_profile(tree, profile)), ()))
        })
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    /// Append a contact. Duplicate pubkeys are rejected.
    pub fn add_contact(&self, contact: Contact) -> Result<(), StoreError> {
        let contact = Contact::new(&contact.pubkey, &contact.alias);
        self.mutate("add_contact", |tree| {
            if contact.pubkey.is_empty() {
                return Err(StoreError::EmptyIdentifier("pubkey"));
            }
            let profile = tree.user_profile.as_ref().ok_or(StoreError::NoProfile)?;
            if profile.has_contact(&contact.pubkey) {
                return Err(StoreError::DuplicateContact(contact.pubkey.clone()));
            }

            let mut contacts = (*profile.contacts).clone();
            tracing::info!(pubkey = %contact.pubkey, "Contact added");
            contacts.push(Arc::new(contact));
            let profile = UserProfile {
                contacts: Arc::new(contacts),
                preferences: profile.preferences.clone(),
            };
            Ok((Some(with_profile(tree, profile)), ()))
        })
    }

    pub fn remove_contact(&self, pubkey: &str) -> Result<(), StoreError> {
        let pubkey = pubkey.trim();
        self.mutate("remove_contact", |tree| {
            if pubkey.is_empty() {
                return Err(StoreError::EmptyIdentifier("pubkey"));
            }
            let profile = tree.user_profile.as_ref().ok_or(StoreError::NoProfile)?;
            if !profile.has_contact(pubkey) {
                return Err(StoreError::ContactNotFound(pubkey.to_string()));
            }

            let contacts: Vec<_> = profile
                .contacts
                .iter()
                .filter(|c| c.pubkey != pubkey)
                .cloned()
                .collect();
            tracing::info!(pubkey, "Contact removed");
            let profile = UserProfile {
                contacts: Arc::new(contacts),
                preferences: profile.preferences.clone(),
            };
            Ok((Some(with_profile(tree, profile)), ()))
        })
    }

    pub fn update_contact_alias(&self, pubkey: &str, alias: &str) -> Result<(), StoreError> {
        let pubkey = pubkey.trim();
        self.mutate("update_contact_alias", |tree| {
            if pubkey.is_empty() {
                return Err(StoreError::EmptyIdentifier("pubkey"));
            }
            let profile = tree.user_profile.as_ref().ok_or(StoreError::NoProfile)?;
            if !profile.has_contact(pubkey) {
                return Err(StoreError::ContactNotFound(pubkey.to_string()));
            }

            let contacts: Vec<_> = profile
                .contacts
                .iter()
                .map(|c| {
                    if c.pubkey == pubkey {
                        Arc::new(Contact::new(pubkey, alias))
                    } else {
                        c.clone()
                    }
                })
                .collect();
            let profile = UserProfile {
                contacts: Arc::new(contacts),
                preferences: profile.preferences.clone(),
            };
            Ok((Some(with_profile(tree, profile)), ()))
        })
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Create an empty note, optionally filed under an existing folder.
    pub fn create_note(
        &self,
        title: &str,
        folder: Option<FolderId>,
    ) -> Result<NoteId, StoreError> {
        let title = match title.trim() {
            "" => "Untitled",
            t => t,
        };
        let mut note = Note::new(NoteId::generate(), title);
        note.folder_id = folder;
        self.add_note(note)
    }

    /// Insert a fully formed note. Its id must be new.
    pub fn add_note(&self, note: Note) -> Result<NoteId, StoreError> {
        self.mutate("add_note", |tree| {
            if note.id.as_str().trim().is_empty() {
                return Err(StoreError::EmptyIdentifier("note id"));
            }
            if tree.notes.contains_key(&note.id) {
                return Err(StoreError::DuplicateNote(note.id.to_string()));
            }
            if let Some(folder) = &note.folder_id {
                if !tree.folders.contains_key(folder) {
                    return Err(StoreError::FolderNotFound(folder.to_string()));
                }
            }

            let id = note.id.clone();
            let mut notes = (*tree.notes).clone();
            notes.insert(id.clone(), Arc::new(note));
            tracing::info!(note = %id, "Note created");
            Ok((
                Some(StateTree {
                    notes: Arc::new(notes),
                    ..tree.clone()
                }),
                id,
            ))
        })
    }

    /// Replace a note with a copy that has `patch` applied.
    pub fn update_note(&self, id: &NoteId, patch: NotePatch) -> Result<(), StoreError> {
        self.mutate("update_note", |tree| {
            if id.as_str().trim().is_empty() {
                return Err(StoreError::EmptyIdentifier("note id"));
            }
            if patch.is_empty() {
                return Err(StoreError::EmptyPatch(id.to_string()));
            }
            let note = tree
                .notes
                .get(id)
                .ok_or_else(|| StoreError::NoteNotFound(id.to_string()))?;
            if let Some(Some(folder)) = &patch.folder_id {
                if !tree.folders.contains_key(folder) {
                    return Err(StoreError::FolderNotFound(folder.to_string()));
                }
            }

            let mut notes = (*tree.notes).clone();
            notes.insert(id.clone(), Arc::new(note.patched(&patch)));
            tracing::debug!(note = %id, "Note updated");
            Ok((
                Some(StateTree {
                    notes: Arc::new(notes),
                    ..tree.clone()
                }),
                (),
            ))
        })
    }

    pub fn delete_note(&self, id: &NoteId) -> Result<(), StoreError> {
        self.mutate("delete_note", |tree| {
            if !tree.notes.contains_key(id) {
                return Err(StoreError::NoteNotFound(id.to_string()));
            }
            let mut notes = (*tree.notes).clone();
            notes.remove(id);
            tracing::info!(note = %id, "Note deleted");
            Ok((
                Some(StateTree {
                    notes: Arc::new(notes),
                    ..tree.clone()
                }),
                (),
            ))
        })
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    pub fn create_folder(&self, name: &str) -> Result<FolderId, StoreError> {
        let name = name.trim();
        self.mutate("create_folder", |tree| {
            if name.is_empty() {
                return Err(StoreError::EmptyIdentifier("folder name"));
            }
            let folder = Folder::new(FolderId::generate(), name);
            let id = folder.id.clone();
            let mut folders = (*tree.folders).clone();
            folders.insert(id.clone(), Arc::new(folder));
            tracing::info!(folder = %id, name, "Folder created");
            Ok((
                Some(StateTree {
                    folders: Arc::new(folders),
                    ..tree.clone()
                }),
                id,
            ))
        })
    }

    pub fn rename_folder(&self, id: &FolderId, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        self.mutate("rename_folder", |tree| {
            if name.is_empty() {
                return Err(StoreError::EmptyIdentifier("folder name"));
            }
            if !tree.folders.contains_key(id) {
                return Err(StoreError::FolderNotFound(id.to_string()));
            }
            let mut folders = (*tree.folders).clone();
            folders.insert(id.clone(), Arc::new(Folder::new(id.clone(), name)));
            Ok((
                Some(StateTree {
                    folders: Arc::new(folders),
                    ..tree.clone()
                }),
                (),
            ))
        })
    }

    /// Remove a folder. Notes filed under it are left as they are and
    /// read as unfiled from then on.
    pub fn remove_folder(&self, id: &FolderId) -> Result<(), StoreError> {
        self.mutate("remove_folder", |tree| {
            if !tree.folders.contains_key(id) {
                return Err(StoreError::FolderNotFound(id.to_string()));
            }
            let mut folders = (*tree.folders).clone();
            folders.remove(id);
            tracing::info!(folder = %id, "Folder removed");
            Ok((
                Some(StateTree {
                    folders: Arc::new(folders),
                    ..tree.clone()
                }),
                (),
            ))
        })
    }
}

fn with_profile(tree: &StateTree, profile: UserProfile) -> StateTree {
    StateTree {
        user_profile: Some(Arc::new(profile)),
        ..tree.clone()
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.get_state();
        f.debug_struct("EntityStore")
            .field("notes", &state.notes.len())
            .field("folders", &state.folders.len())
            .field("contacts", &state.contacts().len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_profile() -> EntityStore {
        let store = EntityStore::new(StateTree::default());
        store.init_profile(UserProfile::default());
        store
    }

    #[test]
    fn test_get_state_is_stable_between_mutations() {
        let store = store_with_profile();
        let a = store.get_state();
        let b = store.get_state();
        assert!(Arc::ptr_eq(&a, &b));

        store.add_contact(Contact::new("abc", "")).unwrap();
        assert!(!Arc::ptr_eq(&a, &store.get_state()));
    }

    #[test]
    fn test_add_contact_without_profile() {
        let store = EntityStore::new(StateTree::default());
        let err = store.add_contact(Contact::new("abc", "")).unwrap_err();
        assert_eq!(err, StoreError::NoProfile);
    }

    #[test]
    fn test_rejected_mutation_keeps_tree() {
        let store = store_with_profile();
        let before = store.get_state();
        assert!(store.add_contact(Contact::new("   ", "x")).is_err());
        assert!(Arc::ptr_eq(&before, &store.get_state()));
    }

    #[test]
    fn test_ensure_profile_is_noop_when_present() {
        let store = store_with_profile();
        let before = store.get_state();
        store.ensure_profile();
        assert!(Arc::ptr_eq(&before, &store.get_state()));
    }

    #[test]
    fn test_update_alias() {
        let store = store_with_profile();
        store.add_contact(Contact::new("abc", "")).unwrap();
        store.add_contact(Contact::new("def", "Dee")).unwrap();
        let untouched = store.get_state().contacts()[1].clone();

        store.update_contact_alias("abc", "Alice").unwrap();

        let state = store.get_state();
        assert_eq!(state.contacts()[0].alias, "Alice");
        assert!(Arc::ptr_eq(&state.contacts()[1], &untouched));
    }

    #[test]
    fn test_set_ai_enabled_same_value_is_noop() {
        let store = store_with_profile();
        let before = store.get_state();
        store.set_ai_enabled(false).unwrap();
        assert!(Arc::ptr_eq(&before, &store.get_state()));

        store.set_ai_enabled(true).unwrap();
        assert!(store.get_state().ai_enabled());
        assert!(Arc::ptr_eq(
            &before.user_profile.as_ref().unwrap().contacts,
            &store.get_state().user_profile.as_ref().unwrap().contacts
        ));
    }

    #[test]
    fn test_create_note_defaults_title() {
        let store = store_with_profile();
        let id = store.create_note("   ", None).unwrap();
        assert_eq!(store.get_state().note(&id).unwrap().title, "Untitled");
    }

    #[test]
    fn test_update_note_rejects_unknown_folder() {
        let store = store_with_profile();
        let id = store.create_note("Plans", None).unwrap();
        let err = store
            .update_note(&id, NotePatch::folder(Some(FolderId::from("nope"))))
            .unwrap_err();
        assert_eq!(err, StoreError::FolderNotFound("nope".to_string()));
    }

    #[test]
    fn test_update_note_rejects_empty_patch() {
        let store = store_with_profile();
        let id = store.create_note("Plans", None).unwrap();
        assert!(matches!(
            store.update_note(&id, NotePatch::default()),
            Err(StoreError::EmptyPatch(_))
        ));
    }

    #[test]
    fn test_remove_folder_leaves_notes_unfiled() {
        let store = store_with_profile();
        let folder = store.create_folder("Work").unwrap();
        let id = store.create_note("Plans", Some(folder.clone())).unwrap();

        store.remove_folder(&folder).unwrap();

        let state = store.get_state();
        let note = state.note(&id).unwrap();
        assert_eq!(note.folder_id, Some(folder));
        assert!(state.folder_of(note).is_none());
    }

    #[test]
    fn test_rename_folder() {
        let store = store_with_profile();
        let folder = store.create_folder("Wrok").unwrap();
        store.rename_folder(&folder, "Work").unwrap();
        assert_eq!(store.get_state().folder(&folder).unwrap().name, "Work");
        assert!(store.rename_folder(&folder, "").is_err());
    }

    #[test]
    fn test_delete_note() {
        let store = store_with_profile();
        let id = store.create_note("Plans", None).unwrap();
        store.delete_note(&id).unwrap();
        assert!(store.get_state().note(&id).is_none());
        assert!(matches!(
            store.delete_note(&id),
            Err(StoreError::NoteNotFound(_))
        ));
    }
}
