//! The application state tree and its serialized seed form.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Contact, Folder, FolderId, Note, NoteId, Preferences, UserProfile};

/// Aggregate root of everything the views render
///
/// Cloning a tree is cheap: every field is an `Arc`. The store never
/// mutates a tree in place; it swaps in a new root that shares all
/// untouched fields with the previous one.
#[derive(Debug, Clone, Default)]
pub struct StateTree {
    /// Absent until a profile is initialized
    pub user_profile: Option<Arc<UserProfile>>,
    pub notes: Arc<BTreeMap<NoteId, Arc<Note>>>,
    pub folders: Arc<BTreeMap<FolderId, Arc<Folder>>>,
}

impl StateTree {
    pub fn note(&self, id: &NoteId) -> Option<&Arc<Note>> {
        self.notes.get(id)
    }

    pub fn folder(&self, id: &FolderId) -> Option<&Arc<Folder>> {
        self.folders.get(id)
    }

    /// Folder a note is filed under.
    ///
    /// A note pointing at a folder that no longer exists is unfiled.
    pub fn folder_of(&self, note: &Note) -> Option<&Arc<Folder>> {
        note.folder_id.as_ref().and_then(|id| self.folders.get(id))
    }

    /// Contacts in display order; empty when there is no profile.
    pub fn contacts(&self) -> &[Arc<Contact>] {
        match &self.user_profile {
            Some(profile) => profile.contacts.as_slice(),
            None => &[],
        }
    }

    pub fn preferences(&self) -> Option<&Arc<Preferences>> {
        self.user_profile.as_ref().map(|p| &p.preferences)
    }

    pub fn ai_enabled(&self) -> bool {
        self.preferences().map(|p| p.ai_enabled).unwrap_or(false)
    }

    /// Folders sorted by name for option lists
    pub fn folders_by_name(&self) -> Vec<Arc<Folder>> {
        let mut folders: Vec<_> = self.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        folders
    }

    /// Notes, most recently updated first
    pub fn notes_by_recency(&self) -> Vec<Arc<Note>> {
        let mut notes: Vec<_> = self.notes.values().cloned().collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        notes
    }
}

/// Serialized starting point for a session's state tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSeed {
    #[serde(default)]
    pub profile: Option<ProfileSeed>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// Serialized form of a [`UserProfile`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSeed {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl StateSeed {
    /// Build a tree from the seed.
    ///
    /// Contacts with an empty or repeated pubkey are skipped, keeping the
    /// first occurrence, so the seeded tree satisfies the same rules the
    /// store enforces on `add_contact`.
    pub fn into_tree(self) -> StateTree {
        let user_profile = self.profile.map(|seed| {
            let mut seen = HashSet::new();
            let contacts = seed
                .contacts
                .into_iter()
                .map(|c| Contact::new(&c.pubkey, &c.alias))
                .filter(|c| {
                    if c.pubkey.is_empty() || !seen.insert(c.pubkey.clone()) {
                        tracing::warn!(pubkey = %c.pubkey, "Skipping invalid seeded contact");
                        return false;
                    }
                    true
                })
                .collect();
            Arc::new(UserProfile::new(contacts, seed.preferences))
        });

        let notes = self
            .notes
            .into_iter()
            .map(|n| (n.id.clone(), Arc::new(n)))
            .collect();
        let folders = self
            .folders
            .into_iter()
            .map(|f| (f.id.clone(), Arc::new(f)))
            .collect();

        StateTree {
            user_profile,
            notes: Arc::new(notes),
            folders: Arc::new(folders),
        }
    }

    /// Capture a tree back into its serialized form.
    pub fn from_tree(tree: &StateTree) -> Self {
        Self {
            profile: tree.user_profile.as_ref().map(|p| ProfileSeed {
                contacts: p.contacts.iter().map(|c| (**c).clone()).collect(),
                preferences: (*p.preferences).clone(),
            }),
            notes: tree.notes.values().map(|n| (**n).clone()).collect(),
            folders: tree.folders.values().map(|f| (**f).clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangling_folder_reference_is_unfiled() {
        let seed = StateSeed {
            folders: vec![Folder::new("f1", "Work")],
            notes: vec![
                Note::new("n1", "Filed").in_folder("f1"),
                Note::new("n2", "Dangling").in_folder("gone"),
            ],
            ..Default::default()
        };
        let tree = seed.into_tree();

        let filed = tree.note(&NoteId::from("n1")).unwrap();
        let dangling = tree.note(&NoteId::from("n2")).unwrap();
        assert_eq!(tree.folder_of(filed).unwrap().name, "Work");
        assert!(tree.folder_of(dangling).is_none());
    }

    #[test]
    fn test_seed_skips_invalid_contacts() {
        let seed = StateSeed {
            profile: Some(ProfileSeed {
                contacts: vec![
                    Contact::new("abc", "first"),
                    Contact::new("", "nobody"),
                    Contact::new("abc", "second"),
                    Contact::new("def", ""),
                ],
                preferences: Preferences { ai_enabled: true },
            }),
            ..Default::default()
        };
        let tree = seed.into_tree();

        let contacts = tree.contacts();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].alias, "first");
        assert_eq!(contacts[1].pubkey, "def");
        assert!(tree.ai_enabled());
    }

    #[test]
    fn test_no_profile_means_no_contacts() {
        let tree = StateTree::default();
        assert!(tree.contacts().is_empty());
        assert!(!tree.ai_enabled());
    }

    #[test]
    fn test_seed_json_shape() {
        let json = r#"{
            "profile": { "contacts": [{ "pubkey": "abc123" }], "preferences": { "ai_enabled": false } },
            "notes": [{ "id": "n1", "title": "Hello", "content": "**hi**", "folder_id": null }],
            "folders": [{ "id": "f1", "name": "Inbox" }]
        }"#;
        let seed: StateSeed = serde_json::from_str(json).unwrap();
        let tree = seed.into_tree();
        assert_eq!(tree.contacts()[0].alias, "");
        assert_eq!(tree.notes.len(), 1);

        let back = StateSeed::from_tree(&tree);
        assert_eq!(back.folders[0].name, "Inbox");
    }
}
