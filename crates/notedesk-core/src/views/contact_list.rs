//! Contact list: rows, upward events, and the add-contact prompt chain.

use std::sync::Arc;

use crate::confirm::Confirmer;
use crate::modal::ContinuationModal;
use crate::registry::{Slice, Subscription};
use crate::store::EntityStore;
use crate::types::{Contact, StateTree};

/// Events a contact row sends to its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    Selected { pubkey: String },
    RemoveRequested { pubkey: String },
}

/// How the container handled a [`ContactEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Selected,
    Removed,
    /// The user said no; nothing changed
    Declined,
    /// The store rejected the removal
    Rejected,
}

/// One rendered contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub pubkey: String,
    pub label: String,
    pub has_alias: bool,
}

impl From<&Contact> for ContactRow {
    fn from(contact: &Contact) -> Self {
        Self {
            pubkey: contact.pubkey.clone(),
            label: contact.display_label(),
            has_alias: !contact.alias.is_empty(),
        }
    }
}

type SelectHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Container for the contact rows
pub struct ContactList {
    store: EntityStore,
    modal: ContinuationModal,
    confirmer: Arc<dyn Confirmer>,
    on_select: Option<SelectHandler>,
}

impl ContactList {
    pub fn new(store: EntityStore, modal: ContinuationModal, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            store,
            modal,
            confirmer,
            on_select: None,
        }
    }

    /// Navigation hook run for [`ContactEvent::Selected`].
    pub fn on_select(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Arc::new(handler));
        self
    }

    /// The list re-renders when the profile changes.
    pub fn selector(tree: &StateTree) -> Vec<Slice> {
        vec![Slice::opt(tree.user_profile.as_ref())]
    }

    pub fn rows(tree: &StateTree) -> Vec<ContactRow> {
        tree.contacts().iter().map(|c| ContactRow::from(&**c)).collect()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&Arc<StateTree>) + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(Self::selector, callback)
    }

    /// Handle an event from a row. Removal waits for confirmation and
    /// changes nothing unless the answer is yes.
    pub async fn handle(&self, event: ContactEvent) -> ContactOutcome {
        match event {
            ContactEvent::Selected { pubkey } => {
                tracing::debug!(pubkey = %pubkey, "Contact selected");
                if let Some(handler) = &self.on_select {
                    handler(&pubkey);
                }
                ContactOutcome::Selected
            }
            ContactEvent::RemoveRequested { pubkey } => {
                let label = self
                    .store
                    .get_state()
                    .contacts()
                    .iter()
                    .find(|c| c.pubkey == pubkey)
                    .map(|c| c.display_label())
                    .unwrap_or_else(|| pubkey.clone());
                let message = format!("Remove {} from your contacts?", label);

                if !self.confirmer.confirm_destructive(&message).await {
                    tracing::debug!(pubkey = %pubkey, "Contact removal declined");
                    return ContactOutcome::Declined;
                }
                match self.store.remove_contact(&pubkey) {
                    Ok(()) => ContactOutcome::Removed,
                    Err(_) => ContactOutcome::Rejected,
                }
            }
        }
    }

    /// Prompt for a public key, then an alias, then add the contact.
    ///
    /// An empty key ends the flow. An empty alias is fine.
    pub fn request_add_contact(&self) {
        let store = self.store.clone();
        let modal = self.modal.clone();
        self.modal.set_content("Add Contact", "Public key", move |pubkey| {
            let pubkey = pubkey.trim().to_string();
            if pubkey.is_empty() {
                return;
            }
            modal.set_content("Add Contact", "Alias", move |alias| {
                if let Err(e) = store.add_contact(Contact::new(&pubkey, &alias)) {
                    tracing::debug!(error = %e, "Contact not added");
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AlwaysConfirm;
    use crate::types::UserProfile;
    use std::sync::Mutex;

    #[test]
    fn test_rows_keep_insertion_order() {
        let store = EntityStore::new(StateTree::default());
        store.init_profile(UserProfile::default());
        store.add_contact(Contact::new("zzz", "Zed")).unwrap();
        store.add_contact(Contact::new("aaa", "")).unwrap();

        let rows = ContactList::rows(&store.get_state());
        assert_eq!(rows[0].label, "Zed");
        assert_eq!(rows[1].label, "aaa");
        assert!(!rows[1].has_alias);
    }

    #[tokio::test]
    async fn test_selected_forwards_to_handler() {
        let store = EntityStore::new(StateTree::default());
        let picked = Arc::new(Mutex::new(None));
        let p = picked.clone();
        let list = ContactList::new(store, ContinuationModal::new(), Arc::new(AlwaysConfirm))
            .on_select(move |pubkey| *p.lock().unwrap() = Some(pubkey.to_string()));

        let outcome = list
            .handle(ContactEvent::Selected {
                pubkey: "abc".into(),
            })
            .await;
        assert_eq!(outcome, ContactOutcome::Selected);
        assert_eq!(picked.lock().unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_remove_unknown_contact_is_rejected() {
        let store = EntityStore::new(StateTree::default());
        store.init_profile(UserProfile::default());
        let list = ContactList::new(store, ContinuationModal::new(), Arc::new(AlwaysConfirm));
        let outcome = list
            .handle(ContactEvent::RemoveRequested {
                pubkey: "ghost".into(),
            })
            .await;
        assert_eq!(outcome, ContactOutcome::Rejected);
    }
}
