//! The signed-in user's profile.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Contact;

/// User preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Shows the AI-backed toolbar controls (auto-tag, summarize)
    #[serde(default)]
    pub ai_enabled: bool,
}

/// Profile of the user owning this session
///
/// Contacts are kept in insertion order, which is also display order.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub contacts: Arc<Vec<Arc<Contact>>>,
    pub preferences: Arc<Preferences>,
}

impl UserProfile {
    pub fn new(contacts: Vec<Contact>, preferences: Preferences) -> Self {
        Self {
            contacts: Arc::new(contacts.into_iter().map(Arc::new).collect()),
            preferences: Arc::new(preferences),
        }
    }

    pub fn contact(&self, pubkey: &str) -> Option<&Arc<Contact>> {
        self.contacts.iter().find(|c| c.pubkey == pubkey)
    }

    pub fn has_contact(&self, pubkey: &str) -> bool {
        self.contact(pubkey).is_some()
    }
}
