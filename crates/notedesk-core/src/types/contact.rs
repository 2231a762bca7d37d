//! Contact entries kept in the user's profile.

use serde::{Deserialize, Serialize};

/// A contact known by its public key
///
/// The pubkey is opaque to NoteDesk. It is the identity key of the contact
/// within one profile; `alias` is an optional display label and is empty
/// when the user did not give one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub pubkey: String,
    #[serde(default)]
    pub alias: String,
}

impl Contact {
    /// Create a contact, trimming surrounding whitespace from both fields.
    pub fn new(pubkey: impl AsRef<str>, alias: impl AsRef<str>) -> Self {
        Self {
            pubkey: pubkey.as_ref().trim().to_string(),
            alias: alias.as_ref().trim().to_string(),
        }
    }

    /// Label shown in lists: the alias, or an abbreviated pubkey.
    pub fn display_label(&self) -> String {
        if !self.alias.is_empty() {
            return self.alias.clone();
        }
        abbreviate_key(&self.pubkey)
    }
}

/// Shorten long keys to `head…tail` for display.
pub fn abbreviate_key(key: &str) -> String {
    const KEEP: usize = 8;
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= KEEP * 2 + 1 {
        return key.to_string();
    }
    let head: String = chars[..KEEP].iter().collect();
    let tail: String = chars[chars.len() - KEEP..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label_prefers_alias() {
        let c = Contact::new("abc123", " Alice ");
        assert_eq!(c.alias, "Alice");
        assert_eq!(c.display_label(), "Alice");
    }

    #[test]
    fn test_display_label_abbreviates_long_keys() {
        let c = Contact::new("npub1qqqqqqqqqqqqqqqqqqqqqqqqqqzzzz", "");
        assert_eq!(c.display_label(), "npub1qqq…qqqqzzzz");
        assert_eq!(Contact::new("abc123", "").display_label(), "abc123");
    }
}
