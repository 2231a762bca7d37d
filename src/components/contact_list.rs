//! Contact List Component
//!
//! Sidebar section listing the profile's contacts.

use std::rc::Rc;
use std::sync::Arc;

use dioxus::prelude::*;
use notedesk_core::{ContactEvent, ContactList, ContactOutcome};

use crate::components::ContactItem;
use crate::confirm::DialogConfirm;
use crate::context::{use_session, use_store_view};

/// Contact list container
///
/// Owns the event handling for its rows: selection is forwarded through
/// `on_select`, removal asks for confirmation first.
#[component]
pub fn ContactListPanel(
    /// Currently selected pubkey
    selected: ReadOnlySignal<Option<String>>,
    on_select: EventHandler<String>,
) -> Element {
    let session = use_session();
    let list = use_hook(|| {
        Rc::new(ContactList::new(
            session.store.clone(),
            session.modal.clone(),
            Arc::new(DialogConfirm),
        ))
    });
    let rows = use_store_view(ContactList::selector, ContactList::rows);

    let handle_event = {
        let list = list.clone();
        move |event: ContactEvent| {
            let list = list.clone();
            spawn(async move {
                let pubkey = match &event {
                    ContactEvent::Selected { pubkey } | ContactEvent::RemoveRequested { pubkey } => {
                        pubkey.clone()
                    }
                };
                if list.handle(event).await == ContactOutcome::Selected {
                    on_select.call(pubkey);
                }
            });
        }
    };

    let add_contact = move |_| list.request_add_contact();

    rsx! {
        section { class: "sidebar-section",
            header { class: "sidebar-header",
                h2 { "Contacts" }
                button {
                    class: "icon-btn",
                    title: "Add contact",
                    onclick: add_contact,
                    "+"
                }
            }

            if rows.read().is_empty() {
                p { class: "empty-state", "No contacts yet" }
            } else {
                ul { class: "contact-list",
                    for row in rows.read().iter().cloned() {
                        ContactItem {
                            key: "{row.pubkey}",
                            selected: selected.read().as_deref() == Some(row.pubkey.as_str()),
                            row: row.clone(),
                            on_event: handle_event.clone(),
                        }
                    }
                }
            }
        }
    }
}
