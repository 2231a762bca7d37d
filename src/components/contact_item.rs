//! Contact Item Component
//!
//! One row of the contact list.

use dioxus::prelude::*;
use notedesk_core::views::ContactRow;
use notedesk_core::ContactEvent;

/// Contact row with select and remove actions
///
/// # Example
///
/// ```rust
/// rsx! {
///     ContactItem {
///         row: row.clone(),
///         selected: false,
///         on_event: move |event| { /* forward to the container */ },
///     }
/// }
/// ```
#[component]
pub fn ContactItem(
    row: ContactRow,
    #[props(default = false)]
    selected: bool,
    on_event: EventHandler<ContactEvent>,
) -> Element {
    let select_key = row.pubkey.clone();
    let remove_key = row.pubkey.clone();
    let label_class = if row.has_alias { "contact-label" } else { "contact-label contact-label--key" };

    rsx! {
        li {
            class: if selected { "contact-item contact-item--selected" } else { "contact-item" },
            title: "{row.pubkey}",
            onclick: move |_| on_event.call(ContactEvent::Selected { pubkey: select_key.clone() }),

            span { class: label_class, "{row.label}" }

            button {
                class: "icon-btn icon-btn--danger",
                title: "Remove contact",
                onclick: move |e| {
                    e.stop_propagation();
                    on_event.call(ContactEvent::RemoveRequested { pubkey: remove_key.clone() });
                },
                "×"
            }
        }
    }
}
