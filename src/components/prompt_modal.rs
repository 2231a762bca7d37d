//! Prompt Modal Component
//!
//! The one text prompt shared by every view. Content and visibility come
//! from the session's [`ContinuationModal`](notedesk_core::ContinuationModal).

use dioxus::prelude::*;
use notedesk_core::ModalView;

use crate::context::use_session;

#[component]
pub fn PromptModal() -> Element {
    let modal = use_session().modal;
    let mut view = use_signal(|| modal.view());

    {
        let modal = modal.clone();
        use_hook(move || {
            let mut rx = modal.watch();
            spawn(async move {
                while rx.changed().await.is_ok() {
                    let next: ModalView = rx.borrow_and_update().clone();
                    view.set(next);
                }
            });
        });
    }

    if !view.read().visible {
        return rsx! {};
    }
    let current = view.read().clone();

    let confirm = {
        let modal = modal.clone();
        move |_| {
            modal.confirm();
        }
    };
    let cancel = {
        let modal = modal.clone();
        move |_| modal.cancel()
    };
    let on_keydown = {
        let modal = modal.clone();
        move |evt: KeyboardEvent| match evt.key() {
            Key::Enter => {
                modal.confirm();
            }
            Key::Escape => modal.cancel(),
            _ => {}
        }
    };

    rsx! {
        div {
            class: "modal-overlay",
            onclick: cancel.clone(),

            div {
                class: "prompt-modal",
                onclick: move |e| e.stop_propagation(),

                h2 { class: "modal-title", "{current.title}" }

                label { class: "modal-label",
                    "{current.label}"
                    input {
                        class: "modal-input",
                        r#type: "text",
                        value: "{current.input}",
                        oninput: move |e| modal.set_input(e.value()),
                        onkeydown: on_keydown,
                        autofocus: true,
                    }
                }

                div { class: "modal-actions",
                    button { class: "btn-primary", onclick: confirm, "OK" }
                    button { class: "btn-secondary", onclick: cancel, "Cancel" }
                }
            }
        }
    }
}
