//! Single-slot prompt driven by continuations.
//!
//! The prompt collects one line of text at a time. Multi-field input is
//! built by chaining: the continuation for step one opens step two, and so
//! on. Which step the user is on is never stored anywhere; it is implied by
//! which continuation is installed.
//!
//! ```text
//!            set_content(title, label, k)
//!   Idle ─────────────────────────────────► AwaitingInput
//!    ▲                                        │        │
//!    │ cancel()                               │        │ confirm()
//!    └────────────────────────────────────────┘        ▼
//!    ▲                                             Resolving ── k(value)
//!    │        k returned without a new prompt          │
//!    └─────────────────────────────────────────────────┤
//!                      k called set_content again      │
//!             AwaitingInput ◄──────────────────────────┘
//! ```
//!
//! While a continuation runs the prompt stays visible, so chained steps
//! never flash through `Idle`.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// What to do with the value the user confirmed
pub type Continuation = Box<dyn FnOnce(String) + Send>;

/// Where the prompt is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Idle,
    AwaitingInput,
    /// A continuation is running
    Resolving,
}

/// Snapshot the rendering layer binds to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    pub visible: bool,
    pub title: String,
    pub label: String,
    pub input: String,
}

struct ModalState {
    phase: ModalPhase,
    title: String,
    label: String,
    input: String,
    continuation: Option<Continuation>,
    /// Bumped on every `set_content`
    generation: u64,
}

impl ModalState {
    fn view(&self) -> ModalView {
        ModalView {
            visible: self.phase != ModalPhase::Idle,
            title: self.title.clone(),
            label: self.label.clone(),
            input: self.input.clone(),
        }
    }

    fn reset(&mut self) {
        self.phase = ModalPhase::Idle;
        self.title.clear();
        self.label.clear();
        self.input.clear();
        self.continuation = None;
    }
}

struct ModalInner {
    state: Mutex<ModalState>,
    view: watch::Sender<ModalView>,
}

/// The one prompt shared by every view in a session
///
/// Cloning gives another handle to the same prompt.
///
/// # Example
///
/// ```
/// use notedesk_core::ContinuationModal;
///
/// let modal = ContinuationModal::new();
/// let chained = modal.clone();
/// modal.set_content("Add Key-Value", "Key", move |key| {
///     if key.is_empty() {
///         return;
///     }
///     chained.set_content("Add Key-Value", "Value", move |value| {
///         println!("{}::{}", key, value);
///     });
/// });
///
/// modal.set_input("status");
/// modal.confirm();
/// modal.set_input("done");
/// modal.confirm(); // prints status::done
/// ```
#[derive(Clone)]
pub struct ContinuationModal {
    inner: Arc<ModalInner>,
}

impl ContinuationModal {
    pub fn new() -> Self {
        let (view, _) = watch::channel(ModalView::default());
        Self {
            inner: Arc::new(ModalInner {
                state: Mutex::new(ModalState {
                    phase: ModalPhase::Idle,
                    title: String::new(),
                    label: String::new(),
                    input: String::new(),
                    continuation: None,
                    generation: 0,
                }),
                view,
            }),
        }
    }

    /// Show the prompt with an empty input.
    ///
    /// A continuation still pending from an earlier call is dropped and
    /// will never run.
    pub fn set_content<F>(&self, title: impl Into<String>, label: impl Into<String>, continuation: F)
    where
        F: FnOnce(String) + Send + 'static,
    {
        let view = {
            let mut state = self.inner.state.lock();
            if state.phase == ModalPhase::AwaitingInput && state.continuation.is_some() {
                tracing::debug!(title = %state.title, "Replacing pending prompt");
            }
            state.phase = ModalPhase::AwaitingInput;
            state.title = title.into();
            state.label = label.into();
            state.input.clear();
            state.continuation = Some(Box::new(continuation));
            state.generation += 1;
            state.view()
        };
        self.inner.view.send_replace(view);
    }

    /// Update the text the user has typed. Ignored unless awaiting input.
    pub fn set_input(&self, value: impl Into<String>) {
        let view = {
            let mut state = self.inner.state.lock();
            if state.phase != ModalPhase::AwaitingInput {
                return;
            }
            state.input = value.into();
            state.view()
        };
        self.inner.view.send_replace(view);
    }

    /// Hand the current input to the pending continuation.
    ///
    /// The continuation runs exactly once, also for empty input. Returns
    /// `false` when there was nothing to confirm.
    pub fn confirm(&self) -> bool {
        let (continuation, value, generation) = {
            let mut state = self.inner.state.lock();
            if state.phase != ModalPhase::AwaitingInput {
                return false;
            }
            let Some(continuation) = state.continuation.take() else {
                return false;
            };
            state.phase = ModalPhase::Resolving;
            (continuation, std::mem::take(&mut state.input), state.generation)
        };

        continuation(value);

        let view = {
            let mut state = self.inner.state.lock();
            // Still ours: nothing chained a new prompt or cancelled
            if state.phase != ModalPhase::Resolving || state.generation != generation {
                return true;
            }
            state.reset();
            state.view()
        };
        self.inner.view.send_replace(view);
        true
    }

    /// Close the prompt without running the continuation.
    pub fn cancel(&self) {
        let view = {
            let mut state = self.inner.state.lock();
            if state.phase == ModalPhase::Idle {
                return;
            }
            tracing::debug!(title = %state.title, "Prompt cancelled");
            state.reset();
            state.view()
        };
        self.inner.view.send_replace(view);
    }

    pub fn phase(&self) -> ModalPhase {
        self.inner.state.lock().phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase() != ModalPhase::Idle
    }

    /// Current snapshot
    pub fn view(&self) -> ModalView {
        self.inner.view.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<ModalView> {
        self.inner.view.subscribe()
    }
}

impl Default for ContinuationModal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContinuationModal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuationModal")
            .field("phase", &self.phase())
            .finish()
    }
}
