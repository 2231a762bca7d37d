//! Binds one authoring engine to the note on display.
//!
//! ## Lifecycle
//!
//! ```text
//! mount(note) ──► subscribe [selected note, folders, preferences]
//!                   │
//!   store change ───┤
//!                   ├─ note id differs ──► destroy engine, create engine(content)
//!                   ├─ same id ──────────► refresh toolbar only
//!                   └─ no note ──────────► destroy engine
//!
//! engine change ──► pending write ──► store.update_note(id, content)
//!                   (flushed after the engine lock is released)
//! unmount / drop ─► destroy engine, release subscription
//! ```
//!
//! Every binding gets a fresh generation number. Prompt continuations and
//! AI results remember the generation they started under and are dropped
//! if the adapter has rebound or unmounted since.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::ai::AiService;
use crate::error::{EditorError, StoreError};
use crate::modal::ContinuationModal;
use crate::registry::{Slice, Subscription};
use crate::store::EntityStore;
use crate::types::{Folder, FolderId, Note, NoteId, NotePatch, StateTree};

use super::engine::{AuthoringEngine, CommandKind, EditorCommand, EngineFactory};
use super::markdown::normalize_tag;

type SharedEngine = Arc<Mutex<Box<dyn AuthoringEngine>>>;

/// Toolbar controls, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarControl {
    Bold,
    Italic,
    BulletList,
    OrderedList,
    AddTag,
    AddKeyValue,
    Undo,
    Redo,
    AutoTag,
    Summarize,
}

impl ToolbarControl {
    pub fn label(&self) -> &'static str {
        match self {
            ToolbarControl::Bold => "Bold",
            ToolbarControl::Italic => "Italic",
            ToolbarControl::BulletList => "Bullet List",
            ToolbarControl::OrderedList => "Numbered List",
            ToolbarControl::AddTag => "Add Tag",
            ToolbarControl::AddKeyValue => "Add Key-Value",
            ToolbarControl::Undo => "Undo",
            ToolbarControl::Redo => "Redo",
            ToolbarControl::AutoTag => "Auto-Tag",
            ToolbarControl::Summarize => "Summarize",
        }
    }

    /// Engine command behind a plain formatting control
    pub fn command(&self) -> Option<EditorCommand> {
        match self {
            ToolbarControl::Bold => Some(EditorCommand::ToggleBold),
            ToolbarControl::Italic => Some(EditorCommand::ToggleItalic),
            ToolbarControl::BulletList => Some(EditorCommand::ToggleBulletList),
            ToolbarControl::OrderedList => Some(EditorCommand::ToggleOrderedList),
            ToolbarControl::Undo => Some(EditorCommand::Undo),
            ToolbarControl::Redo => Some(EditorCommand::Redo),
            _ => None,
        }
    }
}

/// Entry in the folder picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOption {
    /// `None` is the "Unfiled" entry
    pub id: Option<FolderId>,
    pub name: String,
    pub selected: bool,
}

/// Affordances that follow store state without touching the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolbar {
    pub note_bound: bool,
    pub folder_options: Vec<FolderOption>,
    pub ai_controls_visible: bool,
}

impl Toolbar {
    /// Visible controls. AI controls are absent, not disabled, when the
    /// capability is off.
    pub fn controls(&self) -> Vec<ToolbarControl> {
        if !self.note_bound {
            return Vec::new();
        }
        let mut controls = vec![
            ToolbarControl::Bold,
            ToolbarControl::Italic,
            ToolbarControl::BulletList,
            ToolbarControl::OrderedList,
            ToolbarControl::AddTag,
            ToolbarControl::AddKeyValue,
            ToolbarControl::Undo,
            ToolbarControl::Redo,
        ];
        if self.ai_controls_visible {
            controls.push(ToolbarControl::AutoTag);
            controls.push(ToolbarControl::Summarize);
        }
        controls
    }

    pub fn selected_folder(&self) -> Option<&FolderOption> {
        self.folder_options.iter().find(|o| o.selected)
    }
}

/// What a [`EditorAdapter::sync`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// New engine for a different note
    Rebound,
    /// Same note; toolbar refreshed, engine kept
    Refreshed,
    /// Engine destroyed, no note selected
    Unbound,
    /// Nothing bound before or after
    Unchanged,
}

/// What an AI control invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOutcome {
    /// Result inserted with this many engine commands
    Applied(usize),
    Empty,
    Failed,
    /// Note changed while the request was in flight
    Stale,
    /// AI controls are hidden
    Unavailable,
    NotBound,
}

struct Binding {
    note_id: NoteId,
    instance: u64,
    generation: u64,
    engine: SharedEngine,
}

/// Latest engine content not yet written to the store
struct PendingWrite {
    generation: u64,
    note_id: NoteId,
    content: String,
}

struct AdapterShared {
    store: EntityStore,
    factory: Arc<dyn EngineFactory>,
    ai: Arc<dyn AiService>,
    modal: ContinuationModal,
    selected: RwLock<Option<NoteId>>,
    binding: Mutex<Option<Binding>>,
    toolbar: RwLock<Toolbar>,
    generation: AtomicU64,
    instances: AtomicU64,
    /// Engines retired while busy dispatching; destroyed once released
    deferred: Mutex<Vec<SharedEngine>>,
    pending: Mutex<Option<PendingWrite>>,
    /// Serializes write-backs across threads; re-entered by subscribers
    /// that dispatch while being notified
    write_back: ReentrantMutex<()>,
    subscription: Mutex<Option<Subscription>>,
}

impl AdapterShared {
    fn sync_from(self: &Arc<Self>, tree: &StateTree) -> SyncOutcome {
        let selected = self.selected.read().clone();
        let note = selected.as_ref().and_then(|id| tree.note(id)).cloned();
        self.sync(note.as_ref(), tree.folders_by_name(), tree.ai_enabled())
    }

    fn sync(
        self: &Arc<Self>,
        note: Option<&Arc<Note>>,
        folders: Vec<Arc<Folder>>,
        ai_enabled: bool,
    ) -> SyncOutcome {
        let outcome = {
            let mut binding = self.binding.lock();
            let current = binding.as_ref().map(|b| b.note_id.clone());
            match (current, note) {
                (Some(bound), Some(note)) if bound == note.id => SyncOutcome::Refreshed,
                (None, None) => SyncOutcome::Unchanged,
                (_, None) => {
                    self.generation.fetch_add(1, Ordering::AcqRel);
                    if let Some(old) = binding.take() {
                        self.retire(old);
                    }
                    SyncOutcome::Unbound
                }
                (_, Some(note)) => {
                    if let Some(old) = binding.take() {
                        self.retire(old);
                    }
                    *binding = Some(self.bind(note));
                    SyncOutcome::Rebound
                }
            }
        };

        self.refresh_toolbar(note.map(|n| &**n), &folders, ai_enabled);
        outcome
    }

    fn bind(self: &Arc<Self>, note: &Note) -> Binding {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let instance = self.instances.fetch_add(1, Ordering::AcqRel) + 1;

        let mut engine = self.factory.create(&note.content, CommandKind::ALL);

        // Runs under the engine lock, so only record the content here
        let note_id = note.id.clone();
        let weak: Weak<AdapterShared> = Arc::downgrade(self);
        engine.on_change(Box::new(move |content| {
            if let Some(shared) = weak.upgrade() {
                *shared.pending.lock() = Some(PendingWrite {
                    generation,
                    note_id: note_id.clone(),
                    content: content.to_string(),
                });
            }
        }));

        tracing::info!(note = %note.id, instance, "Editor engine created");
        Binding {
            note_id: note.id.clone(),
            instance,
            generation,
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    fn retire(&self, binding: Binding) {
        tracing::info!(
            note = %binding.note_id,
            instance = binding.instance,
            "Editor engine destroyed"
        );
        match binding.engine.try_lock() {
            Some(mut engine) => engine.destroy(),
            // Still dispatching on another thread
            None => self.deferred.lock().push(binding.engine.clone()),
        }
    }

    fn drain_deferred(&self) {
        let deferred: Vec<SharedEngine> = std::mem::take(&mut *self.deferred.lock());
        for engine in deferred {
            engine.lock().destroy();
        }
    }

    fn refresh_toolbar(&self, note: Option<&Note>, folders: &[Arc<Folder>], ai_enabled: bool) {
        let toolbar = match note {
            None => Toolbar::default(),
            Some(note) => {
                let filed_under = note
                    .folder_id
                    .as_ref()
                    .filter(|id| folders.iter().any(|f| &f.id == *id));

                let mut options = vec![FolderOption {
                    id: None,
                    name: "Unfiled".to_string(),
                    selected: filed_under.is_none(),
                }];
                options.extend(folders.iter().map(|f| FolderOption {
                    id: Some(f.id.clone()),
                    name: f.name.clone(),
                    selected: filed_under == Some(&f.id),
                }));

                Toolbar {
                    note_bound: true,
                    folder_options: options,
                    ai_controls_visible: ai_enabled,
                }
            }
        };
        *self.toolbar.write() = toolbar;
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.current_generation() != generation || self.binding.lock().is_none()
    }

    fn current(&self) -> Option<(u64, NoteId, SharedEngine)> {
        self.binding
            .lock()
            .as_ref()
            .map(|b| (b.generation, b.note_id.clone(), b.engine.clone()))
    }

    fn dispatch(&self, command: EditorCommand) -> Result<bool, EditorError> {
        let (_, _, engine) = self.current().ok_or(EditorError::NotBound)?;
        let result = engine.lock().dispatch(command);
        self.flush_write_back();
        self.drain_deferred();
        result
    }

    /// Write the latest engine content to the store. Must run with no
    /// engine lock held: subscribers notified by the write may read or
    /// drive the editor.
    fn flush_write_back(&self) {
        let _serial = self.write_back.lock();
        let Some(write) = self.pending.lock().take() else {
            return;
        };
        if self.is_stale(write.generation) {
            tracing::debug!(note = %write.note_id, "Dropping write-back for a stale note");
            return;
        }
        if let Err(e) = self
            .store
            .update_note(&write.note_id, NotePatch::content(write.content))
        {
            tracing::warn!(note = %write.note_id, error = %e, "Dropping editor write-back");
        }
    }

    /// Dispatch on behalf of something started under `generation`.
    fn dispatch_for(&self, generation: u64, command: EditorCommand) -> Option<bool> {
        if self.is_stale(generation) {
            tracing::debug!(command = command.name(), "Dropping command for a stale note");
            return None;
        }
        match self.dispatch(command) {
            Ok(changed) => Some(changed),
            Err(e) => {
                tracing::warn!(error = %e, "Editor command failed");
                None
            }
        }
    }

    fn unmount(&self) {
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        let old = self.binding.lock().take();
        if let Some(old) = old {
            self.retire(old);
        }
        *self.toolbar.write() = Toolbar::default();
    }
}

/// Owner of the authoring engine for the note editor
///
/// Dropping the adapter unmounts it.
pub struct EditorAdapter {
    shared: Arc<AdapterShared>,
}

impl EditorAdapter {
    pub fn new(
        store: EntityStore,
        factory: Arc<dyn EngineFactory>,
        ai: Arc<dyn AiService>,
        modal: ContinuationModal,
    ) -> Self {
        Self {
            shared: Arc::new(AdapterShared {
                store,
                factory,
                ai,
                modal,
                selected: RwLock::new(None),
                binding: Mutex::new(None),
                toolbar: RwLock::new(Toolbar::default()),
                generation: AtomicU64::new(0),
                instances: AtomicU64::new(0),
                deferred: Mutex::new(Vec::new()),
                pending: Mutex::new(None),
                write_back: ReentrantMutex::new(()),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Start following the store, showing `note_id`.
    pub fn mount(&self, note_id: Option<NoteId>) -> SyncOutcome {
        *self.shared.selected.write() = note_id;

        let mut subscription = self.shared.subscription.lock();
        if subscription.is_none() {
            let for_selector = Arc::downgrade(&self.shared);
            let for_callback = Arc::downgrade(&self.shared);
            *subscription = Some(self.shared.store.subscribe(
                move |tree| {
                    let selected = for_selector
                        .upgrade()
                        .and_then(|shared| shared.selected.read().clone());
                    let note = selected.as_ref().and_then(|id| tree.note(id));
                    vec![
                        Slice::from(selected.map(|id| id.to_string()).unwrap_or_default()),
                        Slice::opt(note),
                        Slice::of(&tree.folders),
                        Slice::opt(tree.preferences()),
                    ]
                },
                move |tree| {
                    if let Some(shared) = for_callback.upgrade() {
                        shared.sync_from(tree);
                    }
                },
            ));
        }
        drop(subscription);

        let state = self.shared.store.get_state();
        self.shared.sync_from(&state)
    }

    /// Show a different note (or none).
    pub fn select_note(&self, note_id: Option<NoteId>) -> SyncOutcome {
        *self.shared.selected.write() = note_id;
        let state = self.shared.store.get_state();
        self.shared.sync_from(&state)
    }

    /// Feed the adapter its inputs directly.
    ///
    /// A different note id rebuilds the engine from the note's content; the
    /// same id only refreshes the toolbar.
    pub fn sync(
        &self,
        note: Option<&Arc<Note>>,
        folders: Vec<Arc<Folder>>,
        ai_enabled: bool,
    ) -> SyncOutcome {
        *self.shared.selected.write() = note.map(|n| n.id.clone());
        self.shared.sync(note, folders, ai_enabled)
    }

    /// Destroy the engine and stop following the store.
    pub fn unmount(&self) {
        self.shared.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.subscription.lock().is_some()
    }

    pub fn bound_note(&self) -> Option<NoteId> {
        self.shared.current().map(|(_, id, _)| id)
    }

    /// Identity of the live engine instance, counting from 1
    pub fn engine_instance(&self) -> Option<u64> {
        self.shared.binding.lock().as_ref().map(|b| b.instance)
    }

    /// Engine content, which may be ahead of the store mid-dispatch
    pub fn content(&self) -> Option<String> {
        self.shared
            .current()
            .map(|(_, _, engine)| engine.lock().content())
    }

    pub fn toolbar(&self) -> Toolbar {
        self.shared.toolbar.read().clone()
    }

    pub fn dispatch(&self, command: EditorCommand) -> Result<bool, EditorError> {
        self.shared.dispatch(command)
    }

    /// Run a formatting control. Prompt and AI controls have their own
    /// entry points.
    pub fn run(&self, control: ToolbarControl) -> Result<bool, EditorError> {
        match control {
            ToolbarControl::AddTag => {
                self.request_tag();
                Ok(false)
            }
            ToolbarControl::AddKeyValue => {
                self.request_key_value();
                Ok(false)
            }
            other => match other.command() {
                Some(command) => self.dispatch(command),
                None => Err(EditorError::UnsupportedCommand(other.label())),
            },
        }
    }

    /// Run a formatting control over the char range selected in the
    /// editing surface.
    ///
    /// [`replace_content`](Self::replace_content) leaves the engine cursor
    /// at the end of the document.
    pub fn run_on(
        &self,
        control: ToolbarControl,
        selection: Range<usize>,
    ) -> Result<bool, EditorError> {
        self.dispatch(EditorCommand::Select {
            start: selection.start,
            end: selection.end,
        })?;
        self.run(control)
    }

    /// Text-area binding: replace the whole document.
    pub fn replace_content(&self, content: impl Into<String>) -> Result<bool, EditorError> {
        self.dispatch(EditorCommand::ReplaceAll(content.into()))
    }

    /// Prompt for one tag and insert it.
    pub fn request_tag(&self) {
        let generation = self.shared.current_generation();
        let weak = Arc::downgrade(&self.shared);
        self.shared.modal.set_content("Add Tag", "Tag", move |value| {
            if value.trim().is_empty() {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                shared.dispatch_for(generation, EditorCommand::InsertTag(value));
            }
        });
    }

    /// Prompt for a key, then a value, and insert `key::value`.
    ///
    /// Empty input at either step ends the flow without touching the
    /// document.
    pub fn request_key_value(&self) {
        let generation = self.shared.current_generation();
        let weak = Arc::downgrade(&self.shared);
        let modal = self.shared.modal.clone();
        self.shared
            .modal
            .set_content("Add Key-Value", "Key", move |key| {
                let key = key.trim().to_string();
                if key.is_empty() {
                    return;
                }
                modal.set_content("Add Key-Value", "Value", move |value| {
                    let value = value.trim();
                    if value.is_empty() {
                        return;
                    }
                    if let Some(shared) = weak.upgrade() {
                        shared.dispatch_for(
                            generation,
                            EditorCommand::InsertText(format!("{}::{}", key, value)),
                        );
                    }
                });
            });
    }

    /// Ask the AI collaborator for tags and insert them.
    pub async fn auto_tag(&self) -> AiOutcome {
        let shared = self.shared.clone();
        if !shared.toolbar.read().ai_controls_visible {
            return AiOutcome::Unavailable;
        }
        let Some((generation, note_id, engine)) = shared.current() else {
            return AiOutcome::NotBound;
        };
        let text = engine.lock().plain_text();
        drop(engine);

        let tags = match shared.ai.auto_tag(&text).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(note = %note_id, error = %e, "Auto-tag failed");
                return AiOutcome::Failed;
            }
        };
        let tags: Vec<String> = tags
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return AiOutcome::Empty;
        }
        if shared.is_stale(generation) {
            tracing::debug!(note = %note_id, "Discarding auto-tag result for a stale note");
            return AiOutcome::Stale;
        }

        let applied = tags
            .into_iter()
            .filter_map(|tag| shared.dispatch_for(generation, EditorCommand::InsertTag(tag)))
            .count();
        AiOutcome::Applied(applied)
    }

    /// Ask the AI collaborator for a summary and insert it as a block.
    pub async fn summarize(&self) -> AiOutcome {
        let shared = self.shared.clone();
        if !shared.toolbar.read().ai_controls_visible {
            return AiOutcome::Unavailable;
        }
        let Some((generation, note_id, engine)) = shared.current() else {
            return AiOutcome::NotBound;
        };
        let html = engine.lock().html();
        drop(engine);

        let summary = match shared.ai.summarize(&html).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                tracing::warn!(note = %note_id, error = %e, "Summarize failed");
                return AiOutcome::Failed;
            }
        };
        if summary.is_empty() {
            return AiOutcome::Empty;
        }
        if shared.is_stale(generation) {
            tracing::debug!(note = %note_id, "Discarding summary for a stale note");
            return AiOutcome::Stale;
        }

        match shared.dispatch_for(generation, EditorCommand::InsertContent(summary)) {
            Some(_) => AiOutcome::Applied(1),
            None => AiOutcome::Stale,
        }
    }

    /// Rename the bound note.
    pub fn set_title(&self, title: &str) -> Result<(), StoreError> {
        let note_id = self.require_note()?;
        self.shared.store.update_note(&note_id, NotePatch::title(title))
    }

    /// File the bound note under `folder`, or unfile it.
    pub fn assign_folder(&self, folder: Option<FolderId>) -> Result<(), StoreError> {
        let note_id = self.require_note()?;
        self.shared.store.update_note(&note_id, NotePatch::folder(folder))
    }

    fn require_note(&self) -> Result<NoteId, StoreError> {
        self.bound_note()
            .ok_or_else(|| StoreError::NoteNotFound("no note bound".to_string()))
    }
}

impl Drop for EditorAdapter {
    fn drop(&mut self) {
        self.shared.unmount();
    }
}

impl std::fmt::Debug for EditorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorAdapter")
            .field("note", &self.bound_note())
            .field("instance", &self.engine_instance())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
