//! Global CSS styles for NoteDesk.
//!
//! Quiet paper-and-ink palette: a sidebar for lists, a wide editor pane.

pub const GLOBAL_STYLES: &str = r#"
/* === CSS Custom Properties === */
:root {
  --paper: #fbfaf7;
  --paper-dim: #f1efe9;
  --rule: #dedad0;
  --ink: #22211f;
  --ink-soft: rgba(34, 33, 31, 0.7);
  --ink-muted: rgba(34, 33, 31, 0.45);
  --accent: #2f6f8f;
  --accent-soft: rgba(47, 111, 143, 0.12);
  --ai: #7a5bb0;
  --danger: #b3413a;

  --font-sans: 'Inter', 'Segoe UI', system-ui, sans-serif;
  --font-mono: 'JetBrains Mono', 'SF Mono', 'Consolas', monospace;

  --text-xs: 0.75rem;
  --text-sm: 0.875rem;
  --text-base: 1rem;
  --text-lg: 1.25rem;

  --transition-fast: 150ms ease;
}

/* === Global Reset === */
*, *::before, *::after {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-sans);
  background: var(--paper);
  color: var(--ink);
  line-height: 1.6;
  height: 100vh;
  overflow: hidden;
}

button {
  font: inherit;
  cursor: pointer;
}

/* === Layout === */
.app-shell {
  display: grid;
  grid-template-columns: 280px 1fr;
  height: 100vh;
}

.sidebar {
  border-right: 1px solid var(--rule);
  background: var(--paper-dim);
  overflow-y: auto;
  padding: 1rem 0.75rem;
}

.main-pane {
  display: flex;
  flex-direction: column;
  min-width: 0;
  overflow: hidden;
}

.status-bar {
  font-size: var(--text-xs);
  color: var(--ink-muted);
  padding: 0.25rem 1rem;
  border-top: 1px solid var(--rule);
}

/* === Sidebar sections === */
.sidebar-section + .sidebar-section {
  margin-top: 1.5rem;
}

.sidebar-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 0.5rem;
}

.sidebar-header h2 {
  font-size: var(--text-xs);
  letter-spacing: 0.08em;
  text-transform: uppercase;
  color: var(--ink-soft);
}

.sidebar-actions {
  display: flex;
  gap: 0.25rem;
}

.empty-state {
  font-size: var(--text-sm);
  color: var(--ink-muted);
  padding: 0.25rem 0.5rem;
}

.contact-list, .note-list {
  list-style: none;
}

.contact-item, .note-item {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 0.5rem;
  padding: 0.35rem 0.5rem;
  border-radius: 6px;
  cursor: pointer;
  transition: background var(--transition-fast);
}

.contact-item:hover, .note-item:hover {
  background: var(--accent-soft);
}

.contact-item--selected, .note-item--selected {
  background: var(--accent-soft);
  box-shadow: inset 3px 0 0 var(--accent);
}

.contact-label--key {
  font-family: var(--font-mono);
  font-size: var(--text-sm);
}

.note-title {
  overflow: hidden;
  text-overflow: ellipsis;
  white-space: nowrap;
}

.note-folder {
  font-size: var(--text-xs);
  color: var(--ink-muted);
}

.icon-btn {
  border: none;
  background: transparent;
  color: var(--ink-soft);
  width: 1.6rem;
  height: 1.6rem;
  border-radius: 4px;
}

.icon-btn:hover {
  background: var(--rule);
}

.icon-btn:disabled {
  opacity: 0.3;
  cursor: default;
}

.icon-btn--danger:hover {
  color: var(--danger);
}

/* === Editor === */
.editor-empty {
  margin: auto;
  color: var(--ink-muted);
}

.note-editor {
  display: flex;
  flex-direction: column;
  height: 100%;
  padding: 1rem 1.5rem 0;
}

.note-header {
  display: flex;
  gap: 0.75rem;
  align-items: center;
}

.note-title-input {
  flex: 1;
  font-size: var(--text-lg);
  font-weight: 600;
  border: none;
  background: transparent;
  color: var(--ink);
  outline: none;
}

.folder-select {
  border: 1px solid var(--rule);
  border-radius: 4px;
  background: var(--paper);
  padding: 0.2rem 0.4rem;
}

.md-toolbar {
  display: flex;
  flex-wrap: wrap;
  gap: 0.25rem;
  margin: 0.75rem 0 0.5rem;
}

.md-btn {
  border: 1px solid var(--rule);
  background: var(--paper);
  color: var(--ink);
  padding: 0.2rem 0.6rem;
  border-radius: 4px;
  font-size: var(--text-sm);
}

.md-btn:hover {
  border-color: var(--accent);
}

.md-btn--active {
  background: var(--accent-soft);
  border-color: var(--accent);
}

.md-btn--ai {
  color: var(--ai);
  border-color: var(--ai);
}

.md-btn:disabled {
  opacity: 0.5;
}

.note-meta {
  display: flex;
  flex-wrap: wrap;
  gap: 0.35rem;
  margin-bottom: 0.5rem;
}

.tag-chip, .property-chip {
  font-size: var(--text-xs);
  padding: 0.05rem 0.5rem;
  border-radius: 999px;
  background: var(--accent-soft);
  color: var(--accent);
}

.property-chip {
  background: var(--paper-dim);
  color: var(--ink-soft);
  font-family: var(--font-mono);
}

.md-content {
  display: flex;
  flex: 1;
  gap: 1rem;
  min-height: 0;
  padding-bottom: 1rem;
}

.md-pane {
  flex: 1;
  min-width: 0;
  overflow-y: auto;
}

.md-pane--full {
  flex: 1 1 100%;
}

.md-textarea {
  width: 100%;
  height: 100%;
  resize: none;
  border: 1px solid var(--rule);
  border-radius: 6px;
  padding: 0.75rem;
  font-family: var(--font-mono);
  font-size: var(--text-sm);
  background: var(--paper);
  color: var(--ink);
}

.md-pane--preview {
  border-left: 1px solid var(--rule);
  padding-left: 1rem;
}

.markdown-body p,
.markdown-body ul,
.markdown-body ol {
  margin-bottom: 0.75rem;
}

.markdown-body ul,
.markdown-body ol {
  padding-left: 1.25rem;
}

/* === Modal === */
.modal-overlay {
  position: fixed;
  inset: 0;
  background: rgba(34, 33, 31, 0.35);
  display: flex;
  align-items: center;
  justify-content: center;
  z-index: 100;
}

.prompt-modal {
  background: var(--paper);
  border-radius: 10px;
  padding: 1.25rem 1.5rem;
  width: min(420px, 90vw);
  box-shadow: 0 12px 40px rgba(0, 0, 0, 0.18);
}

.modal-title {
  font-size: var(--text-base);
  margin-bottom: 0.75rem;
}

.modal-label {
  display: flex;
  flex-direction: column;
  gap: 0.35rem;
  font-size: var(--text-sm);
  color: var(--ink-soft);
}

.modal-input {
  border: 1px solid var(--rule);
  border-radius: 6px;
  padding: 0.45rem 0.6rem;
  font: inherit;
  color: var(--ink);
}

.modal-input:focus {
  outline: 2px solid var(--accent-soft);
  border-color: var(--accent);
}

.modal-actions {
  display: flex;
  justify-content: flex-end;
  gap: 0.5rem;
  margin-top: 1rem;
}

.btn-primary, .btn-secondary {
  border-radius: 6px;
  padding: 0.35rem 0.9rem;
  border: 1px solid var(--accent);
}

.btn-primary {
  background: var(--accent);
  color: white;
}

.btn-secondary {
  background: transparent;
  color: var(--accent);
}
"#;
