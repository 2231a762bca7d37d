//! Markdown-backed authoring engine.
//!
//! Documents are stored as markdown text with a selection and an undo
//! history. Formatting commands edit the markdown directly:
//!
//! | Command | Markdown |
//! |---|---|
//! | bold | `**text**` |
//! | italic | `_text_` |
//! | bullet list | `- ` line prefix |
//! | ordered list | `1. ` line prefix |
//! | tag | `#tag` |
//! | key-value | `key::value` |

use std::ops::Range;

use pulldown_cmark::{html, Event, Options, Parser, TagEnd};

use crate::error::EditorError;

use super::engine::{AuthoringEngine, ChangeCallback, CommandKind, EditorCommand, EngineFactory};

const MAX_UNDO: usize = 100;

fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES
}

/// Render markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, parser_options()));
    out
}

/// Strip markdown down to its text, one line per block.
pub fn to_plain_text(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}

/// Normalize a user- or AI-supplied tag: no leading `#`, inner whitespace
/// collapsed to `-`. Empty when nothing usable is left.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('#')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Tags (`#word`) appearing in a document, in order, without repeats.
///
/// Markdown headings (`# Title`) are not tags.
pub fn extract_tags(markdown: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in markdown.split_whitespace() {
        let Some(rest) = word.strip_prefix('#') else {
            continue;
        };
        let tag: String = rest.chars().take_while(|c| is_tag_char(*c)).collect();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// `key::value` pairs appearing in a document, in order.
pub fn extract_key_values(markdown: &str) -> Vec<(String, String)> {
    markdown
        .split_whitespace()
        .filter_map(|word| {
            let (key, value) = word.split_once("::")?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[derive(Clone)]
struct Snapshot {
    text: String,
    selection: Range<usize>,
}

/// Markdown buffer implementing [`AuthoringEngine`]
///
/// The selection is kept as byte offsets on char boundaries. A new engine
/// puts the cursor at the end of its initial content.
pub struct MarkdownEngine {
    text: String,
    selection: Range<usize>,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    extensions: Vec<CommandKind>,
    listeners: Vec<ChangeCallback>,
    destroyed: bool,
}

impl MarkdownEngine {
    pub fn new(initial_content: &str, extensions: &[CommandKind]) -> Self {
        let end = initial_content.len();
        Self {
            text: initial_content.to_string(),
            selection: end..end,
            undo: Vec::new(),
            redo: Vec::new(),
            extensions: extensions.to_vec(),
            listeners: Vec::new(),
            destroyed: false,
        }
    }

    /// Current selection in chars
    pub fn selection(&self) -> Range<usize> {
        self.char_index(self.selection.start)..self.char_index(self.selection.end)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn char_index(&self, byte: usize) -> usize {
        self.text[..byte].chars().count()
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.selection = snapshot.selection;
    }

    /// Apply an edit, recording undo history, and report whether the text
    /// changed.
    fn edit(&mut self, f: impl FnOnce(&mut Self)) -> bool {
        let before = self.snapshot();
        f(self);
        if self.text == before.text {
            return false;
        }
        self.undo.push(before);
        if self.undo.len() > MAX_UNDO {
            self.undo.remove(0);
        }
        self.redo.clear();
        true
    }

    fn replace_selection(&mut self, replacement: &str) {
        let Range { start, end } = self.selection.clone();
        self.text.replace_range(start..end, replacement);
        let cursor = start + replacement.len();
        self.selection = cursor..cursor;
    }

    fn toggle_wrap(&mut self, marker: &str) {
        let Range { start, end } = self.selection.clone();
        let m = marker.len();

        if start == end {
            self.text.insert_str(start, &format!("{marker}{marker}"));
            self.selection = start + m..start + m;
            return;
        }

        let wrapped = self.text[..start].ends_with(marker) && self.text[end..].starts_with(marker);
        if wrapped {
            self.text.replace_range(end..end + m, "");
            self.text.replace_range(start - m..start, "");
            self.selection = start - m..end - m;
        } else {
            self.text.insert_str(end, marker);
            self.text.insert_str(start, marker);
            self.selection = start + m..end + m;
        }
    }

    /// Byte ranges of the lines touched by the selection
    fn selected_lines(&self) -> Range<usize> {
        let start = self.text[..self.selection.start]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = self.text[self.selection.end..]
            .find('\n')
            .map(|i| i + self.selection.end)
            .unwrap_or(self.text.len());
        start..end
    }

    fn toggle_list(&mut self, ordered: bool) {
        let block = self.selected_lines();
        let lines: Vec<&str> = self.text[block.clone()].split('\n').collect();

        let already = lines.iter().all(|line| {
            if ordered {
                ordered_prefix_len(line).is_some()
            } else {
                line.starts_with("- ")
            }
        });

        let rewritten: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let body = strip_list_prefix(line);
                if already {
                    body.to_string()
                } else if ordered {
                    format!("{}. {}", i + 1, body)
                } else {
                    format!("- {}", body)
                }
            })
            .collect();
        let rewritten = rewritten.join("\n");

        let start = block.start;
        self.text.replace_range(block, &rewritten);
        self.selection = start..start + rewritten.len();
    }

    fn insert_tag(&mut self, tag: &str) {
        let before = &self.text[..self.selection.start];
        let lead = if before.is_empty() || before.ends_with(char::is_whitespace) {
            ""
        } else {
            " "
        };
        self.replace_selection(&format!("{lead}#{tag} "));
    }

    fn insert_block(&mut self, content: &str) {
        let before = &self.text[..self.selection.start];
        let lead = if before.is_empty() || before.ends_with("\n\n") {
            ""
        } else if before.ends_with('\n') {
            "\n"
        } else {
            "\n\n"
        };
        self.replace_selection(&format!("{lead}{}\n", content.trim_end()));
    }

    fn notify(&mut self) {
        let text = self.text.clone();
        for listener in self.listeners.iter_mut() {
            listener(&text);
        }
    }
}

fn ordered_prefix_len(line: &str) -> Option<usize> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        Some(digits + 2)
    } else {
        None
    }
}

fn strip_list_prefix(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix("- ") {
        return rest;
    }
    match ordered_prefix_len(line) {
        Some(n) => &line[n..],
        None => line,
    }
}

impl AuthoringEngine for MarkdownEngine {
    fn content(&self) -> String {
        self.text.clone()
    }

    fn on_change(&mut self, callback: ChangeCallback) {
        if !self.destroyed {
            self.listeners.push(callback);
        }
    }

    fn dispatch(&mut self, command: EditorCommand) -> Result<bool, EditorError> {
        if self.destroyed {
            return Err(EditorError::Destroyed);
        }
        if !self.extensions.contains(&command.kind()) {
            return Err(EditorError::UnsupportedCommand(command.name()));
        }

        let changed = match command {
            EditorCommand::ToggleBold => self.edit(|e| e.toggle_wrap("**")),
            EditorCommand::ToggleItalic => self.edit(|e| e.toggle_wrap("_")),
            EditorCommand::ToggleBulletList => self.edit(|e| e.toggle_list(false)),
            EditorCommand::ToggleOrderedList => self.edit(|e| e.toggle_list(true)),
            EditorCommand::InsertTag(tag) => {
                let tag = normalize_tag(&tag);
                if tag.is_empty() {
                    return Ok(false);
                }
                self.edit(|e| e.insert_tag(&tag))
            }
            EditorCommand::InsertText(text) => self.edit(|e| e.replace_selection(&text)),
            EditorCommand::InsertContent(content) => {
                if content.trim().is_empty() {
                    return Ok(false);
                }
                self.edit(|e| e.insert_block(&content))
            }
            EditorCommand::ReplaceAll(text) => self.edit(|e| {
                e.text = text;
                let end = e.text.len();
                e.selection = end..end;
            }),
            EditorCommand::Select { start, end } => {
                let (start, end) = (start.min(end), start.max(end));
                self.selection = self.byte_index(start)..self.byte_index(end);
                return Ok(false);
            }
            EditorCommand::Undo => match self.undo.pop() {
                Some(snapshot) => {
                    let current = self.snapshot();
                    self.redo.push(current);
                    self.restore(snapshot);
                    true
                }
                None => false,
            },
            EditorCommand::Redo => match self.redo.pop() {
                Some(snapshot) => {
                    let current = self.snapshot();
                    self.undo.push(current);
                    self.restore(snapshot);
                    true
                }
                None => false,
            },
        };

        if changed {
            self.notify();
        }
        Ok(changed)
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.listeners.clear();
        self.undo.clear();
        self.redo.clear();
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Factory for [`MarkdownEngine`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownEngineFactory;

impl EngineFactory for MarkdownEngineFactory {
    fn create(&self, initial_content: &str, extensions: &[CommandKind]) -> Box<dyn AuthoringEngine> {
        Box::new(MarkdownEngine::new(initial_content, extensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn engine(text: &str) -> MarkdownEngine {
        MarkdownEngine::new(text, CommandKind::ALL)
    }

    fn select(e: &mut MarkdownEngine, start: usize, end: usize) {
        e.dispatch(EditorCommand::Select { start, end }).unwrap();
    }

    #[test]
    fn test_bold_wraps_and_unwraps_selection() {
        let mut e = engine("make this bold");
        select(&mut e, 10, 14);
        assert!(e.dispatch(EditorCommand::ToggleBold).unwrap());
        assert_eq!(e.content(), "make this **bold**");
        assert_eq!(e.selection(), 12..16);

        assert!(e.dispatch(EditorCommand::ToggleBold).unwrap());
        assert_eq!(e.content(), "make this bold");
    }

    #[test]
    fn test_italic_at_cursor_inserts_markers() {
        let mut e = engine("a ");
        e.dispatch(EditorCommand::ToggleItalic).unwrap();
        assert_eq!(e.content(), "a __");
        assert_eq!(e.selection(), 3..3);
        e.dispatch(EditorCommand::InsertText("b".into())).unwrap();
        assert_eq!(e.content(), "a _b_");
    }

    #[test]
    fn test_bullet_list_toggle() {
        let mut e = engine("one\ntwo");
        select(&mut e, 0, 7);
        e.dispatch(EditorCommand::ToggleBulletList).unwrap();
        assert_eq!(e.content(), "- one\n- two");

        select(&mut e, 0, 0);
        e.dispatch(EditorCommand::ToggleBulletList).unwrap();
        assert_eq!(e.content(), "one\n- two");
    }

    #[test]
    fn test_ordered_list_replaces_bullets() {
        let mut e = engine("- one\n- two");
        select(&mut e, 0, 11);
        e.dispatch(EditorCommand::ToggleOrderedList).unwrap();
        assert_eq!(e.content(), "1. one\n2. two");

        e.dispatch(EditorCommand::ToggleOrderedList).unwrap();
        assert_eq!(e.content(), "one\ntwo");
    }

    #[test]
    fn test_insert_tag_spacing() {
        let mut e = engine("groceries");
        e.dispatch(EditorCommand::InsertTag("#to buy".into())).unwrap();
        assert_eq!(e.content(), "groceries #to-buy ");
        assert!(!e.dispatch(EditorCommand::InsertTag("  #  ".into())).unwrap());
    }

    #[test]
    fn test_insert_content_as_block() {
        let mut e = engine("Long text");
        e.dispatch(EditorCommand::InsertContent("Summary.".into()))
            .unwrap();
        assert_eq!(e.content(), "Long text\n\nSummary.\n");
    }

    #[test]
    fn test_undo_redo() {
        let mut e = engine("");
        e.dispatch(EditorCommand::InsertText("a".into())).unwrap();
        e.dispatch(EditorCommand::InsertText("b".into())).unwrap();
        assert!(e.dispatch(EditorCommand::Undo).unwrap());
        assert_eq!(e.content(), "a");
        assert!(e.can_redo());
        assert!(e.dispatch(EditorCommand::Redo).unwrap());
        assert_eq!(e.content(), "ab");
        assert!(!e.dispatch(EditorCommand::Redo).unwrap());
    }

    #[test]
    fn test_change_listener_sees_each_change() {
        let mut e = engine("");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        e.on_change(Box::new(move |text| s.lock().unwrap().push(text.to_string())));

        e.dispatch(EditorCommand::InsertText("hi".into())).unwrap();
        e.dispatch(EditorCommand::Select { start: 0, end: 2 }).unwrap();
        e.dispatch(EditorCommand::ReplaceAll("hi".into())).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_unregistered_command_rejected() {
        let mut e = MarkdownEngine::new("", &[CommandKind::Text]);
        assert_eq!(
            e.dispatch(EditorCommand::InsertTag("x".into())),
            Err(EditorError::UnsupportedCommand("insertTag"))
        );
        assert!(e.dispatch(EditorCommand::InsertText("x".into())).unwrap());
    }

    #[test]
    fn test_destroyed_engine_rejects_commands() {
        let mut e = engine("x");
        e.destroy();
        assert!(e.is_destroyed());
        assert_eq!(
            e.dispatch(EditorCommand::ToggleBold),
            Err(EditorError::Destroyed)
        );
    }

    #[test]
    fn test_plain_text_and_html() {
        let md = "# Title\n\nSome **bold** text\n\n- item";
        assert_eq!(to_plain_text(md), "Title\nSome bold text\nitem");
        assert!(to_html(md).contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_extract_tags_and_key_values() {
        let md = "# Heading\n#work and #home, #work again\nstatus::done ::broken";
        assert_eq!(extract_tags(md), vec!["work", "home"]);
        assert_eq!(
            extract_key_values(md),
            vec![("status".to_string(), "done".to_string())]
        );
    }

    #[test]
    fn test_multibyte_selection() {
        let mut e = engine("héllo wörld");
        select(&mut e, 6, 11);
        e.dispatch(EditorCommand::ToggleBold).unwrap();
        assert_eq!(e.content(), "héllo **wörld**");
    }
}
