use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::edit_buffer::EditBuffer;
use crate::links::LinkSync;
use crate::suggest::{
    detect_trigger, Anchor, Candidate, KeyOutcome, OverlayRenderer, QueryTicket, Selection,
    SuggestionController, SuggestionKey,
};

/// What a key press produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditorEvent {
    /// A query the host should hand to the dispatcher.
    pub ticket: Option<QueryTicket>,
    pub content_changed: bool,
}

/// One editing surface: a buffer, its suggestion session and, when the
/// content belongs to a page, link sync.
pub struct EditorSession<R: OverlayRenderer> {
    page_id: Option<String>,
    pub buffer: EditBuffer,
    suggestions: SuggestionController<R>,
    link_sync: Option<LinkSync>,
    // Range start of a trigger the user dismissed with Escape.
    dismissed_at: Option<usize>,
}

impl<R: OverlayRenderer> EditorSession<R> {
    pub fn new(
        page_id: Option<String>,
        buffer: EditBuffer,
        suggestions: SuggestionController<R>,
    ) -> Self {
        Self {
            page_id,
            buffer,
            suggestions,
            link_sync: None,
            dismissed_at: None,
        }
    }

    pub fn with_link_sync(mut self, link_sync: LinkSync) -> Self {
        self.link_sync = Some(link_sync);
        self
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref()
    }

    pub fn suggestions(&self) -> &SuggestionController<R> {
        &self.suggestions
    }

    pub fn html(&self) -> String {
        self.buffer.to_html()
    }

    pub fn handle_key(&mut self, key: &KeyEvent, anchor: Anchor) -> EditorEvent {
        if self.suggestions.is_active() {
            match self.suggestions.handle_key(SuggestionKey::from(key)) {
                KeyOutcome::Handled => {
                    if !self.suggestions.is_active() {
                        self.dismissed_at = detect_trigger(&self.buffer).map(|m| m.range.start);
                    }
                    return EditorEvent::default();
                }
                KeyOutcome::Commit(selection) => {
                    self.commit(selection);
                    return EditorEvent {
                        ticket: None,
                        content_changed: true,
                    };
                }
                KeyOutcome::Ignored => {}
            }
        }

        let cursor = self.buffer.cursor;
        let changed = self.apply_edit(key);
        if !changed && cursor == self.buffer.cursor {
            return EditorEvent::default();
        }

        let ticket = self.refresh_trigger(anchor);
        if changed {
            self.content_changed();
        }
        EditorEvent {
            ticket,
            content_changed: changed,
        }
    }

    /// Feed results for a dispatched ticket into the overlay.
    pub fn apply_results(&mut self, token: u64, candidates: Vec<Candidate>) -> bool {
        self.suggestions.apply_results(token, candidates)
    }

    /// Commit the candidate at `index`, as from a click. Returns whether a
    /// reference was inserted.
    pub fn select(&mut self, index: usize) -> bool {
        match self.suggestions.select(index) {
            Some(selection) => {
                self.commit(selection);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, selection: Selection) {
        self.buffer
            .insert_reference(selection.range, &selection.candidate);
        self.dismissed_at = None;
        tracing::debug!(id = %selection.candidate.id, kind = ?selection.kind, "reference inserted");
        self.content_changed();
    }

    fn content_changed(&self) {
        if let Some(sync) = &self.link_sync {
            sync.on_content_change(self.page_id.as_deref(), self.buffer.to_html());
        }
    }

    /// Returns whether the content changed. Caret-only moves return false.
    fn apply_edit(&mut self, key: &KeyEvent) -> bool {
        let buffer = &mut self.buffer;
        let len = buffer.pieces.len();
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char(ch)) | (KeyModifiers::SHIFT, KeyCode::Char(ch)) => {
                buffer.insert_char(ch);
            }
            (KeyModifiers::NONE, KeyCode::Enter) => buffer.insert_char('\n'),
            (KeyModifiers::NONE, KeyCode::Backspace) => buffer.delete_back(),
            (KeyModifiers::NONE, KeyCode::Delete) => buffer.delete_forward(),
            (KeyModifiers::NONE, KeyCode::Left) => buffer.move_left(),
            (KeyModifiers::NONE, KeyCode::Right) => buffer.move_right(),
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                buffer.move_home()
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                buffer.move_end()
            }
            (KeyModifiers::NONE, KeyCode::Up) => buffer.move_up(),
            (KeyModifiers::NONE, KeyCode::Down) => buffer.move_down(),
            (KeyModifiers::CONTROL, KeyCode::Left) => buffer.move_word_left(),
            (KeyModifiers::CONTROL, KeyCode::Right) => buffer.move_word_right(),
            _ => {}
        }
        buffer.pieces.len() != len
    }

    /// Start, update or close the suggestion session to match the trigger
    /// under the caret.
    fn refresh_trigger(&mut self, anchor: Anchor) -> Option<QueryTicket> {
        self.suggestions.caret_moved(self.buffer.cursor);

        let Some(found) = detect_trigger(&self.buffer) else {
            self.dismissed_at = None;
            self.suggestions.close();
            return None;
        };
        if self.dismissed_at == Some(found.range.start) {
            return None;
        }
        self.dismissed_at = None;

        let same_session = self.suggestions.kind() == Some(found.kind)
            && self.suggestions.range().map(|r| r.start) == Some(found.range.start);
        if same_session {
            self.suggestions
                .update_query(&found.query, found.range, anchor)
        } else {
            Some(
                self.suggestions
                    .start(found.kind, &found.query, found.range, anchor),
            )
        }
    }
}
