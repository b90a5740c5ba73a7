//! Typeahead suggestions for page links (`[[`) and mentions (`@`).
//!
//! The host editor reports trigger tokens, the [`SuggestionController`]
//! owns the single active session, the [`QueryDispatcher`] runs queries in
//! the background, and results flow back tagged with the session token that
//! requested them.

mod dispatch;
mod session;
mod source;
mod trigger;

pub use dispatch::{QueryDispatcher, SuggestionMessage};
pub use session::{
    KeyOutcome, NoopOverlay, OverlayRenderer, OverlayView, QueryTicket, Selection,
    SessionStatus, SuggestionController, SuggestionKey,
};
pub use source::{
    filter_by_label, CollaboratorSuggestions, PageSuggestions, SuggestionSource,
    SuggestionSources,
};
pub use trigger::{detect_trigger, TriggerMatch};

use serde_json::json;

use crate::api::types::{Member, Page};

/// What an inserted reference points at. Each kind has its own trigger and
/// query source but shares the session and insertion machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Page,
    Collaborator,
}

impl ReferenceKind {
    pub fn trigger(self) -> &'static str {
        match self {
            Self::Page => "[[",
            Self::Collaborator => "@",
        }
    }
}

/// A normalized suggestion entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub label: String,
    pub kind: ReferenceKind,
    pub icon: Option<String>,
    pub meta: serde_json::Value,
}

impl Candidate {
    pub fn from_page(page: &Page) -> Self {
        let title = page.title.trim();
        Self {
            id: page.id.clone(),
            label: if title.is_empty() {
                "Untitled".into()
            } else {
                title.to_string()
            },
            kind: ReferenceKind::Page,
            icon: page.icon.clone(),
            meta: json!({
                "type": page.page_type,
                "tags": page.tags,
                "updatedAt": page.updated_at,
            }),
        }
    }

    pub fn from_member(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            label: member.label().to_string(),
            kind: ReferenceKind::Collaborator,
            icon: None,
            meta: json!({ "email": member.email }),
        }
    }
}

/// Half-open character range `[start, end)` in the edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Caret positions that keep a session alive: anywhere from the trigger
    /// start through the end of the typed query.
    pub fn contains_caret(&self, pos: usize) -> bool {
        pos >= self.start && pos <= self.end
    }
}

/// Screen position of the caret, used to place the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub column: u16,
    pub row: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_member, make_page};

    #[test]
    fn page_candidate_uses_title_and_keeps_metadata() {
        let mut page = make_page("p1", "  Roadmap ", 0);
        page.icon = Some("🗺".into());
        page.tags = vec!["q3".into()];

        let c = Candidate::from_page(&page);
        assert_eq!(c.id, "p1");
        assert_eq!(c.label, "Roadmap");
        assert_eq!(c.kind, ReferenceKind::Page);
        assert_eq!(c.icon.as_deref(), Some("🗺"));
        assert_eq!(c.meta["tags"][0], "q3");
        assert_eq!(c.meta["type"], "page");
    }

    #[test]
    fn untitled_page_gets_placeholder_label() {
        let c = Candidate::from_page(&make_page("p1", "", 0));
        assert_eq!(c.label, "Untitled");
    }

    #[test]
    fn member_candidate_normalizes_label() {
        let c = Candidate::from_member(&make_member("u1", None, Some("ada@example.com")));
        assert_eq!(c.label, "ada@example.com");
        assert_eq!(c.kind, ReferenceKind::Collaborator);
    }

    #[test]
    fn range_contains_both_ends() {
        let r = TextRange::new(4, 8);
        assert!(r.contains_caret(4));
        assert!(r.contains_caret(8));
        assert!(!r.contains_caret(3));
        assert!(!r.contains_caret(9));
    }
}
