use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{Anchor, Candidate, ReferenceKind, TextRange};
use crate::config::SuggestConfig;

/// Lifecycle of the suggestion overlay. `Querying` and `Open` belong to a
/// live session; `Closed` is reported after a session ends until the next
/// one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Querying,
    Open,
    Closed,
}

/// A query request issued by the controller. Results must be returned with
/// the same `token`; anything older is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub token: u64,
    pub kind: ReferenceKind,
    pub text: String,
}

/// A committed candidate and the text range it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub candidate: Candidate,
    pub range: TextRange,
    pub kind: ReferenceKind,
}

/// Keys the overlay cares about. Everything else goes back to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKey {
    Up,
    Down,
    Enter,
    Escape,
    Other,
}

impl From<&KeyEvent> for SuggestionKey {
    fn from(key: &KeyEvent) -> Self {
        if key.modifiers != KeyModifiers::NONE {
            return Self::Other;
        }
        match key.code {
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            KeyCode::Enter => Self::Enter,
            KeyCode::Esc => Self::Escape,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Not consumed; the host should handle the key.
    Ignored,
    Handled,
    Commit(Selection),
}

/// Snapshot handed to the overlay renderer.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    pub kind: ReferenceKind,
    pub query: &'a str,
    pub candidates: &'a [Candidate],
    pub selected: usize,
    pub anchor: Anchor,
    pub loading: bool,
}

/// Presentation of the candidate list. `release` is called exactly once for
/// every overlay that was shown.
pub trait OverlayRenderer {
    fn show(&mut self, view: &OverlayView<'_>);
    fn update(&mut self, view: &OverlayView<'_>);
    fn release(&mut self);
}

/// Renderer for headless use.
#[derive(Debug, Default)]
pub struct NoopOverlay;

impl OverlayRenderer for NoopOverlay {
    fn show(&mut self, _view: &OverlayView<'_>) {}
    fn update(&mut self, _view: &OverlayView<'_>) {}
    fn release(&mut self) {}
}

struct Session {
    kind: ReferenceKind,
    query: String,
    range: TextRange,
    anchor: Anchor,
    candidates: Vec<Candidate>,
    selected: usize,
    status: SessionStatus,
    shown: bool,
}

impl Session {
    fn view(&self) -> OverlayView<'_> {
        OverlayView {
            kind: self.kind,
            query: &self.query,
            candidates: &self.candidates,
            selected: self.selected,
            anchor: self.anchor,
            loading: self.status == SessionStatus::Querying,
        }
    }

    fn selection(&self, index: usize) -> Option<Selection> {
        let candidate = self.candidates.get(index)?.clone();
        Some(Selection {
            candidate,
            range: self.range,
            kind: self.kind,
        })
    }
}

/// Owns the single active suggestion session of one editing surface.
pub struct SuggestionController<R: OverlayRenderer> {
    renderer: R,
    session: Option<Session>,
    token: u64,
    ended: bool,
    close_on_empty: bool,
}

impl<R: OverlayRenderer> SuggestionController<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            session: None,
            token: 0,
            ended: false,
            close_on_empty: false,
        }
    }

    pub fn from_config(renderer: R, config: &SuggestConfig) -> Self {
        Self::new(renderer).with_close_on_empty(config.close_on_empty)
    }

    /// Close the session instead of showing "no results" when a query
    /// comes back empty.
    pub fn with_close_on_empty(mut self, close_on_empty: bool) -> Self {
        self.close_on_empty = close_on_empty;
        self
    }

    /// Begin a new session for `kind`, tearing down any previous one.
    pub fn start(
        &mut self,
        kind: ReferenceKind,
        query: &str,
        range: TextRange,
        anchor: Anchor,
    ) -> QueryTicket {
        self.close();
        self.ended = false;
        self.token += 1;
        self.session = Some(Session {
            kind,
            query: query.to_string(),
            range,
            anchor,
            candidates: Vec::new(),
            selected: 0,
            status: SessionStatus::Querying,
            shown: false,
        });
        tracing::debug!(token = self.token, ?kind, query, "suggestion session started");
        QueryTicket {
            token: self.token,
            kind,
            text: query.to_string(),
        }
    }

    /// Track the typed query. Returns a new ticket when the query text
    /// changed; a range or anchor change alone needs no new query.
    pub fn update_query(
        &mut self,
        query: &str,
        range: TextRange,
        anchor: Anchor,
    ) -> Option<QueryTicket> {
        let session = self.session.as_mut()?;
        session.range = range;
        session.anchor = anchor;
        if session.query == query {
            return None;
        }

        self.token += 1;
        session.query = query.to_string();
        session.status = SessionStatus::Querying;
        if session.shown {
            self.renderer.update(&session.view());
        }
        Some(QueryTicket {
            token: self.token,
            kind: session.kind,
            text: query.to_string(),
        })
    }

    /// Deliver query results. Returns `false` when the response is stale or
    /// no session is active.
    pub fn apply_results(&mut self, token: u64, candidates: Vec<Candidate>) -> bool {
        if token != self.token {
            tracing::debug!(token, current = self.token, "discarding stale suggestions");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(token, "suggestions arrived after session closed");
            return false;
        };

        if candidates.is_empty() && self.close_on_empty {
            self.close();
            return true;
        }

        session.candidates = candidates;
        session.selected = 0;
        session.status = SessionStatus::Open;
        if session.shown {
            self.renderer.update(&session.view());
        } else {
            session.shown = true;
            self.renderer.show(&session.view());
        }
        true
    }

    pub fn handle_key(&mut self, key: SuggestionKey) -> KeyOutcome {
        let Some(session) = self.session.as_mut() else {
            return KeyOutcome::Ignored;
        };
        if key == SuggestionKey::Escape {
            self.close();
            return KeyOutcome::Handled;
        }

        let n = session.candidates.len();
        if session.status != SessionStatus::Open || n == 0 {
            return KeyOutcome::Ignored;
        }

        match key {
            SuggestionKey::Up => {
                session.selected = (session.selected + n - 1) % n;
                self.renderer.update(&session.view());
                KeyOutcome::Handled
            }
            SuggestionKey::Down => {
                session.selected = (session.selected + 1) % n;
                self.renderer.update(&session.view());
                KeyOutcome::Handled
            }
            SuggestionKey::Enter => {
                let index = session.selected;
                self.select(index)
                    .map_or(KeyOutcome::Ignored, KeyOutcome::Commit)
            }
            SuggestionKey::Escape | SuggestionKey::Other => KeyOutcome::Ignored,
        }
    }

    /// Commit the candidate at `index`, e.g. from a click.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let selection = self.session.as_ref()?.selection(index)?;
        self.close();
        Some(selection)
    }

    /// Close when the caret leaves the trigger range. Returns whether the
    /// session was closed.
    pub fn caret_moved(&mut self, pos: usize) -> bool {
        let outside = self
            .session
            .as_ref()
            .is_some_and(|s| !s.range.contains_caret(pos));
        outside && self.close()
    }

    /// End the session and release the overlay. Safe to call repeatedly;
    /// returns whether a session was active.
    pub fn close(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        if session.shown {
            self.renderer.release();
        }
        self.ended = true;
        tracing::debug!(token = self.token, "suggestion session closed");
        true
    }

    pub fn status(&self) -> SessionStatus {
        match &self.session {
            Some(session) => session.status,
            None if self.ended => SessionStatus::Closed,
            None => SessionStatus::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn kind(&self) -> Option<ReferenceKind> {
        self.session.as_ref().map(|s| s.kind)
    }

    pub fn query(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.query.as_str())
    }

    pub fn range(&self) -> Option<TextRange> {
        self.session.as_ref().map(|s| s.range)
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.session
            .as_ref()
            .map_or(&[][..], |s| s.candidates.as_slice())
    }

    pub fn selected(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.selected)
    }

    pub fn current_token(&self) -> u64 {
        self.token
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: OverlayRenderer> Drop for SuggestionController<R> {
    fn drop(&mut self) {
        self.close();
    }
}
