use crate::suggest::{Candidate, ReferenceKind, TextRange};

/// An inserted reference. It occupies a single caret position and is
/// edited as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    pub id: String,
    pub label: String,
    pub kind: ReferenceKind,
}

impl From<&Candidate> for ReferenceNode {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id.clone(),
            label: candidate.label.clone(),
            kind: candidate.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Char(char),
    Reference(ReferenceNode),
}

impl Piece {
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            Self::Reference(_) => None,
        }
    }

    fn is_newline(&self) -> bool {
        *self == Self::Char('\n')
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Char(c) if c.is_whitespace())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub pieces: Vec<Piece>,
    pub cursor: usize,
}

impl EditBuffer {
    pub fn new(text: &str) -> Self {
        let pieces: Vec<Piece> = text.chars().map(Piece::Char).collect();
        let cursor = pieces.len();
        Self { pieces, cursor }
    }

    pub fn new_empty() -> Self {
        Self {
            pieces: Vec::new(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.pieces.insert(self.cursor, Piece::Char(ch));
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.pieces.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.pieces.len() {
            self.pieces.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.pieces.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_word_left(&mut self) {
        while self.cursor > 0 && self.pieces[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !self.pieces[self.cursor - 1].is_whitespace() {
            self.cursor -= 1;
        }
    }

    pub fn move_word_right(&mut self) {
        let len = self.pieces.len();
        while self.cursor < len && !self.pieces[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        while self.cursor < len && self.pieces[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        let current_line_start = self.line_start(self.cursor);
        if current_line_start == 0 {
            self.cursor = 0;
            return;
        }

        let col = self.cursor - current_line_start;
        let prev_line_end = current_line_start - 1;
        let prev_line_start = self.line_start(prev_line_end);
        self.cursor = prev_line_start + col.min(prev_line_end - prev_line_start);
    }

    pub fn move_down(&mut self) {
        let current_line_start = self.line_start(self.cursor);
        let current_line_end = self.line_end(self.cursor);
        if current_line_end >= self.pieces.len() {
            self.cursor = self.pieces.len();
            return;
        }

        let col = self.cursor - current_line_start;
        let next_line_start = current_line_end + 1;
        let next_line_end = self.line_end(next_line_start);
        self.cursor = next_line_start + col.min(next_line_end - next_line_start);
    }

    fn line_start(&self, pos: usize) -> usize {
        self.pieces[..pos]
            .iter()
            .rposition(Piece::is_newline)
            .map(|p| p + 1)
            .unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.pieces[pos..]
            .iter()
            .position(Piece::is_newline)
            .map(|p| pos + p)
            .unwrap_or(self.pieces.len())
    }

    /// Replace `start..end` with plain text and put the caret after it.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        let new_pieces: Vec<Piece> = replacement.chars().map(Piece::Char).collect();
        let new_len = new_pieces.len();
        self.pieces.splice(start..end, new_pieces);
        self.cursor = start + new_len;
    }

    /// Replace the trigger and query in `range` with a reference to
    /// `candidate`.
    ///
    /// A space follows the reference unless whitespace already does, and
    /// the caret lands after the inserted fragment.
    pub fn insert_reference(&mut self, range: TextRange, candidate: &Candidate) {
        let end = range.end.min(self.pieces.len());
        let start = range.start.min(end);

        let mut fragment = vec![Piece::Reference(ReferenceNode::from(candidate))];
        if !self.pieces.get(end).is_some_and(Piece::is_whitespace) {
            fragment.push(Piece::Char(' '));
        }
        let inserted = fragment.len();
        self.pieces.splice(start..end, fragment);
        self.cursor = start + inserted;
    }

    pub fn references(&self) -> impl Iterator<Item = &ReferenceNode> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Reference(node) => Some(node),
            Piece::Char(_) => None,
        })
    }

    /// Text as the user sees it, references included in their trigger form.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Char(c) => out.push(*c),
                Piece::Reference(node) => match node.kind {
                    ReferenceKind::Page => {
                        out.push_str("[[");
                        out.push_str(&node.label);
                        out.push_str("]]");
                    }
                    ReferenceKind::Collaborator => {
                        out.push('@');
                        out.push_str(&node.label);
                    }
                },
            }
        }
        out
    }

    /// Serialize as markup, one paragraph per line.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<p>");
        for piece in &self.pieces {
            match piece {
                Piece::Char('\n') => out.push_str("</p><p>"),
                Piece::Char(c) => push_escaped(&mut out, *c),
                Piece::Reference(node) => push_reference(&mut out, node),
            }
        }
        out.push_str("</p>");
        out
    }
}

fn push_reference(out: &mut String, node: &ReferenceNode) {
    let id = escape(&node.id);
    let label = escape(&node.label);
    match node.kind {
        ReferenceKind::Page => out.push_str(&format!(
            r#"<a class="page-link-ref" href="/app/pages/{id}" data-page-id="{id}">[[{label}]]</a>"#
        )),
        ReferenceKind::Collaborator => out.push_str(&format!(
            r#"<span class="mention" data-type="mention" data-id="{id}">@{label}</span>"#
        )),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
