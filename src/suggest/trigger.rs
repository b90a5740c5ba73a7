use super::{ReferenceKind, TextRange};
use crate::edit_buffer::{EditBuffer, Piece};

/// An active trigger token before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub kind: ReferenceKind,
    /// Text typed after the trigger, up to the caret.
    pub query: String,
    /// Trigger plus query.
    pub range: TextRange,
}

/// Find the trigger nearest to the caret on the current line.
///
/// A trigger must open the line or follow whitespace. `[[` queries may
/// contain spaces; `@` queries may not. Scanning stops at a line break or an
/// inserted reference.
pub fn detect_trigger(buffer: &EditBuffer) -> Option<TriggerMatch> {
    let cursor = buffer.cursor;
    let mut line_start = cursor;
    while line_start > 0 {
        match buffer.pieces[line_start - 1] {
            Piece::Char(c) if c != '\n' => line_start -= 1,
            _ => break,
        }
    }
    // A reference directly before the line text is not a boundary.
    let opens_line = line_start == 0 || buffer.pieces[line_start - 1] == Piece::Char('\n');

    let line: Vec<char> = buffer.pieces[line_start..cursor]
        .iter()
        .filter_map(Piece::as_char)
        .collect();
    let at_boundary = |i: usize| {
        if i == 0 {
            opens_line
        } else {
            line[i - 1].is_whitespace()
        }
    };

    for i in (0..line.len()).rev() {
        if line[i] == '@' && at_boundary(i) {
            let query = &line[i + 1..];
            if !query.iter().any(|c| c.is_whitespace()) {
                return Some(TriggerMatch {
                    kind: ReferenceKind::Collaborator,
                    query: query.iter().collect(),
                    range: TextRange::new(line_start + i, cursor),
                });
            }
        }
        if line[i] == '[' && line.get(i + 1) == Some(&'[') && at_boundary(i) {
            let query: String = line[i + 2..].iter().collect();
            if !query.contains("]]") {
                return Some(TriggerMatch {
                    kind: ReferenceKind::Page,
                    query,
                    range: TextRange::new(line_start + i, cursor),
                });
            }
        }
    }
    None
}
