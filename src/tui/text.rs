//! Cursor and selection handling for the query editor.
//!
//! The text itself lives on the tab; [`EditorState`] only tracks a cursor
//! and an optional selection anchor, both as char indices, and edits a
//! `String` handed to it.

/// Cursor plus selection anchor over a multi-line text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// Cursor position (char index).
    pub cursor: usize,
    /// Other end of the selection, if one is being extended.
    pub anchor: Option<usize>,
}

impl EditorState {
    /// Places the cursor at the end of `text` with no selection.
    pub fn at_end(text: &str) -> Self {
        Self {
            cursor: text.chars().count(),
            anchor: None,
        }
    }

    /// Selected char range, ordered. `None` when nothing is selected.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some((anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    /// The selected substring of `text`.
    pub fn selected_text<'a>(&self, text: &'a str) -> Option<&'a str> {
        let (start, end) = self.selection_range()?;
        Some(&text[byte_offset(text, start)..byte_offset(text, end)])
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Inserts a character, replacing the selection if there is one.
    pub fn insert(&mut self, text: &mut String, c: char) {
        self.delete_selection(text);
        text.insert(byte_offset(text, self.cursor), c);
        self.cursor += 1;
    }

    /// Deletes the selection, or the character before the cursor.
    pub fn backspace(&mut self, text: &mut String) {
        if self.delete_selection(text) || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        text.remove(byte_offset(text, self.cursor));
    }

    /// Deletes the selection, or the character at the cursor.
    pub fn delete(&mut self, text: &mut String) {
        if self.delete_selection(text) {
            return;
        }
        if self.cursor < text.chars().count() {
            text.remove(byte_offset(text, self.cursor));
        }
    }

    /// Deletes from the start of the previous word up to the cursor.
    pub fn delete_word_backward(&mut self, text: &mut String) {
        if self.delete_selection(text) {
            return;
        }
        let start = word_start_backward(text, self.cursor);
        text.replace_range(byte_offset(text, start)..byte_offset(text, self.cursor), "");
        self.cursor = start;
    }

    fn delete_selection(&mut self, text: &mut String) -> bool {
        let Some((start, end)) = self.selection_range() else {
            self.anchor = None;
            return false;
        };
        text.replace_range(byte_offset(text, start)..byte_offset(text, end), "");
        self.cursor = start;
        self.anchor = None;
        true
    }

    /// Moves left; with `extend`, grows the selection instead of clearing it.
    pub fn move_left(&mut self, extend: bool) {
        self.prepare_move(extend);
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self, text: &str, extend: bool) {
        self.prepare_move(extend);
        if self.cursor < text.chars().count() {
            self.cursor += 1;
        }
    }

    /// Moves to the same column on the previous line, clamped to its length.
    pub fn move_up(&mut self, text: &str) {
        self.anchor = None;
        let (line, col) = line_col(text, self.cursor);
        if line > 0 {
            self.cursor = index_at(text, line - 1, col);
        }
    }

    pub fn move_down(&mut self, text: &str) {
        self.anchor = None;
        let (line, col) = line_col(text, self.cursor);
        if line + 1 < text.split('\n').count() {
            self.cursor = index_at(text, line + 1, col);
        }
    }

    /// Start of the current line.
    pub fn move_home(&mut self, text: &str) {
        self.anchor = None;
        let (line, _) = line_col(text, self.cursor);
        self.cursor = index_at(text, line, 0);
    }

    /// End of the current line.
    pub fn move_end(&mut self, text: &str) {
        self.anchor = None;
        let (line, _) = line_col(text, self.cursor);
        self.cursor = index_at(text, line, usize::MAX);
    }

    fn prepare_move(&mut self, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
    }

    /// Keeps the cursor inside `text` after an outside change.
    pub fn clamp(&mut self, text: &str) {
        let len = text.chars().count();
        self.cursor = self.cursor.min(len);
        if let Some(anchor) = self.anchor {
            self.anchor = Some(anchor.min(len));
        }
    }
}

/// Byte offset of the char at `index`, or `text.len()` past the end.
pub fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// Zero-based (line, column) of a char index.
pub fn line_col(text: &str, index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for c in text.chars().take(index) {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Char index of (line, col), with `col` clamped to the line's length.
fn index_at(text: &str, line: usize, col: usize) -> usize {
    let mut index = 0;
    for (i, content) in text.split('\n').enumerate() {
        let len = content.chars().count();
        if i == line {
            return index + col.min(len);
        }
        index += len + 1;
    }
    text.chars().count()
}

/// Start of the word before `cursor`: skips whitespace, then non-whitespace.
pub fn word_start_backward(text: &str, cursor: usize) -> usize {
    let chars: Vec<char> = text.chars().take(cursor).collect();
    let mut pos = chars.len();
    while pos > 0 && chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    while pos > 0 && !chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    pos
}
