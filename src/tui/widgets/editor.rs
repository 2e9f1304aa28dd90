use ratatui::layout::Rect;
use std::cmp;

#[derive(Clone, Debug)]
pub enum EditOperation {
    InsertChar { line: usize, col: usize, ch: char },
    DeleteChar { line: usize, col: usize, ch: char },
    InsertNewline { line: usize, col: usize },
    DeleteNewline { line: usize, col: usize, next_line: String },
}

/// Minimal multi-line text editor state used by forms, the memo modal
/// and the assistant input. Cursor positions are character counts, not
/// byte offsets, so multi-byte input stays consistent.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize, // Vertical scroll (line offset)
    pub scroll_col: usize,    // Horizontal scroll (column offset)
    pub undo_stack: Vec<EditOperation>,
    pub max_history: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            scroll_col: 0,
            undo_stack: Vec::new(),
            max_history: 100,
        }
    }

    pub fn from_string(content: String) -> Self {
        let lines: Vec<String> = if content.is_empty() {
            vec![String::new()]
        } else {
            content.lines().map(|s| s.to_string()).collect()
        };
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
            scroll_offset: 0,
            scroll_col: 0,
            undo_stack: Vec::new(),
            max_history: 100,
        }
    }

    /// Ensure cursor_line is within valid bounds
    fn ensure_cursor_valid(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len().saturating_sub(1);
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn insert_char(&mut self, ch: char) {
        let op = EditOperation::InsertChar {
            line: self.cursor_line,
            col: self.cursor_col,
            ch,
        };

        if ch == '\n' {
            self.insert_newline();
            return;
        }

        self.ensure_cursor_valid();
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let col = cmp::min(self.cursor_col, line.chars().count());
            let mut chars: Vec<char> = line.chars().collect();
            chars.insert(col, ch);
            *line = chars.into_iter().collect();
            self.cursor_col = col + 1;
            self.add_to_undo(op);
        }
    }

    pub fn insert_newline(&mut self) {
        let op = EditOperation::InsertNewline {
            line: self.cursor_line,
            col: self.cursor_col,
        };

        self.ensure_cursor_valid();
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let col = cmp::min(self.cursor_col, line.chars().count());
            let mut chars: Vec<char> = line.chars().collect();
            let remainder: String = chars.split_off(col).into_iter().collect();
            *line = chars.into_iter().collect();
            self.lines.insert(self.cursor_line + 1, remainder);
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.add_to_undo(op);
        }
    }

    pub fn delete_char(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col > 0 {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let col = cmp::min(self.cursor_col, line.chars().count());
                if col > 0 {
                    let mut chars: Vec<char> = line.chars().collect();
                    let ch = chars.remove(col - 1);
                    *line = chars.into_iter().collect();
                    self.cursor_col = col - 1;
                    self.add_to_undo(EditOperation::DeleteChar {
                        line: self.cursor_line,
                        col: col - 1,
                        ch,
                    });
                }
            }
        } else if self.cursor_line > 0 && self.cursor_line < self.lines.len() {
            // Merge with previous line
            let current_line = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            if let Some(prev_line) = self.lines.get_mut(self.cursor_line) {
                let prev_len = prev_line.chars().count();
                self.cursor_col = prev_len;
                prev_line.push_str(&current_line);
                self.add_to_undo(EditOperation::DeleteNewline {
                    line: self.cursor_line,
                    col: prev_len,
                    next_line: current_line,
                });
            }
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor_col();
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line < self.lines.len().saturating_sub(1) {
            self.cursor_line += 1;
            self.clamp_cursor_col();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line < self.lines.len().saturating_sub(1) {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn move_cursor_word_left(&mut self) {
        if self.cursor_col == 0 {
            if self.cursor_line > 0 {
                self.cursor_line -= 1;
                self.cursor_col = self.current_line_len();
            }
            return;
        }

        let Some(line) = self.lines.get(self.cursor_line) else {
            return;
        };
        let chars: Vec<char> = line.chars().collect();
        let mut pos = cmp::min(self.cursor_col, chars.len());

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && is_word_char(chars[pos - 1]) {
            pos -= 1;
        }

        self.cursor_col = pos;
    }

    pub fn move_cursor_word_right(&mut self) {
        let line_len = self.current_line_len();
        if self.cursor_col >= line_len {
            if self.cursor_line < self.lines.len().saturating_sub(1) {
                self.cursor_line += 1;
                self.cursor_col = 0;
            }
            return;
        }

        let Some(line) = self.lines.get(self.cursor_line) else {
            return;
        };
        let chars: Vec<char> = line.chars().collect();
        let mut pos = self.cursor_col;

        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }

        self.cursor_col = pos;
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    fn clamp_cursor_col(&mut self) {
        self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
    }

    // Undo

    fn add_to_undo(&mut self, op: EditOperation) {
        self.undo_stack.push(op);
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        match op {
            EditOperation::InsertChar { line, col, ch } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    if col < chars.len() && chars[col] == ch {
                        chars.remove(col);
                        *line_str = chars.into_iter().collect();
                        self.cursor_line = line;
                        self.cursor_col = col;
                    }
                }
            }
            EditOperation::DeleteChar { line, col, ch } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    if col <= chars.len() {
                        chars.insert(col, ch);
                        *line_str = chars.into_iter().collect();
                        self.cursor_line = line;
                        self.cursor_col = col + 1;
                    }
                }
            }
            EditOperation::InsertNewline { line, col } => {
                if line + 1 < self.lines.len() {
                    let next_line = self.lines.remove(line + 1);
                    if let Some(line_str) = self.lines.get_mut(line) {
                        line_str.push_str(&next_line);
                        self.cursor_line = line;
                        self.cursor_col = col;
                    }
                }
            }
            EditOperation::DeleteNewline { line, col, next_line } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    if col <= chars.len() {
                        let remainder: String = chars.split_off(col).into_iter().collect();
                        *line_str = chars.into_iter().collect();
                        self.lines.insert(line + 1, format!("{}{}", remainder, next_line));
                        self.cursor_line = line;
                        self.cursor_col = col;
                    }
                }
            }
        }
        true
    }

    // Viewport helpers

    pub fn get_visible_lines(
        &self,
        viewport_height: usize,
        viewport_width: usize,
    ) -> (usize, Vec<String>) {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());

        let effective_width = viewport_width.saturating_sub(2);

        let visible: Vec<String> = self.lines[start..end]
            .iter()
            .map(|line| {
                let chars: Vec<char> = line.chars().collect();
                if self.scroll_col >= chars.len() {
                    String::new()
                } else {
                    let start_idx = self.scroll_col;
                    let end_idx = cmp::min(start_idx + effective_width, chars.len());
                    chars[start_idx..end_idx].iter().collect()
                }
            })
            .collect();

        (start, visible)
    }

    pub fn update_scroll(&mut self, viewport_height: usize) {
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if viewport_height > 0 && self.cursor_line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor_line.saturating_sub(viewport_height - 1);
        }
    }

    pub fn update_horizontal_scroll(&mut self, viewport_width: usize) {
        let effective_width = viewport_width.saturating_sub(2);

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if effective_width > 0 && self.cursor_col >= self.scroll_col + effective_width {
            self.scroll_col = self.cursor_col.saturating_sub(effective_width - 1);
        }
    }

    /// Screen position of the cursor within `area`, or None when it is
    /// scrolled out of view.
    pub fn get_cursor_screen_pos(&self, area: Rect, viewport_height: usize) -> Option<(u16, u16)> {
        let visible_start = self.scroll_offset;
        if self.cursor_line < visible_start || self.cursor_line >= visible_start + viewport_height {
            return None;
        }
        let line_y = (self.cursor_line - visible_start) as u16;
        if line_y >= area.height.saturating_sub(2) {
            return None;
        }

        let line = self.lines.get(self.cursor_line)?;
        let col = cmp::min(self.cursor_col, line.chars().count());

        let visible_col = col.checked_sub(self.scroll_col)?;
        let max_x = area.width.saturating_sub(2);
        if visible_col >= max_x as usize {
            return None;
        }

        let screen_x = area.x + 1 + visible_col as u16;
        let screen_y = area.y + 1 + line_y;

        if screen_x >= area.x + area.width || screen_y >= area.y + area.height {
            return None;
        }

        Some((screen_x, screen_y))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_delete_round_trip() {
        let mut editor = Editor::new();
        for ch in "hello".chars() {
            editor.insert_char(ch);
        }
        assert_eq!(editor.text(), "hello");
        editor.delete_char();
        assert_eq!(editor.text(), "hell");
        assert_eq!(editor.cursor_col, 4);
    }

    #[test]
    fn newline_splits_and_backspace_merges() {
        let mut editor = Editor::from_string("alpha".to_string());
        editor.cursor_col = 3;
        editor.insert_newline();
        assert_eq!(editor.lines, vec!["alp".to_string(), "ha".to_string()]);
        editor.cursor_col = 0;
        editor.delete_char();
        assert_eq!(editor.text(), "alpha");
    }

    #[test]
    fn undo_restores_previous_text() {
        let mut editor = Editor::from_string("note".to_string());
        editor.insert_char('s');
        assert_eq!(editor.text(), "notes");
        assert!(editor.undo());
        assert_eq!(editor.text(), "note");
    }

    #[test]
    fn word_movement_skips_whitespace() {
        let mut editor = Editor::from_string("one two".to_string());
        editor.cursor_col = 0;
        editor.move_cursor_word_right();
        assert_eq!(editor.cursor_col, 4);
        editor.move_cursor_word_left();
        assert_eq!(editor.cursor_col, 0);
    }

    #[test]
    fn multibyte_input_counts_characters() {
        let mut editor = Editor::new();
        editor.insert_char('日');
        editor.insert_char('本');
        assert_eq!(editor.cursor_col, 2);
        editor.delete_char();
        assert_eq!(editor.text(), "日");
    }
}
