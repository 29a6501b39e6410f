/// Single-line search input with a character-indexed cursor.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryEditor {
    text: String,
    cursor: usize,
}

impl QueryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        let ch = match ch {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        };
        self.clamp_cursor();
        let index = byte_index(&self.text, self.cursor);
        self.text.insert(index, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = byte_index(&self.text, self.cursor);
        self.text.remove(index);
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let index = byte_index(&self.text, self.cursor);
        self.text.remove(index);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.text.chars().count());
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
