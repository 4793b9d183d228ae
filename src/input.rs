/// Single-line text field. The cursor is a character index.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    text: String,
    cursor: usize,
}

impl InputField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.char_len() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_cursor() {
        let mut input = InputField::default();
        for c in "lab1".chars() {
            input.insert(c);
        }
        input.left();
        input.insert('0');
        assert_eq!(input.text(), "lab01");
        assert_eq!(input.cursor(), 4);

        input.home();
        input.delete();
        assert_eq!(input.text(), "ab01");
        input.backspace();
        assert_eq!(input.text(), "ab01");

        input.end();
        input.backspace();
        assert_eq!(input.text(), "ab0");
        input.right();
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn handles_multibyte_text() {
        let mut input = InputField::default();
        input.set("héllo");
        assert_eq!(input.cursor(), 5);
        input.left();
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text(), "hllo");
        input.clear();
        assert_eq!(input.text(), "");
        assert_eq!(input.cursor(), 0);
    }
}
