//! Single-line, UTF-8 safe text input used for the domain field and the
//! watch interval prompt.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, Default)]
pub struct TextInput {
    value: String,
    /// Byte index into `value`, always on a char boundary.
    cursor: usize,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.len(),
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Display columns before the cursor, for terminal cursor placement.
    pub fn cursor_column(&self) -> u16 {
        u16::try_from(self.value[..self.cursor].width()).unwrap_or(u16::MAX)
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::with_value(value);
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(previous) = self.value[..self.cursor].chars().next_back() {
            let start = self.cursor - previous.len_utf8();
            self.value.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.value[self.cursor..].chars().next() {
            self.value.drain(self.cursor..self.cursor + next.len_utf8());
        }
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.value[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }
}
