//! Editable command buffer.

/// Characters being edited, the cursor index into them, and the surface offset where the
/// prompt ends.
///
/// Invariant: `cursor <= chars.len()`. `command_start` is fixed once the prompt is drawn and
/// only moves by an explicit [`EditBuffer::translate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    command_start: usize,
}

impl EditBuffer {
    pub fn new(command_start: usize) -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
            command_start,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn command_start(&self) -> usize {
        self.command_start
    }

    pub fn set_command_start(&mut self, offset: usize) {
        self.command_start = offset;
    }

    /// Shift `command_start` by a signed delta.
    pub fn translate(&mut self, delta: isize) {
        self.command_start = crate::core::cursor::shift_offset(self.command_start, delta);
    }

    /// Surface offset of buffer index `index`.
    pub fn surface_offset(&self, index: usize) -> usize {
        self.command_start + index
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Text from `index` to the end of the buffer.
    pub fn tail(&self, index: usize) -> String {
        self.chars[index.min(self.chars.len())..].iter().collect()
    }

    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    /// Remove the character before the cursor. Returns whether anything changed.
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Remove the character under the cursor. Returns whether anything changed.
    pub fn delete_at(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_to(self.cursor.saturating_sub(1))
    }

    pub fn move_right(&mut self) -> bool {
        self.move_to(self.cursor + 1)
    }

    pub fn move_home(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn move_end(&mut self) -> bool {
        self.move_to(self.chars.len())
    }

    /// Move the cursor, clamped to `[0, len]`. Returns whether it moved.
    pub fn move_to(&mut self, index: usize) -> bool {
        let target = index.min(self.chars.len());
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    /// Replace the whole text and put the cursor at the end.
    ///
    /// Returns the length of the prefix shared with the previous text, which is where the
    /// redraw has to start.
    pub fn replace(&mut self, text: &str) -> usize {
        let next: Vec<char> = text.chars().collect();
        let shared = self
            .chars
            .iter()
            .zip(next.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.chars = next;
        self.cursor = self.chars.len();
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::EditBuffer;

    fn buffer_with(text: &str) -> EditBuffer {
        let mut buffer = EditBuffer::new(2);
        for ch in text.chars() {
            buffer.insert(ch);
        }
        buffer
    }

    #[test]
    fn insert_in_the_middle() {
        let mut buffer = buffer_with("helo");
        buffer.move_to(3);
        buffer.insert('l');
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn delete_before_at_start_is_noop() {
        let mut buffer = buffer_with("ab");
        buffer.move_home();
        assert!(!buffer.delete_before());
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn delete_at_end_is_noop() {
        let mut buffer = buffer_with("ab");
        assert!(!buffer.delete_at());
        buffer.move_left();
        assert!(buffer.delete_at());
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn cursor_moves_are_clamped() {
        let mut buffer = buffer_with("ab");
        assert!(!buffer.move_right());
        buffer.move_home();
        assert!(!buffer.move_left());
        assert!(buffer.move_to(99));
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn replace_reports_shared_prefix() {
        let mut buffer = buffer_with("open tree.nwk");
        assert_eq!(buffer.replace("open tree.tre"), 10);
        assert_eq!(buffer.cursor(), 13);
        assert_eq!(buffer.replace(""), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn translate_shifts_command_start() {
        let mut buffer = buffer_with("x");
        buffer.translate(40);
        assert_eq!(buffer.surface_offset(1), 43);
        buffer.translate(-50);
        assert_eq!(buffer.command_start(), 0);
    }
}
