//! Zero-copy cursors over borrowed text.
//!
//! Every parser in the crate walks its input with one of two navigators:
//! - [`ByteNavigator`]: over raw bytes (responses, ISO 2709 buffers)
//! - [`CharNavigator`]: over decoded text, one character at a time
//!
//! Navigators never allocate and never panic. Reading past the end yields
//! `None` for single units and empty views for runs, so callers can treat
//! end-of-text like any other stop condition.
//!
//! # Examples
//!
//! ```
//! use irbis::navigator::ByteNavigator;
//!
//! let mut navigator = ByteNavigator::new(b"first\r\nsecond\nthird");
//! assert_eq!(navigator.read_line(), b"first");
//! assert_eq!(navigator.read_line(), b"second");
//! assert_eq!(navigator.read_line(), b"third");
//! assert!(navigator.eot());
//! assert_eq!(navigator.read_line(), b"");
//! ```

/// Cursor over a borrowed byte slice.
///
/// All returned slices borrow from the original buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteNavigator<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteNavigator<'a> {
    /// Create a navigator positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        ByteNavigator { data, position: 0 }
    }

    /// Create a navigator positioned at `position` (clamped to the end).
    #[must_use]
    pub fn at(data: &'a [u8], position: usize) -> Self {
        ByteNavigator {
            data,
            position: position.min(data.len()),
        }
    }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True once the cursor has reached the end of the buffer.
    #[must_use]
    pub fn eot(&self) -> bool {
        self.position >= self.data.len()
    }

    /// The byte under the cursor, without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Read the byte under the cursor and advance past it.
    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    /// The byte `distance` positions after the cursor (`0` is the current byte).
    #[must_use]
    pub fn look_ahead(&self, distance: usize) -> Option<u8> {
        self.position
            .checked_add(distance)
            .and_then(|index| self.data.get(index))
            .copied()
    }

    /// The byte `distance` positions before the cursor (`1` is the previous byte).
    #[must_use]
    pub fn look_behind(&self, distance: usize) -> Option<u8> {
        self.position
            .checked_sub(distance)
            .and_then(|index| self.data.get(index))
            .copied()
    }

    /// Read bytes while `predicate` holds.
    pub fn read_while<F>(&mut self, mut predicate: F) -> &'a [u8]
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.position;
        while let Some(byte) = self.peek() {
            if !predicate(byte) {
                break;
            }
            self.position += 1;
        }
        &self.data[start..self.position]
    }

    /// Read up to (not including) `stop`. The delimiter stays unread.
    pub fn read_until(&mut self, stop: u8) -> &'a [u8] {
        let rest = self.remaining();
        let length = memchr::memchr(stop, rest).unwrap_or(rest.len());
        self.position += length;
        &rest[..length]
    }

    /// Read up to `stop` and consume it. The delimiter is excluded from the result.
    pub fn read_to(&mut self, stop: u8) -> &'a [u8] {
        let result = self.read_until(stop);
        if !self.eot() {
            self.position += 1;
        }
        result
    }

    /// Read one line terminated by CR, LF, or CRLF, consuming the terminator.
    pub fn read_line(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        let Some(length) = memchr::memchr2(b'\r', b'\n', rest) else {
            self.position = self.data.len();
            return rest;
        };

        self.position += length;
        if self.read() == Some(b'\r') && self.peek() == Some(b'\n') {
            self.position += 1;
        }
        &rest[..length]
    }

    /// Skip ASCII whitespace.
    pub fn skip_whitespace(&mut self) {
        self.read_while(|byte| byte.is_ascii_whitespace());
    }

    /// Skip ASCII punctuation.
    pub fn skip_punctuation(&mut self) {
        self.read_while(|byte| byte.is_ascii_punctuation());
    }

    /// Sub-view of `length` bytes starting at `offset`, clamped to the buffer.
    #[must_use]
    pub fn slice(&self, offset: usize, length: usize) -> &'a [u8] {
        let start = offset.min(self.data.len());
        let end = start.saturating_add(length).min(self.data.len());
        &self.data[start..end]
    }

    /// Everything from the cursor to the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

/// Cursor over borrowed text, stepping whole characters.
///
/// Positions are byte offsets into the text and always sit on character
/// boundaries, so every view is a plain `&str`.
#[derive(Debug, Clone, Copy)]
pub struct CharNavigator<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> CharNavigator<'a> {
    /// Create a navigator positioned at the start of `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        CharNavigator { text, position: 0 }
    }

    /// Create a navigator at byte offset `position`, moved forward to the
    /// next character boundary and clamped to the end.
    #[must_use]
    pub fn at(text: &'a str, position: usize) -> Self {
        CharNavigator {
            text,
            position: char_boundary(text, position),
        }
    }

    /// Current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the underlying text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if the underlying text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True once the cursor has reached the end of the text.
    #[must_use]
    pub fn eot(&self) -> bool {
        self.position >= self.text.len()
    }

    /// The character under the cursor, without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Read the character under the cursor and advance past it.
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// The character `distance` characters after the cursor.
    #[must_use]
    pub fn look_ahead(&self, distance: usize) -> Option<char> {
        self.remaining().chars().nth(distance)
    }

    /// The character `distance` characters before the cursor.
    #[must_use]
    pub fn look_behind(&self, distance: usize) -> Option<char> {
        if distance == 0 {
            return self.peek();
        }
        self.text[..self.position].chars().rev().nth(distance - 1)
    }

    /// Read characters while `predicate` holds.
    pub fn read_while<F>(&mut self, mut predicate: F) -> &'a str
    where
        F: FnMut(char) -> bool,
    {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        &self.text[start..self.position]
    }

    /// Read up to (not including) `stop`. The delimiter stays unread.
    pub fn read_until(&mut self, stop: char) -> &'a str {
        self.read_while(|c| c != stop)
    }

    /// Read up to `stop` and consume it. The delimiter is excluded from the result.
    pub fn read_to(&mut self, stop: char) -> &'a str {
        let result = self.read_until(stop);
        self.read();
        result
    }

    /// Read one line terminated by CR, LF, or CRLF, consuming the terminator.
    pub fn read_line(&mut self) -> &'a str {
        let result = self.read_while(|c| c != '\r' && c != '\n');
        if self.read() == Some('\r') && self.peek() == Some('\n') {
            self.position += 1;
        }
        result
    }

    /// Skip whitespace characters.
    pub fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// Skip punctuation: anything that is neither alphanumeric, whitespace, nor control.
    pub fn skip_punctuation(&mut self) {
        self.read_while(|c| !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control());
    }

    /// Sub-view of `length` bytes starting at byte `offset`, clamped to the
    /// text. Both ends move forward to the next character boundary.
    #[must_use]
    pub fn slice(&self, offset: usize, length: usize) -> &'a str {
        let start = char_boundary(self.text, offset);
        let end = char_boundary(self.text, offset.saturating_add(length));
        &self.text[start..end]
    }

    /// Everything from the cursor to the end of the text.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.text[self.position..]
    }
}

/// `position` clamped to `text` and moved forward to a character boundary.
fn char_boundary(text: &str, position: usize) -> usize {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position += 1;
    }
    position
}
