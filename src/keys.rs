use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// The escape code point, starting every multi-key terminal sequence.
pub(crate) const ESCAPE: char = '\x1b';

/// Translate a key event into the code points a character-mode terminal
/// would have sent for it.
///
/// The keymaps match on these sequences, so the encoding must agree with
/// the inputrc escape notation: C0 controls for `\C-x`, an escape prefix
/// for `\M-x`, and CSI sequences for the navigation keys.
pub(crate) fn encode_key_event(event: &KeyEvent) -> Vec<char> {
    if event.kind == KeyEventKind::Release {
        return Vec::new();
    }

    let mut seq = Vec::new();
    if event.modifiers.contains(KeyModifiers::ALT) {
        seq.push(ESCAPE);
    }

    match event.code {
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(ctrl) = control_code(c) {
                seq.push(ctrl);
            }
        }
        KeyCode::Char(c) => seq.push(c),
        KeyCode::Enter => seq.push('\r'),
        KeyCode::Tab => seq.push('\t'),
        KeyCode::BackTab => seq.extend([ESCAPE, '[', 'Z']),
        KeyCode::Backspace => seq.push('\x7f'),
        KeyCode::Esc => seq.push(ESCAPE),
        KeyCode::Up => seq.extend([ESCAPE, '[', 'A']),
        KeyCode::Down => seq.extend([ESCAPE, '[', 'B']),
        KeyCode::Right => seq.extend([ESCAPE, '[', 'C']),
        KeyCode::Left => seq.extend([ESCAPE, '[', 'D']),
        KeyCode::Home => seq.extend([ESCAPE, '[', 'H']),
        KeyCode::End => seq.extend([ESCAPE, '[', 'F']),
        KeyCode::Delete => seq.extend([ESCAPE, '[', '3', '~']),
        KeyCode::Insert => seq.extend([ESCAPE, '[', '2', '~']),
        KeyCode::PageUp => seq.extend([ESCAPE, '[', '5', '~']),
        KeyCode::PageDown => seq.extend([ESCAPE, '[', '6', '~']),
        _ => {
            // Unencodable keys (function keys, media keys) are dropped; a
            // lone modifier prefix must not leak into the stream.
            seq.clear();
        }
    }
    seq
}

fn control_code(c: char) -> Option<char> {
    match c.to_ascii_lowercase() {
        c @ 'a'..='z' => Some((c as u8 - b'a' + 1) as char),
        '@' | ' ' => Some('\0'),
        '[' => Some('\x1b'),
        '\\' => Some('\x1c'),
        ']' => Some('\x1d'),
        '^' => Some('\x1e'),
        '_' | '/' => Some('\x1f'),
        '?' => Some('\x7f'),
        _ => None,
    }
}

/// The pending input sequence.
///
/// Keys accumulate here as they are decoded; the keymap matchers peek at
/// the unread region without consuming, then mark the exact sequence a
/// command was dispatched for as matched. Matched keys stay visible to the
/// command (several vi commands inspect the key that invoked them) and are
/// flushed at the top of the next loop iteration, after the macro recorder
/// has seen them.
#[derive(Debug, Default)]
pub(crate) struct Keys {
    buf: Vec<char>,
    matched: usize,
}

impl Keys {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append keys at the back (normal input) or the front (macro replay,
    /// which must run before any key already waiting).
    pub(crate) fn feed(&mut self, front: bool, keys: &[char]) {
        if front {
            self.buf.splice(self.matched..self.matched, keys.iter().copied());
        } else {
            self.buf.extend_from_slice(keys);
        }
    }

    /// True when at least one unmatched key is waiting
    pub(crate) fn has_unread(&self) -> bool {
        self.buf.len() > self.matched
    }

    /// The unmatched region the keymaps match against
    pub(crate) fn unread(&self) -> &[char] {
        &self.buf[self.matched..]
    }

    /// Mark the first `n` unread keys as consumed by the dispatched command
    pub(crate) fn mark_matched(&mut self, n: usize) {
        self.matched = (self.matched + n).min(self.buf.len());
    }

    /// Consume everything; used when a sequence resolves to no binding
    pub(crate) fn mark_all_matched(&mut self) {
        self.matched = self.buf.len();
    }

    /// The keys consumed for the currently dispatched command
    pub(crate) fn matched_keys(&self) -> &[char] {
        &self.buf[..self.matched]
    }

    /// The key that invoked the running command (last matched)
    pub(crate) fn caller_key(&self) -> Option<char> {
        self.matched_keys().last().copied()
    }

    /// Pop one key from the unread region (argument reads)
    pub(crate) fn pop_unread(&mut self) -> Option<char> {
        if self.has_unread() {
            Some(self.buf.remove(self.matched))
        } else {
            None
        }
    }

    /// Drop the matched region. Returns the flushed keys so the caller can
    /// hand them to the macro recorder first.
    pub(crate) fn flush_matched(&mut self) -> Vec<char> {
        let flushed: Vec<char> = self.buf.drain(..self.matched).collect();
        self.matched = 0;
        flushed
    }

    /// Forget all pending input (loop init)
    pub(crate) fn reset(&mut self) {
        self.buf.clear();
        self.matched = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[rstest]
    #[case(press(KeyCode::Char('a'), KeyModifiers::NONE), vec!['a'])]
    #[case(press(KeyCode::Char('r'), KeyModifiers::CONTROL), vec!['\x12'])]
    #[case(press(KeyCode::Char('f'), KeyModifiers::ALT), vec![ESCAPE, 'f'])]
    #[case(press(KeyCode::Up, KeyModifiers::NONE), vec![ESCAPE, '[', 'A'])]
    #[case(press(KeyCode::Enter, KeyModifiers::NONE), vec!['\r'])]
    #[case(press(KeyCode::Backspace, KeyModifiers::NONE), vec!['\x7f'])]
    #[case(press(KeyCode::F(5), KeyModifiers::NONE), vec![])]
    fn encoding_matches_terminal_sequences(
        #[case] event: KeyEvent,
        #[case] expected: Vec<char>,
    ) {
        assert_eq!(encode_key_event(&event), expected);
    }

    #[test]
    fn matched_keys_survive_until_flush() {
        let mut keys = Keys::new();
        keys.feed(false, &['d', 'w']);
        assert_eq!(keys.unread(), &['d', 'w']);
        keys.mark_matched(2);
        assert!(!keys.has_unread());
        assert_eq!(keys.caller_key(), Some('w'));
        assert_eq!(keys.flush_matched(), vec!['d', 'w']);
        assert_eq!(keys.caller_key(), None);
    }

    #[test]
    fn macro_replay_prepends_before_waiting_input() {
        let mut keys = Keys::new();
        keys.feed(false, &['x']);
        keys.feed(true, &['a', 'b']);
        assert_eq!(keys.unread(), &['a', 'b', 'x']);
    }

    #[test]
    fn pop_unread_skips_matched_region() {
        let mut keys = Keys::new();
        keys.feed(false, &['f', 'z']);
        keys.mark_matched(1);
        assert_eq!(keys.pop_unread(), Some('z'));
        assert_eq!(keys.pop_unread(), None);
        assert_eq!(keys.matched_keys(), &['f']);
    }
}
