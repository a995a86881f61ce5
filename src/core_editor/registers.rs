use std::collections::{HashMap, VecDeque};

/// Number of kill-ring slots kept before old cuts fall off.
const KILL_RING_SIZE: usize = 10;

/// Named cut/yank buffers plus the kill ring.
///
/// Cut text goes to the default register and rotates the kill ring, unless a
/// named register was selected with `vi-set-buffer`; the selection applies
/// to the next write or read only. `yank-pop` rotates the ring, which the
/// caller must gate on the previous command having been a paste.
#[derive(Debug, Default)]
pub struct Registers {
    ring: VecDeque<String>,
    named: HashMap<char, String>,
    active: Option<char>,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store cut/yanked text into the active register, or the default
    /// register (rotating the kill ring) when none is selected.
    pub fn write(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }
        match self.active.take() {
            Some(name) if name.is_ascii_uppercase() => {
                // Uppercase names append to their lowercase register.
                let entry = self
                    .named
                    .entry(name.to_ascii_lowercase())
                    .or_default();
                entry.push_str(content);
            }
            Some(name) => {
                self.named.insert(name, content.to_string());
            }
            None => {
                self.ring.push_front(content.to_string());
                self.ring.truncate(KILL_RING_SIZE);
            }
        }
    }

    /// Content to paste: the active register if selected, else the head of
    /// the kill ring.
    pub fn active(&mut self) -> String {
        match self.active.take() {
            Some(name) => self
                .named
                .get(&name.to_ascii_lowercase())
                .cloned()
                .unwrap_or_default(),
            None => self.ring.front().cloned().unwrap_or_default(),
        }
    }

    /// Select the register used by the next write or read only
    pub fn set_active(&mut self, name: char) {
        self.active = Some(name);
    }

    /// The selected register, if any
    pub fn selected(&self) -> Option<char> {
        self.active
    }

    /// Drop the register selection
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Rotate the kill ring and return the new head. Only meaningful right
    /// after a paste; the caller enforces that.
    pub fn pop_rotate(&mut self) -> Option<String> {
        if self.ring.len() > 1 {
            let head = self.ring.pop_front().expect("checked non-empty");
            self.ring.push_back(head);
        }
        self.ring.front().cloned()
    }

    /// All non-empty registers, for completion menus: the numbered ring
    /// slots first, then the named ones.
    pub fn dump(&self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .ring
            .iter()
            .enumerate()
            .map(|(i, content)| (i.to_string(), content.clone()))
            .collect();
        let mut named: Vec<_> = self.named.iter().collect();
        named.sort_by_key(|(name, _)| **name);
        all.extend(
            named
                .into_iter()
                .map(|(name, content)| (name.to_string(), content.clone())),
        );
        all
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_register_rotates_ring() {
        let mut registers = Registers::new();
        registers.write("first");
        registers.write("second");
        assert_eq!(registers.active(), "second");
        assert_eq!(registers.pop_rotate(), Some("first".to_string()));
        assert_eq!(registers.active(), "first");
    }

    #[test]
    fn named_register_round_trip() {
        let mut registers = Registers::new();
        registers.set_active('a');
        registers.write("hello");
        assert_eq!(registers.active(), ""); // selection was consumed by write
        registers.set_active('a');
        assert_eq!(registers.active(), "hello");
    }

    #[test]
    fn uppercase_appends() {
        let mut registers = Registers::new();
        registers.set_active('b');
        registers.write("one");
        registers.set_active('B');
        registers.write(" two");
        registers.set_active('b');
        assert_eq!(registers.active(), "one two");
    }

    #[test]
    fn ring_is_bounded() {
        let mut registers = Registers::new();
        for i in 0..20 {
            registers.write(&format!("cut{i}"));
        }
        assert_eq!(registers.dump().len(), KILL_RING_SIZE);
        assert_eq!(registers.active(), "cut19");
    }
}
