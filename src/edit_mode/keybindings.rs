use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::inputrc::unescape;

/// What a key sequence is bound to: a named command, or a macro whose
/// expansion is fed back into the key stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bind {
    /// Dispatch a named command
    Command(Command),
    /// Replay a key sequence (stored escaped, inputrc-style)
    Macro(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Keybinding {
    seq: Vec<char>,
    bind: Bind,
}

/// Result of matching the pending keys against one bindings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyMatch {
    /// The pending keys are a strict prefix of at least one binding;
    /// nothing is consumed, the caller waits for more input.
    Prefixed,
    /// A binding matched; `usize` is the number of keys it consumes.
    Found(Bind, usize),
    /// No binding is concerned by the pending keys.
    None,
}

/// One dispatch table: key sequences (code points, unescaped) to binds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keybindings {
    bindings: Vec<Keybinding>,
}

impl Keybindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an inputrc-notation sequence (`\C-x`, `\M-x`, `\e[A`, literals)
    /// to a command.
    pub fn bind(&mut self, seq: &str, command: Command) {
        self.bind_raw(unescape(seq), Bind::Command(command));
    }

    /// Bind a sequence to a macro expansion (kept escaped until replay)
    pub fn bind_macro(&mut self, seq: &str, expansion: &str) {
        self.bind_raw(unescape(seq), Bind::Macro(expansion.to_string()));
    }

    /// Bind an already-unescaped code point sequence
    pub fn bind_raw(&mut self, seq: Vec<char>, bind: Bind) {
        if seq.is_empty() {
            return;
        }
        // Rebinding replaces the previous target.
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.seq == seq) {
            existing.bind = bind;
            return;
        }
        self.bindings.push(Keybinding { seq, bind });
    }

    /// Remove a binding
    pub fn unbind(&mut self, seq: &str) {
        let seq = unescape(seq);
        self.bindings.retain(|b| b.seq != seq);
    }

    /// Match the unread keys.
    ///
    /// The longest binding fully contained at the start of `unread` wins and
    /// consumes exactly its sequence. When nothing is contained yet but the
    /// unread keys are a strict prefix of some binding, the caller must wait
    /// for more keys. Terminal escape sequences arrive atomically from the
    /// event decoder, so an exact match is never held back waiting for a
    /// longer one.
    pub(crate) fn find(&self, unread: &[char]) -> KeyMatch {
        if unread.is_empty() {
            return KeyMatch::None;
        }

        let mut found: Option<&Keybinding> = None;
        let mut prefixed = false;

        for binding in &self.bindings {
            if binding.seq.len() <= unread.len() {
                if unread[..binding.seq.len()] == binding.seq[..]
                    && found.map_or(true, |prev| prev.seq.len() < binding.seq.len())
                {
                    found = Some(binding);
                }
            } else if binding.seq[..unread.len()] == unread[..] {
                prefixed = true;
            }
        }

        match found {
            Some(binding) => KeyMatch::Found(binding.bind.clone(), binding.seq.len()),
            None if prefixed => KeyMatch::Prefixed,
            None => KeyMatch::None,
        }
    }

    /// Whether a sequence is bound
    pub fn get(&self, seq: &str) -> Option<&Bind> {
        let seq = unescape(seq);
        self.bindings.iter().find(|b| b.seq == seq).map(|b| &b.bind)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Keybindings {
        let mut bindings = Keybindings::new();
        bindings.bind(r"\C-a", Command::BeginningOfLine);
        bindings.bind(r"\e[A", Command::PreviousHistory);
        bindings.bind("d", Command::ViDeleteTo);
        bindings.bind("iw", Command::SelectInWord);
        bindings
    }

    #[test]
    fn exact_match_consumes_its_sequence() {
        let bindings = table();
        assert_eq!(
            bindings.find(&['\x01', 'x']),
            KeyMatch::Found(Bind::Command(Command::BeginningOfLine), 1)
        );
    }

    #[test]
    fn longest_contained_binding_wins() {
        let bindings = table();
        assert_eq!(
            bindings.find(&['\x1b', '[', 'A']),
            KeyMatch::Found(Bind::Command(Command::PreviousHistory), 3)
        );
    }

    #[test]
    fn strict_prefix_waits_for_more_keys() {
        let bindings = table();
        assert_eq!(bindings.find(&['i']), KeyMatch::Prefixed);
        assert_eq!(
            bindings.find(&['i', 'w']),
            KeyMatch::Found(Bind::Command(Command::SelectInWord), 2)
        );
    }

    #[test]
    fn unconcerned_keys_do_not_match() {
        let bindings = table();
        assert_eq!(bindings.find(&['z']), KeyMatch::None);
        assert_eq!(bindings.find(&[]), KeyMatch::None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut bindings = table();
        bindings.bind("d", Command::DeleteChar);
        assert_eq!(
            bindings.find(&['d']),
            KeyMatch::Found(Bind::Command(Command::DeleteChar), 1)
        );
    }
}
