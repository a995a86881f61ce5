mod emacs;
mod keybindings;
mod vi;

pub use emacs::default_emacs_keybindings;
pub use keybindings::{Bind, Keybindings};
pub(crate) use keybindings::KeyMatch;
pub use vi::{
    default_vi_command_keybindings, default_vi_insert_keybindings, default_vi_isearch_keybindings,
    default_vi_opp_keybindings, default_vi_visual_keybindings,
};

use crate::commands::Command;
use crate::keys::Keys;

/// Which dispatch discipline the editor starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Non-modal, emacs-style dispatch
    #[default]
    Emacs,
    /// Modal, vi-style dispatch (starting in insert mode)
    Vi,
}

/// The active main keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainKeymap {
    Emacs,
    ViInsert,
    ViCommand,
    /// Command-mode variant used while a motion is read for a pending
    /// operator; shares the vi-command table.
    ViMove,
}

impl MainKeymap {
    /// Insert-style keymaps use append end-of-line semantics and the
    /// self-insert fallback for printable keys.
    pub fn is_insert_like(&self) -> bool {
        matches!(self, MainKeymap::Emacs | MainKeymap::ViInsert)
    }
}

/// The local keymap layered over the main one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalKeymap {
    #[default]
    None,
    /// Incremental search minibuffer
    Isearch,
    /// Visual selection
    Visual,
    /// Operator pending
    ViOpp,
}

/// The dispatch tables plus the mode and pending-operator state.
///
/// Transitions between keymaps are performed only by commands; the loop
/// itself never switches modes.
pub(crate) struct Keymaps {
    main: MainKeymap,
    local: LocalKeymap,
    default_main: MainKeymap,

    pub(crate) emacs: Keybindings,
    pub(crate) vi_insert: Keybindings,
    pub(crate) vi_command: Keybindings,
    visual: Keybindings,
    viopp: Keybindings,
    isearch: Keybindings,

    /// The operator waiting for a motion, and the cursor position at which
    /// it was invoked.
    pending: Option<Command>,
    /// Set while the registering dispatch is still running, so the
    /// operator does not complete against itself.
    pending_fresh: bool,
    /// The command currently being dispatched
    active: Option<Command>,
}

impl Keymaps {
    pub(crate) fn new(mode: EditMode) -> Self {
        let default_main = match mode {
            EditMode::Emacs => MainKeymap::Emacs,
            EditMode::Vi => MainKeymap::ViInsert,
        };
        Keymaps {
            main: default_main,
            local: LocalKeymap::None,
            default_main,
            emacs: default_emacs_keybindings(),
            vi_insert: default_vi_insert_keybindings(),
            vi_command: default_vi_command_keybindings(),
            visual: default_vi_visual_keybindings(),
            viopp: default_vi_opp_keybindings(),
            isearch: default_vi_isearch_keybindings(),
            pending: None,
            pending_fresh: false,
            active: None,
        }
    }

    pub(crate) fn main(&self) -> MainKeymap {
        self.main
    }

    pub(crate) fn local(&self) -> LocalKeymap {
        self.local
    }

    pub(crate) fn set_main(&mut self, main: MainKeymap) {
        self.main = main;
    }

    pub(crate) fn set_local(&mut self, local: LocalKeymap) {
        self.local = local;
    }

    /// Back to the startup keymap (loop init)
    pub(crate) fn reset(&mut self) {
        self.main = self.default_main;
        self.local = LocalKeymap::None;
        self.pending = None;
        self.pending_fresh = false;
        self.active = None;
    }

    pub(crate) fn is_emacs(&self) -> bool {
        self.default_main == MainKeymap::Emacs
    }

    /// Record a pending operator and enter operator-pending dispatch
    pub(crate) fn set_pending(&mut self, command: Command) {
        self.pending = Some(command);
        self.pending_fresh = true;
        self.local = LocalKeymap::ViOpp;
        self.main = MainKeymap::ViMove;
    }

    /// Take the pending operator unless it was registered by the dispatch
    /// still running: the operator completes on the *following* command.
    pub(crate) fn take_pending_stale(&mut self) -> Option<Command> {
        if self.pending_fresh {
            self.pending_fresh = false;
            return None;
        }
        self.take_pending()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending operator to re-dispatch it after a motion
    pub(crate) fn take_pending(&mut self) -> Option<Command> {
        let pending = self.pending.take();
        if pending.is_some() {
            self.local = LocalKeymap::None;
            self.main = MainKeymap::ViCommand;
        }
        pending
    }

    /// Drop the pending operator without running it
    pub(crate) fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            if self.local == LocalKeymap::ViOpp {
                self.local = LocalKeymap::None;
            }
            self.main = MainKeymap::ViCommand;
        }
    }

    /// The command currently being dispatched, if any
    pub(crate) fn active_command(&self) -> Option<Command> {
        self.active
    }

    pub(crate) fn set_active_command(&mut self, command: Option<Command>) {
        self.active = command;
    }

    /// Match the local keymap against the unread keys. A found binding
    /// consumes its sequence from the stream.
    pub(crate) fn match_local(&self, keys: &mut Keys) -> (Option<Bind>, bool) {
        let table = match self.local {
            LocalKeymap::None => return (None, false),
            LocalKeymap::Isearch => &self.isearch,
            LocalKeymap::Visual => &self.visual,
            LocalKeymap::ViOpp => &self.viopp,
        };
        Self::resolve(table.find(keys.unread()), keys)
    }

    /// Match the main keymap. Printable keys unbound in an insert-style
    /// keymap fall back to `self-insert`, the inputrc default binding.
    pub(crate) fn match_main(&self, keys: &mut Keys) -> (Option<Bind>, bool) {
        let table = match self.main {
            MainKeymap::Emacs => &self.emacs,
            MainKeymap::ViInsert => &self.vi_insert,
            MainKeymap::ViCommand | MainKeymap::ViMove => &self.vi_command,
        };

        let (bind, prefixed) = Self::resolve(table.find(keys.unread()), keys);
        if bind.is_some() || prefixed {
            return (bind, prefixed);
        }

        if self.main.is_insert_like() {
            if let Some(&first) = keys.unread().first() {
                if !first.is_control() {
                    keys.mark_matched(1);
                    return (Some(Bind::Command(Command::SelfInsert)), false);
                }
            }
        }
        (None, false)
    }

    fn resolve(found: KeyMatch, keys: &mut Keys) -> (Option<Bind>, bool) {
        match found {
            KeyMatch::Prefixed => (None, true),
            KeyMatch::Found(bind, consumed) => {
                keys.mark_matched(consumed);
                (Some(bind), false)
            }
            KeyMatch::None => (None, false),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vi_mode_state_machine_transitions() {
        let mut keymaps = Keymaps::new(EditMode::Vi);
        assert_eq!(keymaps.main(), MainKeymap::ViInsert);

        keymaps.set_main(MainKeymap::ViCommand);
        keymaps.set_pending(Command::ViDeleteTo);
        assert_eq!(keymaps.main(), MainKeymap::ViMove);
        assert_eq!(keymaps.local(), LocalKeymap::ViOpp);

        assert_eq!(keymaps.take_pending(), Some(Command::ViDeleteTo));
        assert_eq!(keymaps.main(), MainKeymap::ViCommand);
        assert_eq!(keymaps.local(), LocalKeymap::None);
        assert_eq!(keymaps.take_pending(), None);
    }

    #[test]
    fn self_insert_fallback_only_in_insert_keymaps() {
        let keymaps = Keymaps::new(EditMode::Vi);
        let mut keys = Keys::new();
        keys.feed(false, &['q']);
        let (bind, prefixed) = keymaps.match_main(&mut keys);
        assert_eq!(bind, Some(Bind::Command(Command::SelfInsert)));
        assert!(!prefixed);

        let mut keymaps = Keymaps::new(EditMode::Vi);
        keymaps.set_main(MainKeymap::ViCommand);
        let mut keys = Keys::new();
        keys.feed(false, &['\x06']); // an unbound control key
        let (bind, prefixed) = keymaps.match_main(&mut keys);
        assert_eq!(bind, None);
        assert!(!prefixed);
    }

    #[test]
    fn local_keymap_only_matches_when_layered() {
        let mut keymaps = Keymaps::new(EditMode::Vi);
        let mut keys = Keys::new();
        keys.feed(false, &['i', 'w']);
        assert_eq!(keymaps.match_local(&mut keys), (None, false));

        keymaps.set_local(LocalKeymap::Visual);
        let (bind, _) = keymaps.match_local(&mut keys);
        assert_eq!(bind, Some(Bind::Command(Command::SelectInWord)));
    }
}
