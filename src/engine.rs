use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal;
use nu_ansi_term::Style;

use crate::commands::Command;
use crate::completion::{BufferView, Completer, CompletionEngine, DefaultCompleter};
use crate::core_editor::{Editor, Iterations, LineBuffer, Registers};
use crate::edit_mode::{Bind, EditMode, Keymaps, LocalKeymap, MainKeymap};
use crate::enums::{AcceptKind, Signal};
use crate::highlighter::{Highlighter, NoopHighlighter};
use crate::hint::Hint;
use crate::history::{FileBackedHistory, History, Sources};
use crate::inputrc::{self, Config};
use crate::keys::{encode_key_event, Keys, ESCAPE};
use crate::macros::MacroEngine;
use crate::painting::{CursorShape, PaintView, Painter};
use crate::prompt::Prompt;
use crate::result::Result;

/// Scoped raw-mode acquisition; restores the terminal on every exit path,
/// panics included.
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// What one dispatch round did.
pub(crate) enum Dispatch {
    /// The line was accepted; the loop returns
    Signal(Signal),
    /// A command ran (or keys were consumed); keep looping
    Continue,
    /// The pending keys are a prefix of a longer binding; wait for more
    Pending,
}

/// The line editor.
///
/// Owns every component for the whole process lifetime; the parts are
/// reset, not reallocated, at the start of each accept cycle. All mutation
/// funnels through the single read loop.
pub struct Shell {
    pub(crate) editor: Editor,
    pub(crate) keys: Keys,
    pub(crate) iterations: Iterations,
    pub(crate) registers: Registers,
    pub(crate) keymaps: Keymaps,
    pub(crate) histories: Sources,
    pub(crate) completion: CompletionEngine,
    pub(crate) macros: MacroEngine,
    pub(crate) hint: Hint,
    pub(crate) painter: Painter,
    pub(crate) config: Config,

    pub(crate) completer: Box<dyn Completer>,
    highlighter: Box<dyn Highlighter>,
    accept_multiline: Option<Box<dyn Fn(&LineBuffer) -> bool + Send>>,

    /// Previous dispatched command, gating yank-pop style behavior
    pub(crate) last_command: Option<Command>,
    /// Span of the last paste in the line, replaced by yank-pop
    pub(crate) last_yank: Option<(usize, usize)>,
    /// Painting can be disabled for headless use (tests)
    interactive: bool,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Shell {
            editor: Editor::new(),
            keys: Keys::new(),
            iterations: Iterations::new(),
            registers: Registers::new(),
            keymaps: Keymaps::new(EditMode::Emacs),
            histories: Sources::new(),
            completion: CompletionEngine::new(),
            macros: MacroEngine::new(),
            hint: Hint::new(),
            painter: Painter::new(),
            config: Config::new(),
            completer: Box::new(DefaultCompleter),
            highlighter: Box::new(NoopHighlighter),
            accept_multiline: None,
            last_command: None,
            last_yank: None,
            interactive: true,
        }
    }

    //
    // Builder surface ------------------------------------------------------
    //

    /// Choose the dispatch discipline (emacs or vi)
    pub fn with_edit_mode(mut self, mode: EditMode) -> Self {
        self.keymaps = Keymaps::new(mode);
        let name = match mode {
            EditMode::Emacs => "emacs",
            EditMode::Vi => "vi",
        };
        self.config.set_from_str("editing-mode", name);
        self
    }

    /// Register the completion callback
    pub fn with_completer(mut self, completer: Box<dyn Completer>) -> Self {
        self.completer = completer;
        self
    }

    /// Register the syntax highlighter
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Register the multiline-accept predicate: returning `false` turns
    /// Enter into a newline insertion instead of accepting the line.
    pub fn with_accept_multiline(
        mut self,
        accept: Box<dyn Fn(&LineBuffer) -> bool + Send>,
    ) -> Self {
        self.accept_multiline = Some(accept);
        self
    }

    /// Bind a history source under a name
    pub fn with_history(mut self, name: impl Into<String>, source: Box<dyn History>) -> Self {
        self.histories.add(name, source);
        self
    }

    /// Bind a file-backed history source under a name
    pub fn with_history_file(mut self, name: impl Into<String>, path: &Path) -> Result<Self> {
        let source = FileBackedHistory::with_file(path.to_path_buf())?;
        self.histories.add(name, Box::new(source));
        Ok(self)
    }

    /// Remove history sources by name (all of them without names)
    pub fn delete_history(&mut self, names: &[&str]) {
        self.histories.delete(names);
    }

    /// Make the next/previous history source the active one
    pub fn cycle_history_source(&mut self, next: bool) {
        self.histories.cycle(next);
    }

    /// Load inputrc-style configuration text: `set` options and bindings
    pub fn load_inputrc_str(&mut self, text: &str) -> Result<()> {
        let mut tables = inputrc::BindingTables {
            emacs: &mut self.keymaps.emacs,
            vi_insert: &mut self.keymaps.vi_insert,
            vi_command: &mut self.keymaps.vi_command,
        };
        inputrc::parse(text, &mut self.config, &mut tables)
    }

    /// Load an inputrc file
    pub fn load_inputrc(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_inputrc_str(&text)
    }

    /// The option store
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    //
    // Buffer views ---------------------------------------------------------
    //

    /// The editor the dispatched commands act on: the search minibuffer or
    /// the virtually completed line take precedence over the real one.
    pub(crate) fn active_editor_mut(&mut self) -> &mut Editor {
        match self.completion.view() {
            BufferView::Minibuffer => self
                .completion
                .minibuffer_mut()
                .expect("minibuffer view implies a minibuffer"),
            BufferView::Completed => self
                .completion
                .virtual_mut()
                .expect("completed view implies a virtual line"),
            BufferView::Real => &mut self.editor,
        }
    }

    /// Snapshot of the real line for history bookkeeping
    pub(crate) fn save_history(&mut self) {
        self.histories.save(&self.editor);
    }

    //
    // The read loop --------------------------------------------------------
    //

    /// Display the prompt and block reading one line of user input.
    ///
    /// Returns on acceptance (usually Enter) or when a bound command
    /// signals interrupt/end-of-file; terminal errors abort the loop.
    pub fn read_line(&mut self, prompt: &dyn Prompt) -> Result<Signal> {
        let _guard = TerminalGuard::acquire()?;
        self.painter.initialize_prompt_position()?;
        self.read_line_inner(prompt)
    }

    fn read_line_inner(&mut self, prompt: &dyn Prompt) -> Result<Signal> {
        self.init();

        loop {
            self.refresh(prompt)?;
            self.wait_keys()?;

            match self.dispatch_once(prompt)? {
                Dispatch::Signal(signal) => return Ok(signal),
                Dispatch::Continue | Dispatch::Pending => {}
            }
        }
    }

    /// One dispatch round over the pending keys: flush what the previous
    /// command consumed, then local keymap, virtual-insertion commit, main
    /// keymap, undefined-key handling. The ordering is a hard contract.
    pub(crate) fn dispatch_once(&mut self, prompt: &dyn Prompt) -> Result<Dispatch> {
        // Record consumed keys into the macro engine before flushing them.
        self.macros.record(self.keys.matched_keys());
        self.keys.flush_matched();

        if !self.keys.has_unread() {
            return Ok(Dispatch::Continue);
        }

        // 1 - Local keymap (isearch/visual/operator-pending)
        let (bind, prefixed) = self.keymaps.match_local(&mut self.keys);
        if prefixed {
            return Ok(Dispatch::Pending);
        }
        let ran_local = matches!(bind, Some(Bind::Command(_)));
        if let Some(signal) = self.run(bind, prompt)? {
            return Ok(Dispatch::Signal(signal));
        }
        if ran_local {
            return Ok(Dispatch::Continue);
        }

        // Past the local keymap the next command acts on the line itself,
        // so any virtually inserted candidate is committed first.
        self.completion.update_inserted(&mut self.editor);

        // 2 - Main keymap
        let (bind, prefixed) = self.keymaps.match_main(&mut self.keys);
        if prefixed {
            return Ok(Dispatch::Pending);
        }
        let ran_main = bind.is_some();
        if let Some(signal) = self.run(bind, prompt)? {
            return Ok(Dispatch::Signal(signal));
        }

        if !ran_main {
            self.handle_undefined();
        }
        Ok(Dispatch::Continue)
    }

    /// init gathers all steps to perform at the beginning of the loop
    fn init(&mut self) {
        self.keys.reset();
        self.editor.reset();
        self.registers.reset();
        self.histories.reset();
        self.histories.save(&self.editor);
        self.iterations.reset();

        // accept-and-hold / infer reposition the buffer outright.
        self.histories
            .init(&mut self.editor, &mut self.hint, &self.config);

        self.hint.reset();
        self.hint.reset_persist();
        self.completion.hard_reset();
        self.keymaps.reset();
        self.last_command = None;
        self.last_yank = None;
    }

    /// Run a matched bind: macros replay through the key stream, commands
    /// dispatch with the pending-operator and history bookkeeping around
    /// them.
    fn run(&mut self, bind: Option<Bind>, prompt: &dyn Prompt) -> Result<Option<Signal>> {
        let command = match bind {
            Some(Bind::Macro(expansion)) => {
                let replay = inputrc::unescape(&expansion);
                self.keys.feed(true, &replay);
                None
            }
            Some(Bind::Command(command)) => Some(command),
            None => None,
        };
        let Some(command) = command else {
            return Ok(None);
        };

        self.keymaps.set_active_command(Some(command));
        self.execute(command);
        self.keymaps.set_active_command(None);

        // A command that is not completion navigation moves past the
        // completion menu: drop it so no stale candidates linger.
        if !command.is_completion_nav()
            && self.completion.is_active()
            && self.completion.view() == BufferView::Real
        {
            self.completion.reset();
        }

        // Iteration/register hints, then isearch refiltering.
        self.update_post_run_hints();
        let width = self.painter.screen_width() as usize;
        self.completion
            .update_isearch(&self.config, width, &mut self.hint);

        // Save the command to the per-line history; then ask the history
        // system whether the line was accepted.
        self.histories.save_with_command(Some(command));
        self.last_command = Some(command);

        if let Some((line, kind)) = self.histories.line_accepted(&self.config) {
            self.finish_display(&line, prompt)?;
            let signal = match kind {
                AcceptKind::Enter => Signal::Success(line),
                AcceptKind::Interrupt => Signal::CtrlC,
                AcceptKind::EndOfFile => Signal::CtrlD,
            };
            return Ok(Some(signal));
        }
        Ok(None)
    }

    fn execute(&mut self, command: Command) {
        self.run_command(command);

        // Pending operators complete on the first command that did not
        // touch the iteration count.
        if !self.iterations.is_pending() {
            if let Some(pending) = self.keymaps.take_pending_stale() {
                self.run_command(pending);
            }
        }

        // Enforce the end-of-line semantics of the active main keymap.
        let command_mode = matches!(
            self.keymaps.main(),
            MainKeymap::ViCommand | MainKeymap::ViMove
        );
        let editor = self.active_editor_mut();
        if command_mode {
            editor.cursor.check_command(&editor.line);
        } else {
            editor.cursor.check_append(&editor.line);
        }
    }

    fn update_post_run_hints(&mut self) {
        let iteration_hint = self.iterations.hint();
        self.iterations.end_of_dispatch();
        let register = self.registers.selected();

        if let Some(text) = iteration_hint {
            self.hint.persist(text);
        } else if let Some(register) = register {
            self.hint
                .persist(Style::new().dimmed().paint(format!("(register: {register})")).to_string());
        } else if self.macros.recording() {
            self.hint
                .persist(Style::new().dimmed().paint("(recording)").to_string());
        } else {
            self.hint.reset_persist();
        }
    }

    /// Undefined keys are silently consumed, except in incremental search
    /// where they cancel the search as a convenience.
    fn handle_undefined(&mut self) {
        if self.keymaps.local() == LocalKeymap::Isearch {
            self.hint.reset();
            self.completion
                .isearch_stop(false, &mut self.editor, &mut self.keymaps);
        }
        self.keys.mark_all_matched();
    }

    //
    // Terminal I/O ---------------------------------------------------------
    //

    /// Block until at least one key is decoded, draining whatever arrived
    /// in one burst. Resizes reposition the painter and keep waiting.
    fn wait_keys(&mut self) -> Result<()> {
        if !self.interactive {
            return Ok(());
        }
        loop {
            self.consume_event(event::read()?);
            while event::poll(Duration::ZERO)? {
                self.consume_event(event::read()?);
            }
            if self.keys.has_unread() {
                return Ok(());
            }
        }
    }

    fn consume_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                let seq = encode_key_event(&key);
                self.keys.feed(false, &seq);
            }
            Event::Resize(width, height) => self.painter.handle_resize(width, height),
            _ => {}
        }
    }

    /// Read one more key for a command argument (`f`, `r`, registers...).
    /// Escape aborts and returns `None`.
    pub(crate) fn read_arg_key(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.keys.pop_unread() {
                return (c != ESCAPE).then_some(c);
            }
            if !self.interactive || self.wait_keys().is_err() {
                return None;
            }
        }
    }

    fn refresh(&mut self, prompt: &dyn Prompt) -> Result<()> {
        if !self.interactive {
            self.hint.reset();
            return Ok(());
        }

        let editor = self.completion.display_editor(&self.editor);
        let line_plain = editor.line.to_string();
        let cursor_pos = editor.cursor.pos();
        let mut line_styled = self.highlighter.highlight(&line_plain, cursor_pos).render();

        // Autosuggested remainder, shown dim at the end of the real line.
        if self.config.get_bool("history-autosuggest")
            && self.completion.view() == BufferView::Real
            && cursor_pos == editor.line.len()
        {
            if let Some(suggested) = self.histories.suggest(&line_plain) {
                let remainder = &suggested[line_plain.len()..];
                line_styled += &Style::new().dimmed().paint(remainder).to_string();
            }
        }

        let max_rows = (self.painter.screen_height() as usize / 2).clamp(3, 15);
        let menu = self.completion.menu_lines(max_rows);

        let primary = prompt.render_primary().to_string();
        let secondary = prompt.render_secondary().to_string();
        let right = prompt.render_right().to_string();
        let cursor_shape = if self.keymaps.main().is_insert_like() {
            CursorShape::Line
        } else {
            CursorShape::Block
        };
        let view = PaintView {
            prompt: &primary,
            prompt_right: &right,
            secondary: &secondary,
            line_styled: &line_styled,
            line_plain: &line_plain,
            cursor_pos,
            cursor_shape,
            hint: self.hint.current(),
            menu: &menu,
        };
        self.painter.repaint(&view)?;
        self.hint.reset();
        Ok(())
    }

    fn finish_display(&mut self, line: &str, prompt: &dyn Prompt) -> Result<()> {
        if !self.interactive {
            return Ok(());
        }
        if self.config.get_bool("prompt-transient") {
            let transient = prompt.render_transient().to_string();
            let tooltip = prompt.render_tooltip().to_string();
            self.painter.repaint_transient(&transient, &tooltip, line)
        } else {
            self.painter.finish_line()
        }
    }

    //
    // Shared command plumbing ---------------------------------------------
    //

    /// Accept the line: commit or resolve any search state first, consult
    /// the multiline predicate, then set the accept flags.
    pub(crate) fn accept_line_with(&mut self, infer: bool, hold: bool) {
        self.accept_with_kind(infer, hold, AcceptKind::Enter);
    }

    pub(crate) fn accept_with_kind(&mut self, infer: bool, hold: bool, kind: AcceptKind) {
        // An open isearch commits its shown match into the real line.
        if self.completion.isearching() {
            self.completion
                .isearch_stop(true, &mut self.editor, &mut self.keymaps);
        }

        // A non-incremental search resolves its query against the history
        // instead of accepting the line.
        if let Some(search) = self.completion.non_searching() {
            let (query, query_cursor) = self.completion.minibuffer_query();
            self.histories.insert_match(
                &query,
                query_cursor,
                &mut self.editor,
                true,
                search.forward,
                search.substring,
            );
            self.completion
                .non_isearch_stop(&mut self.keymaps, &mut self.hint);
            if self.keymaps.main() == MainKeymap::ViCommand {
                self.editor.cursor.check_command(&self.editor.line);
            }
            return;
        }

        // A virtually inserted candidate becomes real before accepting.
        self.completion.update_inserted(&mut self.editor);

        if kind == AcceptKind::Enter {
            if let Some(accept) = &self.accept_multiline {
                if !accept(&self.editor.line) {
                    let pos = self.editor.cursor.pos();
                    self.editor.line.insert_char(pos, '\n');
                    self.editor.cursor.inc(&self.editor.line);
                    return;
                }
            }
        }

        self.histories.accept(
            hold,
            infer,
            kind,
            &self.editor,
            &mut self.hint,
            &self.config,
        );
    }

    /// Open a completion menu over the history lines, optionally entering
    /// incremental-search mode on it.
    pub(crate) fn history_completion(&mut self, forward: bool, filter: bool, isearch: bool) {
        let values = self
            .histories
            .complete(forward, filter, &self.editor, &mut self.hint);
        if values.is_empty() {
            return;
        }

        let width = self.painter.screen_width() as usize;
        self.completion
            .start_with_values(values, &self.editor, &self.config, width);

        if isearch {
            let name = self.histories.name().to_string();
            self.completion.isearch_start(
                &name,
                true,
                &self.editor,
                &mut self.keymaps,
                &mut self.hint,
            );
        } else {
            self.completion.select(1, 0);
        }
    }

    /// Run the host completer over the current line and open the menu
    pub(crate) fn completer_menu(&mut self) {
        let line = self.editor.line.to_string();
        let pos = self.editor.cursor.pos();
        let values = self.completer.complete(&line, pos);
        if values.is_empty() {
            return;
        }
        let width = self.painter.screen_width() as usize;
        self.completion
            .start_with_values(values, &self.editor, &self.config, width);
    }

    #[cfg(test)]
    pub(crate) fn headless(mut self) -> Self {
        self.interactive = false;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::prompt::DefaultPrompt;
    use pretty_assertions::assert_eq;

    fn shell(mode: EditMode, history: &[&str]) -> Shell {
        let mut shell = Shell::new().with_edit_mode(mode).headless();
        if !history.is_empty() {
            shell.histories.add(
                "test",
                Box::new(MemoryHistory::with_lines(history.iter().copied())),
            );
        }
        shell.init();
        shell
    }

    fn drive(shell: &mut Shell, keys: &str) -> Option<Signal> {
        let prompt = DefaultPrompt::default();
        let content: Vec<char> = keys.chars().collect();
        shell.keys.feed(false, &content);
        loop {
            match shell.dispatch_once(&prompt).expect("headless dispatch") {
                Dispatch::Signal(signal) => return Some(signal),
                Dispatch::Pending => return None,
                Dispatch::Continue if !shell.keys.has_unread() => return None,
                Dispatch::Continue => {}
            }
        }
    }

    #[test]
    fn typed_line_is_returned_and_stored() {
        let mut shell = shell(EditMode::Emacs, &[]);
        let signal = drive(&mut shell, "hello\r");
        assert_eq!(signal, Some(Signal::Success("hello".to_string())));
        assert_eq!(shell.histories.current().unwrap().len(), 1);
        assert_eq!(
            shell.histories.current().unwrap().get_line(0).unwrap(),
            "hello"
        );
    }

    #[test]
    fn up_arrows_walk_to_most_recent_first() {
        let mut shell = shell(EditMode::Emacs, &["hello", "help"]);
        let signal = drive(&mut shell, "\x1b[A\x1b[A\r");
        assert_eq!(signal, Some(Signal::Success("hello".to_string())));
    }

    #[test]
    fn ctrl_u_kills_line_and_undo_restores_it() {
        let mut shell = shell(EditMode::Emacs, &[]);
        drive(&mut shell, "abc\x15"); // C-u
        assert_eq!(shell.editor.line.to_string(), "");

        drive(&mut shell, "\x1f"); // C-_ undo
        assert_eq!(shell.editor.line.to_string(), "abc");
        assert_eq!(shell.editor.cursor.pos(), 3);

        let signal = drive(&mut shell, "\x15\r");
        assert_eq!(signal, Some(Signal::Success(String::new())));
    }

    #[test]
    fn vi_dw_cuts_the_traversed_word() {
        let mut shell = shell(EditMode::Vi, &[]);
        drive(&mut shell, "the quick brown fox");
        drive(&mut shell, "\x1b"); // to command mode
        drive(&mut shell, "0"); // line start
        drive(&mut shell, "wwdw");
        assert_eq!(shell.editor.line.to_string(), "the quick fox");
        assert_eq!(shell.registers.active(), "brown ");
    }

    #[test]
    fn isearch_cycles_matches_and_enter_accepts() {
        let mut shell = shell(EditMode::Emacs, &["make build", "make test", "make clean"]);
        drive(&mut shell, "\x12ma"); // C-r + query
        assert_eq!(shell.keymaps.local(), LocalKeymap::Isearch);
        assert_eq!(
            shell.completion.current_candidate().unwrap().value,
            "make clean"
        );

        drive(&mut shell, "\x12"); // next match backward
        assert_eq!(
            shell.completion.current_candidate().unwrap().value,
            "make test"
        );

        let signal = drive(&mut shell, "\r");
        assert_eq!(signal, Some(Signal::Success("make test".to_string())));
    }

    #[test]
    fn forward_char_accepts_the_autosuggestion() {
        let mut shell = shell(EditMode::Emacs, &["git status"]);
        shell.config.set_from_str("history-autosuggest", "on");
        drive(&mut shell, "gi");
        drive(&mut shell, "\x06"); // C-f forward-char at end of line
        assert_eq!(shell.editor.line.to_string(), "git status");
        assert_eq!(shell.editor.cursor.pos(), 10);
    }

    #[test]
    fn interrupt_returns_ctrl_c() {
        let mut shell = shell(EditMode::Emacs, &[]);
        let signal = drive(&mut shell, "partial\x03");
        assert_eq!(signal, Some(Signal::CtrlC));
    }

    #[test]
    fn accepting_then_reading_again_starts_clean() {
        let mut shell = shell(EditMode::Emacs, &[]);
        drive(&mut shell, "first\r");
        shell.init();
        assert_eq!(shell.editor.line.to_string(), "");
        assert_eq!(shell.editor.cursor.pos(), 0);
        assert_eq!(shell.histories.hpos(), 0);
    }

    #[test]
    fn multiline_predicate_turns_enter_into_newline() {
        let mut shell = Shell::new()
            .with_edit_mode(EditMode::Emacs)
            .with_accept_multiline(Box::new(|line: &LineBuffer| {
                !line.to_string().ends_with('\\')
            }))
            .headless();
        shell.init();

        drive(&mut shell, "echo \\\r");
        assert_eq!(shell.editor.line.to_string(), "echo \\\n");

        let signal = drive(&mut shell, "done\r");
        assert_eq!(signal, Some(Signal::Success("echo \\\ndone".to_string())));
    }
}
