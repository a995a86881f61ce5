use nu_ansi_term::Style;

use crate::engine::Shell;
use crate::enums::AcceptKind;
use crate::inputrc::escape;

impl Shell {
    //
    // Inserting ------------------------------------------------------------
    //

    /// Insert the key that invoked the command
    pub(crate) fn self_insert(&mut self) {
        let Some(key) = self.keys.caller_key() else {
            return;
        };
        self.save_history();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.insert_at_cursor(&[key]);
        }
    }

    /// Read the next key and insert it literally
    pub(crate) fn quoted_insert(&mut self) {
        self.save_history();
        let Some(key) = self.read_arg_key() else {
            self.histories.skip_save();
            return;
        };
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.insert_at_cursor(&[key]);
        }
    }

    pub(crate) fn tab_insert(&mut self) {
        self.save_history();
        self.active_editor_mut().insert_at_cursor(&['\t']);
    }

    /// Start or extend the numeric argument from the invoking key
    pub(crate) fn digit_argument(&mut self) {
        self.histories.skip_save();
        let Some(key) = self.keys.caller_key() else {
            return;
        };
        if key.is_ascii_digit() || key == '-' {
            self.iterations.add(&key.to_string());
        }
    }

    //
    // Movement -------------------------------------------------------------
    //

    pub(crate) fn beginning_of_line(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        editor.cursor.beginning_of_line(&editor.line);
    }

    pub(crate) fn end_of_line(&mut self) {
        self.histories.skip_save();
        if self.autosuggest_ready() {
            self.autosuggest_accept();
            return;
        }
        let editor = self.active_editor_mut();
        editor.cursor.end_of_line_append(&editor.line);
    }

    /// Move right; at the end of the line this accepts the suggestion
    pub(crate) fn forward_char(&mut self) {
        self.histories.skip_save();
        if self.autosuggest_ready() {
            self.autosuggest_accept();
            return;
        }
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.cursor.inc(&editor.line);
        }
    }

    pub(crate) fn backward_char(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.cursor.dec();
        }
    }

    /// Move to the end of the next word. At the end of the line, with a
    /// suggestion shown, take the suggestion's next word instead.
    pub(crate) fn forward_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        for _ in 0..times {
            self.insert_autosuggest_partial(true);
            let editor = self.active_editor_mut();
            let pos = editor.cursor.pos();
            let target = editor.line.word_end(pos, false) + 1;
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn backward_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.prev_word_start(editor.cursor.pos(), false);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn clear_screen(&mut self) {
        self.histories.skip_save();
        let _ = self.painter.clear_screen();
    }

    pub(crate) fn redraw_current_line(&mut self) {
        // The loop repaints before the next read; nothing else to do.
        self.histories.skip_save();
    }

    //
    // Deleting -------------------------------------------------------------
    //

    pub(crate) fn delete_char(&mut self) {
        self.save_history();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let pos = editor.cursor.pos();
            if editor.line.cut_char(pos).is_none() {
                break;
            }
        }
    }

    pub(crate) fn backward_delete_char(&mut self) {
        self.save_history();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            if editor.cursor.pos() == 0 {
                break;
            }
            editor.cursor.dec();
            editor.line.cut_char(editor.cursor.pos());
        }
    }

    /// Delete in place, or list the completions when at the end of line
    pub(crate) fn delete_char_or_list(&mut self) {
        let editor = self.active_editor_mut();
        if editor.cursor.pos() < editor.line.len() {
            self.delete_char();
        } else {
            self.possible_completions();
        }
    }

    pub(crate) fn transpose_chars(&mut self) {
        self.save_history();
        let editor = self.active_editor_mut();
        let len = editor.line.len();
        let pos = editor.cursor.pos();
        if len < 2 || pos == 0 {
            self.histories.skip_save();
            return;
        }
        let editor = self.active_editor_mut();
        if pos == len {
            let (a, b) = (
                editor.line.char_at(len - 2),
                editor.line.char_at(len - 1),
            );
            if let (Some(a), Some(b)) = (a, b) {
                editor.line.replace_char(len - 2, b);
                editor.line.replace_char(len - 1, a);
            }
        } else if let (Some(a), Some(b)) = (
            editor.line.char_at(pos - 1),
            editor.line.char_at(pos),
        ) {
            editor.line.replace_char(pos - 1, b);
            editor.line.replace_char(pos, a);
            editor.cursor.inc(&editor.line);
        }
    }

    pub(crate) fn transpose_words(&mut self) {
        self.save_history();
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let (b2, e2) = editor.line.select_word(pos);
        if b2 == 0 {
            self.histories.skip_save();
            return;
        }
        let (b1, e1) = editor.line.select_word(editor.line.prev_word_start(b2, false));
        if e1 >= b2 {
            self.histories.skip_save();
            return;
        }

        let chars = editor.line.chars().to_vec();
        let first: Vec<char> = chars[b1..=e1].to_vec();
        let second: Vec<char> = chars[b2..=e2].to_vec();

        editor.line.cut(b2, e2 + 1);
        editor.line.insert(b2, &first);
        editor.line.cut(b1, e1 + 1);
        editor.line.insert(b1, &second);
        editor.cursor.set(b1 + second.len() + (b2 - e1 - 1) + first.len(), &editor.line);
    }

    //
    // Word casing ----------------------------------------------------------
    //

    pub(crate) fn down_case_word(&mut self) {
        self.case_word(|c| c.to_lowercase().next().unwrap_or(c), false);
    }

    pub(crate) fn up_case_word(&mut self) {
        self.case_word(|c| c.to_uppercase().next().unwrap_or(c), false);
    }

    pub(crate) fn capitalize_word(&mut self) {
        self.case_word(|c| c.to_lowercase().next().unwrap_or(c), true);
    }

    fn case_word(&mut self, map: impl Fn(char) -> char, capitalize: bool) {
        self.save_history();
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let target = (editor.line.word_end(pos, false) + 1).min(editor.line.len());
        let mut first = capitalize;
        editor.line.replace_range_with(pos, target, |c| {
            if first && c.is_alphanumeric() {
                first = false;
                return c.to_uppercase().next().unwrap_or(c);
            }
            map(c)
        });
        editor.cursor.set(target, &editor.line);
    }

    //
    // Killing and yanking --------------------------------------------------
    //

    fn kill_range(&mut self, bpos: usize, epos: usize, land: usize) {
        self.save_history();
        let editor = self.active_editor_mut();
        let text = editor.line.cut(bpos, epos);
        editor.cursor.set(land, &editor.line);
        self.registers.write(&text);
    }

    /// Kill from the cursor to the end of the line; on an empty tail,
    /// the newline itself goes.
    pub(crate) fn kill_line(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let mut epos = editor.line.line_end(pos);
        if epos == pos && epos < editor.line.len() {
            epos += 1;
        }
        if epos > pos {
            self.kill_range(pos, epos, pos);
        }
    }

    /// Kill backward to the beginning of the line
    pub(crate) fn backward_kill_line(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let bpos = editor.line.line_start(pos);
        if pos > bpos {
            self.kill_range(bpos, pos, bpos);
        }
    }

    pub(crate) fn kill_whole_line(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let bpos = editor.line.line_start(pos);
        let epos = (editor.line.line_end(pos) + 1).min(editor.line.len());
        if epos > bpos {
            self.kill_range(bpos, epos, bpos);
        }
    }

    pub(crate) fn kill_word(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let target = (editor.line.word_end(pos, false) + 1).min(editor.line.len());
        if target > pos {
            self.kill_range(pos, target, pos);
        }
    }

    pub(crate) fn backward_kill_word(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let target = editor.line.prev_word_start(pos, false);
        if pos > target {
            self.kill_range(target, pos, target);
        }
    }

    /// Kill the blank-word behind the cursor
    pub(crate) fn unix_word_rubout(&mut self) {
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        let target = editor.line.prev_word_start(pos, true);
        if pos > target {
            self.kill_range(target, pos, target);
        }
    }

    /// Paste the most recent kill at the cursor
    pub(crate) fn yank(&mut self) {
        self.save_history();
        let content = self.registers.active();
        if content.is_empty() {
            self.histories.skip_save();
            return;
        }
        let times = self.iterations.consume_times();
        let start = self.active_editor_mut().cursor.pos();
        let chars: Vec<char> = content.chars().collect();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.insert_at_cursor(&chars);
        }
        let end = editor.cursor.pos();
        self.last_yank = Some((start, end));
    }

    /// Rotate the kill ring and replace the just-yanked text, only when
    /// the previous command was a yank or paste.
    pub(crate) fn yank_pop(&mut self) {
        self.histories.skip_save();
        if !self.last_command_was_paste() {
            return;
        }
        let Some((bpos, epos)) = self.last_yank else {
            return;
        };
        let Some(next) = self.registers.pop_rotate() else {
            return;
        };

        self.save_history();
        let chars: Vec<char> = next.chars().collect();
        let editor = self.active_editor_mut();
        editor.line.cut(bpos, epos);
        editor.line.insert(bpos, &chars);
        editor.cursor.set(bpos + chars.len(), &editor.line);
        self.last_yank = Some((bpos, bpos + chars.len()));
    }

    //
    // Mark -----------------------------------------------------------------
    //

    pub(crate) fn set_mark(&mut self) {
        self.histories.skip_save();
        self.active_editor_mut().cursor.set_mark();
    }

    pub(crate) fn exchange_point_and_mark(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if let Some(mark) = editor.cursor.mark() {
            let pos = editor.cursor.pos();
            editor.cursor.set(mark, &editor.line);
            editor.cursor.set_mark_at(pos);
        }
    }

    /// Read a key and move to its next/previous occurrence
    pub(crate) fn character_search(&mut self, forward: bool) {
        self.histories.skip_save();
        let Some(key) = self.read_arg_key() else {
            return;
        };
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            match editor.line.find(key, editor.cursor.pos(), forward) {
                Some(pos) => editor.cursor.set(pos, &editor.line),
                None => break,
            }
        }
    }

    //
    // Comment, undo, control -----------------------------------------------
    //

    /// Prefix the line with the configured comment string and accept it
    pub(crate) fn insert_comment(&mut self) {
        self.save_history();
        let comment: Vec<char> = self
            .config
            .get_str("comment-begin")
            .trim_matches('"')
            .chars()
            .collect();
        let editor = self.active_editor_mut();
        let bpos = editor.line.line_start(editor.cursor.pos());
        editor.line.insert(bpos, &comment);
        editor.cursor.end_of_line_append(&editor.line);
        self.accept_line();
    }

    pub(crate) fn revert_line(&mut self) {
        self.histories.skip_save();
        self.histories.revert_line(&mut self.editor);
    }

    pub(crate) fn undo_last(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        for _ in 0..times {
            self.histories.undo(&mut self.editor);
        }
    }

    /// Cancel the pending operation: operator, selection, numeric
    /// argument, or an open incremental search.
    pub(crate) fn abort(&mut self) {
        self.histories.skip_save();
        self.iterations.reset();
        self.keymaps.cancel_pending();
        if self.completion.isearching() {
            self.hint.reset();
            self.completion
                .isearch_stop(false, &mut self.editor, &mut self.keymaps);
        } else if self.completion.non_searching().is_some() {
            self.completion
                .non_isearch_stop(&mut self.keymaps, &mut self.hint);
        } else if self.completion.is_active() {
            self.completion.reset();
        }
        self.active_editor_mut().selection.reset();
    }

    /// End-of-file on an empty line; deletes in place otherwise
    pub(crate) fn end_of_file(&mut self) {
        if self.editor.line.is_empty() {
            self.accept_with_kind(false, false, AcceptKind::EndOfFile);
        } else {
            self.delete_char();
        }
    }

    pub(crate) fn interrupt(&mut self) {
        self.accept_with_kind(false, false, AcceptKind::Interrupt);
    }

    pub(crate) fn emacs_editing_mode(&mut self) {
        self.histories.skip_save();
        self.keymaps
            .set_main(crate::edit_mode::MainKeymap::Emacs);
    }

    //
    // Keyboard macros ------------------------------------------------------
    //

    pub(crate) fn start_kbd_macro(&mut self) {
        self.histories.skip_save();
        self.macros.start_record();
    }

    pub(crate) fn end_kbd_macro(&mut self) {
        self.histories.skip_save();
        let trailing = self.keys.matched_keys().len();
        self.macros.stop_record(trailing);
    }

    /// Replay the last macro by prepending it to the key stream
    pub(crate) fn call_last_kbd_macro(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let last = self.macros.last().to_vec();
        if last.is_empty() {
            return;
        }
        for _ in 0..times {
            self.keys.feed(true, &last);
        }
    }

    pub(crate) fn print_last_kbd_macro(&mut self) {
        self.histories.skip_save();
        let rendered = escape(self.macros.last());
        self.hint
            .set(Style::new().dimmed().paint(format!("macro: {rendered}")).to_string());
    }

    //
    // Shared helpers -------------------------------------------------------
    //

    pub(crate) fn last_command_was_paste(&self) -> bool {
        use super::Command::*;
        matches!(
            self.last_command,
            Some(Yank | YankPop | ViYankPop | ViPut | ViPutAfter | ViPutBefore)
        )
    }

    /// True when a suggestion could be accepted: autosuggest on, cursor at
    /// the end of the real line, and some history line extends it.
    pub(crate) fn autosuggest_ready(&self) -> bool {
        if !self.config.get_bool("history-autosuggest") {
            return false;
        }
        // "At end" follows the end-of-line semantics of the active keymap.
        let at_end = if self.keymaps.main().is_insert_like() {
            self.editor.cursor.pos() == self.editor.line.len()
        } else {
            self.editor.cursor.pos() + 1 >= self.editor.line.len()
        };
        at_end
            && self
                .histories
                .suggest(&self.editor.line.to_string())
                .is_some()
    }
}
