use super::Command;
use crate::core_editor::{is_bracket, match_surround};
use crate::edit_mode::{LocalKeymap, MainKeymap};
use crate::engine::Shell;

impl Shell {
    //
    // Modes ----------------------------------------------------------------
    //

    /// Enter vi insert mode
    pub(crate) fn vi_insert_mode(&mut self) {
        self.save_history();

        self.iterations.reset();
        self.keymaps.set_local(LocalKeymap::None);
        self.keymaps.set_main(MainKeymap::ViInsert);

        // Mark the insertion point; vi-kill-line cuts back to it.
        let editor = self.active_editor_mut();
        editor.selection.reset();
        editor.cursor.set_mark();
    }

    /// Enter vi command mode
    pub(crate) fn vi_command_mode(&mut self) {
        self.iterations.reset();
        self.hint.reset();

        // Cancel any search or completion state; the line below must be
        // the real input line again.
        if self.completion.isearching() {
            self.completion
                .isearch_stop(false, &mut self.editor, &mut self.keymaps);
        } else {
            self.completion.reset();
        }

        let was_insert = self.keymaps.main() == MainKeymap::ViInsert;
        let editor = self.active_editor_mut();
        editor.selection.reset();
        if was_insert && !editor.cursor.at_beginning_of_line(&editor.line) {
            editor.cursor.dec();
        }
        editor.cursor.check_command(&editor.line);

        self.keymaps.set_local(LocalKeymap::None);
        self.keymaps.set_main(MainKeymap::ViCommand);
    }

    /// Enter visual character selection
    pub(crate) fn vi_visual_mode(&mut self) {
        self.histories.skip_save();
        self.iterations.reset();
        self.hint.reset();
        self.completion.reset();

        let editor = self.active_editor_mut();
        editor.selection.mark(editor.cursor.pos());
        editor.selection.visual(false);
        self.keymaps.set_local(LocalKeymap::Visual);
    }

    /// Enter visual line selection
    pub(crate) fn vi_visual_line_mode(&mut self) {
        self.histories.skip_save();
        self.iterations.reset();
        self.hint.reset();
        self.completion.reset();

        let editor = self.active_editor_mut();
        editor.selection.mark(editor.cursor.pos());
        editor.selection.visual(true);
        self.keymaps.set_local(LocalKeymap::Visual);
    }

    /// Insert mode at the beginning of the line
    pub(crate) fn vi_insert_bol(&mut self) {
        self.iterations.reset();
        let editor = self.active_editor_mut();
        editor.cursor.beginning_of_line(&editor.line);
        self.vi_insert_mode();
    }

    /// Insert mode on the next character
    pub(crate) fn vi_add_next(&mut self) {
        let editor = self.active_editor_mut();
        if editor.line.len() > 0 {
            editor.cursor.inc(&editor.line);
        }
        self.vi_insert_mode();
    }

    /// Insert mode at the end of the line
    pub(crate) fn vi_add_eol(&mut self) {
        self.iterations.reset();
        if self.keymaps.local() == LocalKeymap::Visual {
            let editor = self.active_editor_mut();
            editor.cursor.inc(&editor.line);
            self.vi_insert_mode();
            return;
        }
        let editor = self.active_editor_mut();
        editor.cursor.end_of_line_append(&editor.line);
        self.vi_insert_mode();
    }

    //
    // Movement -------------------------------------------------------------
    //

    /// Move forward, without changing lines
    pub(crate) fn vi_forward_char(&mut self) {
        if self.autosuggest_ready() {
            self.autosuggest_accept();
            return;
        }
        self.histories.skip_save();

        let insert_like = self.keymaps.main() == MainKeymap::ViInsert;
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let pos = editor.cursor.pos();
            if !insert_like && pos + 1 >= editor.line.len() {
                break;
            }
            if editor.line.char_at(pos + 1) == Some('\n') {
                break;
            }
            editor.cursor.inc(&editor.line);
        }
    }

    /// Move backward, without changing lines
    pub(crate) fn vi_backward_char(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let pos = editor.cursor.pos();
            if pos == 0 || editor.line.char_at(pos - 1) == Some('\n') {
                break;
            }
            editor.cursor.dec();
        }
    }

    pub(crate) fn vi_backward_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.prev_word_start(editor.cursor.pos(), false);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_forward_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        for _ in 0..times {
            // At the end of the line a suggestion provides the next word.
            self.insert_autosuggest_partial(false);
            let editor = self.active_editor_mut();
            let target = editor.line.next_word_start(editor.cursor.pos(), false);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_backward_blank_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.prev_word_start(editor.cursor.pos(), true);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_forward_blank_word(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.next_word_start(editor.cursor.pos(), true);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_forward_word_end(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.word_end(editor.cursor.pos(), false);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_forward_blank_word_end(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.word_end(editor.cursor.pos(), true);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_backward_word_end(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.prev_word_end(editor.cursor.pos(), false);
            editor.cursor.set(target, &editor.line);
        }
    }

    pub(crate) fn vi_backward_blank_word_end(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let target = editor.line.prev_word_end(editor.cursor.pos(), true);
            editor.cursor.set(target, &editor.line);
        }
    }

    /// Move to the bracket matching the one under (or next on) the line
    pub(crate) fn vi_match_bracket(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        let mut pos = editor.cursor.pos();

        if !editor.line.char_at(pos).is_some_and(is_bracket) {
            let end = editor.line.line_end(pos);
            let next = (pos + 1..end)
                .find(|i| matches!(editor.line.char_at(*i), Some(')' | ']' | '}')));
            match next {
                Some(found) => pos = found,
                None => return,
            }
        }

        if let Some(target) = editor.line.matching_bracket(pos) {
            editor.cursor.set(target, &editor.line);
        }
    }

    /// Move to the column given by the numeric argument
    pub(crate) fn vi_goto_column(&mut self) {
        self.histories.skip_save();
        let column = self.iterations.consume();
        if column < 0 {
            return;
        }
        let editor = self.active_editor_mut();
        let bpos = editor.line.line_start(editor.cursor.pos());
        let epos = editor.line.line_end(editor.cursor.pos());
        let target = (bpos + (column.max(1) as usize - 1)).min(epos);
        editor.cursor.set(target, &editor.line);
    }

    /// End of line with append semantics, so `d$`/`y$` take the last char
    pub(crate) fn vi_end_of_line(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        editor.cursor.end_of_line_append(&editor.line);
    }

    /// First non-blank character of the line
    pub(crate) fn vi_first_print(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        editor.cursor.beginning_of_line(&editor.line);
        editor.cursor.to_first_non_space(&editor.line);
    }

    /// Move to the mark, or to the inactive end of the selection
    pub(crate) fn vi_goto_mark(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if editor.selection.is_active() {
            if let Some((bpos, epos)) = editor.selection_pos() {
                let target = if bpos != editor.cursor.pos() {
                    bpos
                } else {
                    epos
                };
                editor.cursor.set(target, &editor.line);
            }
        } else if let Some(mark) = editor.cursor.mark() {
            editor.cursor.set(mark, &editor.line);
        }
    }

    //
    // Changing text --------------------------------------------------------
    //

    /// Change over a motion; doubled (`cc`) the whole line goes
    pub(crate) fn vi_change_to(&mut self) {
        if self.keymaps.is_pending() {
            // Called twice in a row: change the entire current line.
            self.keymaps.cancel_pending();
            self.save_history();
            self.histories.skip_save();

            let editor = self.active_editor_mut();
            editor.selection.mark(editor.cursor.pos());
            editor.selection.visual(true);
            editor.selection_cut();
            self.vi_insert_mode();
        } else if self.active_selection() {
            self.save_history();
            self.histories.skip_save();

            self.adjust_selection_pending();
            let cut = self.active_editor_mut().selection_cut();
            if let Some(text) = cut {
                self.registers.write(&text);
            }
            self.vi_insert_mode();
        } else {
            // Readline compatibility: the invoking key picks the behavior.
            match self.keys.caller_key() {
                Some('C') => self.vi_change_eol(),
                _ => {
                    self.keymaps.set_pending(Command::ViChangeTo);
                    self.active_editor_mut().mark_selection_at_cursor();
                }
            }
        }
    }

    /// Delete over a motion; doubled (`dd`) the whole line goes
    pub(crate) fn vi_delete_to(&mut self) {
        if self.keymaps.is_pending() {
            self.keymaps.cancel_pending();
            self.save_history();
            self.histories.skip_save();

            let editor = self.active_editor_mut();
            editor.selection.mark(editor.cursor.pos());
            editor.selection.visual(true);
            let cut = editor.selection_cut();
            if let Some(mut text) = cut {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                self.registers.write(&text);
            }
        } else if self.active_selection() {
            self.save_history();
            self.histories.skip_save();

            self.adjust_selection_pending();
            let cut = self.active_editor_mut().selection_cut();
            if let Some(text) = cut {
                self.registers.write(&text);
            }
            self.vi_command_mode();
        } else {
            match self.keys.caller_key() {
                Some('D') => self.vi_kill_eol(),
                _ => {
                    self.keymaps.set_pending(Command::ViDeleteTo);
                    self.active_editor_mut().mark_selection_at_cursor();
                }
            }
        }
    }

    /// Delete under the cursor, without passing the end of line
    pub(crate) fn vi_delete_char(&mut self) {
        let editor = self.active_editor_mut();
        if editor.line.is_empty() || editor.cursor.pos() == editor.line.len() {
            return;
        }
        self.save_history();

        let times = self.iterations.consume_times();
        let mut cut = String::new();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            match editor.line.cut_char(editor.cursor.pos()) {
                Some(c) => cut.push(c),
                None => break,
            }
        }
        self.registers.write(&cut);
    }

    /// Read a key and overwrite the character (or the whole selection)
    pub(crate) fn vi_change_char(&mut self) {
        self.save_history();
        let Some(key) = self.read_arg_key() else {
            self.histories.skip_save();
            return;
        };

        let editor = self.active_editor_mut();
        if editor.selection.is_active() && editor.selection.is_visual() {
            editor.replace_selection_with(|_| key);
        } else {
            let pos = editor.cursor.pos();
            editor.line.replace_char(pos, key);
        }
    }

    /// Overwrite mode: keep replacing typed characters until escape
    pub(crate) fn vi_replace(&mut self) {
        self.save_history();
        self.histories.skip_save();

        // Replaced characters are cached so backspace can restore them.
        let mut cache: Vec<char> = Vec::new();
        let line_start = self.active_editor_mut().line.len();

        while let Some(key) = self.read_arg_key() {
            let editor = self.active_editor_mut();
            if key == '\x7f' {
                if editor.cursor.pos() > 0 {
                    editor.cursor.dec();
                }
                if editor.cursor.pos() < line_start {
                    if let Some(old) = cache.pop() {
                        let pos = editor.cursor.pos();
                        editor.line.replace_char(pos, old);
                    }
                }
                continue;
            }

            let pos = editor.cursor.pos();
            if pos == editor.line.len() {
                editor.line.insert_char(pos, key);
            } else {
                if let Some(old) = editor.line.char_at(pos) {
                    cache.push(old);
                }
                editor.line.replace_char(pos, key);
            }
            editor.cursor.inc(&editor.line);
        }

        self.active_editor_mut().cursor.dec();
    }

    /// Toggle case under the cursor, or over the whole selection
    pub(crate) fn vi_change_case(&mut self) {
        self.save_history();
        let editor = self.active_editor_mut();
        let toggle = |c: char| {
            if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        };

        if editor.selection.is_active() && editor.selection.is_visual() {
            editor.replace_selection_with(toggle);
        } else if let Some(c) = editor.line.char_at(editor.cursor.pos()) {
            let pos = editor.cursor.pos();
            editor.line.replace_char(pos, toggle(c));
        }
    }

    /// Delete the next characters (or the selection) and insert
    pub(crate) fn vi_substitute(&mut self) {
        self.save_history();
        if self.active_selection() {
            self.active_editor_mut().selection_cut();
            self.vi_insert_mode();
            return;
        }

        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            editor.line.cut_char(editor.cursor.pos());
        }
        self.vi_insert_mode();
    }

    /// Change from the cursor to the end of the line
    pub(crate) fn vi_change_eol(&mut self) {
        self.save_history();
        self.histories.skip_save();

        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        editor.selection.mark(pos);
        editor.cursor.end_of_line_append(&editor.line);
        editor.selection_cut();
        editor.cursor.set(pos, &editor.line);

        self.iterations.reset();
        self.vi_insert_mode();
    }

    /// Read a key and wrap the selection in the matching surround pair
    pub(crate) fn vi_add_surround(&mut self) {
        let Some(key) = self.read_arg_key() else {
            self.histories.skip_save();
            return;
        };
        let (open, close) = match_surround(key);

        self.save_history();
        self.active_editor_mut().surround_selection(open, close);
        if self.keymaps.local() == LocalKeymap::Visual {
            self.vi_command_mode();
        }
    }

    /// Find a surround pair around the cursor and replace both ends
    pub(crate) fn vi_change_surround(&mut self) {
        self.save_history();
        self.histories.skip_save();

        let Some(search) = self.read_arg_key() else {
            return;
        };

        let editor = self.active_editor_mut();
        let (bpos, epos) = editor.line.find_surround(search, editor.cursor.pos());
        let (Some(bpos), Some(epos)) = (bpos, epos) else {
            return;
        };
        editor.selection.mark_surround(bpos, epos);

        let Some(replace) = self.read_arg_key() else {
            self.active_editor_mut().selection.reset();
            return;
        };
        let (open, close) = match_surround(replace);

        self.save_history();
        let editor = self.active_editor_mut();
        editor.line.replace_char(bpos, open);
        editor.line.replace_char(epos, close);
        editor.selection.reset();
    }

    /// Open a line above and enter insert mode
    pub(crate) fn vi_open_line_above(&mut self) {
        self.save_history();
        let editor = self.active_editor_mut();
        if !editor.cursor.on_empty_line(&editor.line) {
            editor.cursor.beginning_of_line(&editor.line);
        }
        let pos = editor.cursor.pos();
        editor.line.insert_char(pos, '\n');
        self.vi_insert_mode();
    }

    /// Open a line below and enter insert mode
    pub(crate) fn vi_open_line_below(&mut self) {
        self.save_history();
        let editor = self.active_editor_mut();
        if !editor.cursor.on_empty_line(&editor.line) {
            editor.cursor.end_of_line_append(&editor.line);
        }
        let pos = editor.cursor.pos();
        editor.line.insert_char(pos, '\n');
        editor.cursor.inc(&editor.line);
        self.vi_insert_mode();
    }

    /// Lowercase over a motion or selection (`gu`)
    pub(crate) fn vi_down_case(&mut self) {
        self.vi_case_operator(Command::ViDownCase, |c| {
            c.to_lowercase().next().unwrap_or(c)
        });
    }

    /// Uppercase over a motion or selection (`gU`)
    pub(crate) fn vi_up_case(&mut self) {
        self.vi_case_operator(Command::ViUpCase, |c| {
            c.to_uppercase().next().unwrap_or(c)
        });
    }

    fn vi_case_operator(&mut self, operator: Command, map: fn(char) -> char) {
        self.histories.skip_save();
        if self.keymaps.is_pending() {
            // Doubled: the whole line changes case.
            self.keymaps.cancel_pending();
            self.save_history();
            self.histories.skip_save();

            let editor = self.active_editor_mut();
            editor.selection.mark(editor.cursor.pos());
            editor.selection.visual(true);
            editor.replace_selection_with(map);
            self.vi_command_mode();
        } else if self.active_selection() {
            self.save_history();
            self.active_editor_mut().replace_selection_with(map);
            self.vi_command_mode();
        } else {
            self.keymaps.set_pending(operator);
            self.active_editor_mut().mark_selection_at_cursor();
        }
    }

    //
    // Killing and yanking --------------------------------------------------
    //

    /// Kill from the cursor to the end of the line
    pub(crate) fn vi_kill_eol(&mut self) {
        self.save_history();
        self.histories.skip_save();

        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        editor.selection.mark(pos);
        editor.cursor.end_of_line_append(&editor.line);
        let cut = editor.selection_cut();
        if let Some(text) = cut {
            self.registers.write(&text);
        }

        let editor = self.active_editor_mut();
        editor.cursor.set(pos, &editor.line);
        if !editor.cursor.at_beginning_of_line(&editor.line) {
            editor.cursor.dec();
        }
        self.iterations.reset();
    }

    /// Delete characters backward
    pub(crate) fn vi_rubout(&mut self) {
        if self.keymaps.main() != MainKeymap::ViInsert {
            self.save_history();
        }

        let times = self.iterations.consume_times();
        let mut cut: Vec<char> = Vec::new();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            if editor.cursor.pos() == 0 {
                break;
            }
            editor.cursor.dec();
            if let Some(c) = editor.line.cut_char(editor.cursor.pos()) {
                cut.insert(0, c);
            }
        }
        self.registers.write(&cut.iter().collect::<String>());
    }

    /// Yank over a motion; doubled (`yy`) the whole line
    pub(crate) fn vi_yank_to(&mut self) {
        self.histories.skip_save();

        if self.keymaps.is_pending() {
            self.keymaps.cancel_pending();
            let editor = self.active_editor_mut();
            editor.selection.mark(editor.cursor.pos());
            editor.selection.visual(true);
            if let Some((mut text, ..)) = editor.selection_pop() {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                self.registers.write(&text);
            }
        } else if self.active_selection() {
            self.adjust_selection_pending();
            let popped = self.active_editor_mut().selection_pop();
            if let Some((text, _, _, land)) = popped {
                self.registers.write(&text);
                let editor = self.active_editor_mut();
                editor.cursor.set(land, &editor.line);
            }
            if self.keymaps.local() == LocalKeymap::Visual {
                self.vi_command_mode();
            }
        } else {
            match self.keys.caller_key() {
                Some('Y') => self.vi_yank_whole_line(),
                _ => {
                    self.keymaps.set_pending(Command::ViYankTo);
                    self.active_editor_mut().mark_selection_at_cursor();
                }
            }
        }
    }

    /// Yank the whole current line
    pub(crate) fn vi_yank_whole_line(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();
        editor.selection.mark(pos);
        editor.selection.visual(true);
        if let Some((text, ..)) = editor.selection_pop() {
            self.registers
                .write(text.strip_suffix('\n').unwrap_or(&text));
        }
        let editor = self.active_editor_mut();
        editor.cursor.set(pos, &editor.line);
    }

    /// Kill from the cursor back to where insert mode was entered
    pub(crate) fn vi_kill_line(&mut self) {
        let editor = self.active_editor_mut();
        let Some(mark) = editor.cursor.mark() else {
            return;
        };
        let pos = editor.cursor.pos();
        if pos <= mark || pos == 0 {
            return;
        }

        self.save_history();
        self.histories.skip_save();

        let editor = self.active_editor_mut();
        let text = editor.line.cut(mark, pos);
        editor.cursor.set(mark, &editor.line);
        self.registers.write(&text);
    }

    /// Paste before or after, depending on the invoking key
    pub(crate) fn vi_put(&mut self) {
        match self.keys.caller_key() {
            Some('P') => self.vi_put_before(),
            _ => self.vi_put_after(),
        }
    }

    /// Paste the active register after the cursor
    pub(crate) fn vi_put_after(&mut self) {
        self.save_history();
        let content = self.registers.active();
        if content.is_empty() {
            return;
        }
        let mut chars: Vec<char> = content.chars().collect();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();

        // Line-wise pastes open below the current line.
        if chars.last() == Some(&'\n') {
            if !editor.cursor.on_empty_line(&editor.line) {
                editor.cursor.end_of_line_append(&editor.line);
            }
            if editor.cursor.pos() == editor.line.len() {
                chars.pop();
                chars.insert(0, '\n');
            }
        }

        editor.cursor.inc(&editor.line);
        let pos = editor.cursor.pos();
        for _ in 0..times {
            editor.line.insert(pos, &chars);
        }
        self.last_yank = Some((pos, pos + chars.len() * times));
    }

    /// Paste the active register before the cursor
    pub(crate) fn vi_put_before(&mut self) {
        self.save_history();
        let content = self.registers.active();
        if content.is_empty() {
            return;
        }
        let mut chars: Vec<char> = content.chars().collect();
        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();

        if chars.last() == Some(&'\n') {
            editor.cursor.beginning_of_line(&editor.line);
            if editor.cursor.on_empty_line(&editor.line) {
                chars.push('\n');
                editor.cursor.dec();
            }
        }

        let pos = editor.cursor.pos();
        for _ in 0..times {
            editor.line.insert(pos, &chars);
        }
        editor.cursor.set(pos, &editor.line);
        self.last_yank = Some((pos, pos + chars.len() * times));
    }

    /// Read a key and select the register for the next operation
    pub(crate) fn vi_set_buffer(&mut self) {
        self.histories.skip_save();
        self.registers.reset();
        if let Some(key) = self.read_arg_key() {
            self.registers.set_active(key);
        }
    }

    //
    // Selecting text -------------------------------------------------------
    //

    pub(crate) fn vi_select_a_blank_word(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        editor.cursor.check_command(&editor.line);
        editor.select_a_blank_word();
    }

    pub(crate) fn vi_select_a_shell_word(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        editor.cursor.check_command(&editor.line);
        let (bpos, epos) = editor.line.select_shell_word(editor.cursor.pos());
        editor.cursor.set(epos, &editor.line);
        editor.selection.mark(bpos);
    }

    pub(crate) fn vi_select_a_word(&mut self) {
        self.histories.skip_save();
        self.active_editor_mut().select_a_word();
    }

    pub(crate) fn vi_select_in_blank_word(&mut self) {
        self.histories.skip_save();
        self.active_editor_mut().select_in_blank_word();
    }

    /// Inner shell word: enclosing quotes are excluded when present
    pub(crate) fn vi_select_in_shell_word(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        let pos = editor.cursor.pos();

        let single = editor.line.surround_quotes(true, pos);
        let double = editor.line.surround_quotes(false, pos);
        let pair = match (single, double) {
            ((Some(sb), Some(se)), (Some(db), Some(de))) => {
                // The innermost pair wins.
                if sb > db {
                    Some((sb, se))
                } else {
                    Some((db, de))
                }
            }
            ((Some(sb), Some(se)), _) => Some((sb, se)),
            (_, (Some(db), Some(de))) => Some((db, de)),
            _ => None,
        };

        match pair {
            Some((bpos, epos)) if epos > bpos + 1 => {
                editor.selection.mark(bpos + 1);
                editor.cursor.set(epos - 1, &editor.line);
            }
            _ => self.vi_select_in_blank_word(),
        }
    }

    pub(crate) fn vi_select_in_word(&mut self) {
        self.histories.skip_save();
        self.active_editor_mut().select_in_word();
    }

    /// Select inside or around a surround pair, chosen by the two keys
    /// that invoked the command (`i(`, `a"`...).
    pub(crate) fn vi_select_surround(&mut self) {
        self.histories.skip_save();

        let matched = self.keys.matched_keys();
        let (Some(&kind), Some(&surround)) =
            (matched.iter().nth_back(1), matched.last())
        else {
            return;
        };
        let inside = kind == 'i';

        let editor = self.active_editor_mut();
        let (bpos, epos) = editor.line.find_surround(surround, editor.cursor.pos());
        let (Some(mut bpos), Some(mut epos)) = (bpos, epos) else {
            return;
        };
        if inside {
            bpos += 1;
            epos = epos.saturating_sub(1);
        }
        if epos < bpos {
            return;
        }
        editor.selection.mark(bpos);
        editor.cursor.set(epos, &editor.line);
    }

    //
    // Miscellaneous --------------------------------------------------------
    //

    /// Start a `/` or `?` search, the key picking the direction
    pub(crate) fn vi_search(&mut self) {
        self.histories.skip_save();
        let forward = self.keys.caller_key() == Some('/');
        let name = format!(
            "{} {}",
            self.histories.name(),
            if forward { "/" } else { "?" }
        );
        self.completion.non_isearch_start(
            &name,
            false,
            forward,
            true,
            &mut self.keymaps,
            &mut self.hint,
        );
    }

    /// Repeat the last search; `n` forward, `N` backward
    pub(crate) fn vi_search_again(&mut self) {
        self.histories.skip_save();
        let forward = self.keys.caller_key() == Some('n');
        self.vi_search_repeat(forward);
    }

    /// Start a non-incremental search in a fixed direction
    pub(crate) fn vi_search_start(&mut self, forward: bool) {
        self.histories.skip_save();
        let name = format!(
            "{} {}",
            self.histories.name(),
            if forward { "/" } else { "?" }
        );
        self.completion.non_isearch_start(
            &name,
            false,
            forward,
            true,
            &mut self.keymaps,
            &mut self.hint,
        );
    }

    /// Reuse the last search buffer and jump to the next occurrence
    pub(crate) fn vi_search_repeat(&mut self, forward: bool) {
        self.histories.skip_save();
        let name = self.histories.name().to_string();
        self.completion.non_isearch_start(
            &name,
            true,
            forward,
            true,
            &mut self.keymaps,
            &mut self.hint,
        );

        let (query, cursor) = self.completion.minibuffer_query();
        self.histories
            .insert_match(&query, cursor, &mut self.editor, true, forward, true);
        self.completion
            .non_isearch_stop(&mut self.keymaps, &mut self.hint);
    }

    /// `f`/`F`/`t`/`T`, behavior picked from the invoking key
    pub(crate) fn vi_char_search(&mut self) {
        let (forward, skip) = match self.keys.caller_key() {
            Some('F') => (false, false),
            Some('t') => (true, true),
            Some('T') => (false, true),
            _ => (true, false),
        };
        self.vi_find_char(forward, skip);
    }

    /// Read a key and move onto (or next to) its closest occurrence
    pub(crate) fn vi_find_char(&mut self, forward: bool, skip: bool) {
        self.histories.skip_save();
        let Some(key) = self.read_arg_key() else {
            return;
        };

        let times = self.iterations.consume_times();
        let editor = self.active_editor_mut();
        for _ in 0..times {
            let Some(mut pos) = editor.line.find(key, editor.cursor.pos(), forward) else {
                break;
            };
            if skip {
                pos = if forward { pos.saturating_sub(1) } else { pos + 1 };
            }
            editor.cursor.set(pos, &editor.line);
        }
    }

    /// Redo an undone modification; nothing to redo enters insert mode
    pub(crate) fn vi_redo(&mut self) {
        self.histories.skip_save();
        if self.histories.can_redo() {
            self.histories.redo(&mut self.editor);
            return;
        }
        self.vi_insert_mode();
    }

    //
    // Utils ----------------------------------------------------------------
    //

    fn active_selection(&mut self) -> bool {
        self.active_editor_mut().selection.is_active()
    }

    /// Motions that land *on* their target (end-word, selectors, char
    /// finds) make the pending selection inclusive of the cursor char.
    fn adjust_selection_pending(&mut self) {
        use Command::*;
        if !self.active_selection() {
            return;
        }
        let inclusive = matches!(
            self.keymaps.active_command(),
            Some(
                ViEndWord
                    | ViEndBigword
                    | ViBackwardEndWord
                    | ViBackwardEndBigword
                    | ViChangeTo
                    | ViCharSearch
                    | ViFindNextChar
                    | ViFindNextCharSkip
                    | SelectInWord
                    | SelectAWord
                    | SelectInBlankWord
                    | SelectABlankWord
                    | SelectInShellWord
                    | SelectAShellWord
                    | ViSelectSurround
            )
        );
        if inclusive {
            self.active_editor_mut().selection.visual(false);
        }
    }
}
