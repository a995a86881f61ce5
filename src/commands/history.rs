use crate::engine::Shell;

impl Shell {
    //
    // Accepting ------------------------------------------------------------
    //

    /// Finish editing the buffer and hand the line to the caller
    pub(crate) fn accept_line(&mut self) {
        self.accept_line_with(false, false);
    }

    /// Accept and keep the line as the buffer of the next loop
    pub(crate) fn accept_and_hold(&mut self) {
        self.accept_line_with(false, true);
    }

    /// Accept, then start the next loop on the history line following the
    /// first match of this one.
    pub(crate) fn accept_and_infer_next_history(&mut self) {
        self.accept_line_with(true, false);
    }

    //
    // Walking --------------------------------------------------------------
    //

    /// Move to the next event in the history list
    pub(crate) fn down_history(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume();
        self.histories
            .walk(-times.max(1), &mut self.editor, &mut self.hint, &self.config);
    }

    /// Move to the previous event in the history list
    pub(crate) fn up_history(&mut self) {
        self.histories.skip_save();
        let times = self.iterations.consume();
        self.histories
            .walk(times.max(1), &mut self.editor, &mut self.hint, &self.config);
    }

    /// Move to the first event in the history list
    pub(crate) fn beginning_of_history(&mut self) {
        self.histories.skip_save();
        let Some(len) = self.histories.current().map(|h| h.len()) else {
            return;
        };
        self.histories
            .walk(len as isize, &mut self.editor, &mut self.hint, &self.config);
    }

    /// Move to the last event in the history list
    pub(crate) fn end_of_history(&mut self) {
        self.histories.skip_save();
        let Some(len) = self.histories.current().map(|h| h.len()) else {
            return;
        };
        self.histories.walk(
            -(len as isize) + 1,
            &mut self.editor,
            &mut self.hint,
            &self.config,
        );
    }

    /// Fetch the entry given by the numeric argument (first entry without)
    pub(crate) fn fetch_history(&mut self) {
        self.histories.skip_save();
        let pos = if self.iterations.is_set() {
            self.iterations.consume().max(0) as usize
        } else {
            0
        };
        self.histories.fetch(pos, &mut self.editor, &mut self.hint);
    }

    /// Move down a buffer line first; spill the rest into history walking
    pub(crate) fn down_line_or_history(&mut self) {
        self.histories.skip_save();
        let mut times = self.iterations.consume_times() as isize;
        let editor = self.active_editor_mut();
        let lines_down =
            (editor.line.num_lines() - 1 - editor.line.line_of(editor.cursor.pos())) as isize;
        if lines_down > 0 {
            editor.cursor.line_move(times.min(lines_down), &editor.line);
            times -= lines_down;
        }
        if times > 0 {
            self.histories
                .walk(-times, &mut self.editor, &mut self.hint, &self.config);
        }
    }

    /// Move up a buffer line first; spill the rest into history walking
    pub(crate) fn up_line_or_history(&mut self) {
        self.histories.skip_save();
        let mut times = self.iterations.consume_times() as isize;
        let editor = self.active_editor_mut();
        let lines_up = editor.line.line_of(editor.cursor.pos()) as isize;
        if lines_up > 0 {
            editor.cursor.line_move(-times.min(lines_up), &editor.line);
            times -= lines_up;
        }
        if times > 0 {
            self.histories
                .walk(times, &mut self.editor, &mut self.hint, &self.config);
        }
    }

    /// Move up a buffer line, or prefix-search backward from the cursor
    pub(crate) fn up_line_or_search(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if editor.line.line_of(editor.cursor.pos()) > 0 {
            editor.cursor.line_move(-1, &editor.line);
        } else {
            self.history_search_backward();
        }
    }

    /// Move down a buffer line, or prefix-search forward from the cursor
    pub(crate) fn down_line_or_search(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        let row = editor.line.line_of(editor.cursor.pos());
        if row + 1 < editor.line.num_lines() {
            editor.cursor.line_move(1, &editor.line);
        } else {
            self.history_search_forward();
        }
    }

    /// Go to the start of the buffer; already there, to the first event
    pub(crate) fn beginning_of_buffer_or_history(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if editor.cursor.pos() > 0 {
            editor.cursor.set(0, &editor.line);
            return;
        }
        self.beginning_of_history();
    }

    /// Go to the end of the buffer; already there, to the last event.
    /// "End" follows the end-of-line semantics of the active keymap.
    pub(crate) fn end_of_buffer_or_history(&mut self) {
        self.histories.skip_save();
        let command_mode = !self.keymaps.main().is_insert_like();
        let editor = self.active_editor_mut();
        let end = if command_mode {
            editor.line.len().saturating_sub(1)
        } else {
            editor.line.len()
        };
        if editor.cursor.pos() < end {
            editor.cursor.set(end, &editor.line);
            return;
        }
        self.end_of_history();
    }

    /// To the line start; there already, a line (or history event) up
    pub(crate) fn beginning_of_line_hist(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if editor.cursor.pos() > 0 {
            if editor.cursor.at_beginning_of_line(&editor.line) {
                editor.cursor.dec();
            }
            editor.cursor.beginning_of_line(&editor.line);
            return;
        }
        self.histories
            .walk(1, &mut self.editor, &mut self.hint, &self.config);
    }

    /// To the line end; there already, a line (or history event) down
    pub(crate) fn end_of_line_hist(&mut self) {
        self.histories.skip_save();
        let editor = self.active_editor_mut();
        if editor.cursor.pos() + 1 < editor.line.len() {
            if editor.cursor.at_end_of_line(&editor.line) {
                editor.cursor.inc(&editor.line);
            }
            editor.cursor.end_of_line_append(&editor.line);
            return;
        }
        self.histories
            .walk(-1, &mut self.editor, &mut self.hint, &self.config);
    }

    /// Fetch the history line following the first match of the buffer
    pub(crate) fn infer_next_history(&mut self) {
        self.histories.skip_save();
        let line = self.editor.line.to_string();
        self.histories.insert_after_match(&line, &mut self.editor);
    }

    //
    // Searching ------------------------------------------------------------
    //

    /// Incremental search backward; cycling further while already open
    pub(crate) fn reverse_search_history(&mut self) {
        self.histories.skip_save();
        if self.completion.isearching() {
            self.completion.select(1, 0);
            return;
        }
        self.history_completion(false, false, true);
    }

    /// Incremental search forward; cycling back while already open
    pub(crate) fn forward_search_history(&mut self) {
        self.histories.skip_save();
        if self.completion.isearching() {
            self.completion.select(-1, 0);
            return;
        }
        self.history_completion(true, false, true);
    }

    /// Incremental autocompletion over the history lines
    pub(crate) fn incremental_search_history(&mut self, forward: bool) {
        self.histories.skip_save();
        self.history_completion(forward, true, false);
    }

    /// Non-incremental search: the query is read in a minibuffer and
    /// matched on accept.
    pub(crate) fn non_incremental_search_history(&mut self, forward: bool) {
        self.histories.skip_save();
        let name = self.histories.name().to_string();
        self.completion.non_isearch_start(
            &name,
            false,
            forward,
            true,
            &mut self.keymaps,
            &mut self.hint,
        );
    }

    /// Prefix-match the line up to the cursor against the history,
    /// keeping the cursor column.
    pub(crate) fn history_search_forward(&mut self) {
        self.save_history();
        self.history_search(true);
    }

    pub(crate) fn history_search_backward(&mut self) {
        self.save_history();
        self.history_search(false);
    }

    fn history_search(&mut self, forward: bool) {
        let query = self.editor.line.to_string();
        let cursor = self.editor.cursor.pos();
        self.histories
            .insert_match(&query, cursor, &mut self.editor, true, forward, false);
        self.editor.cursor.set(cursor, &self.editor.line);
    }

    /// Substring-match the line up to the cursor against the history
    pub(crate) fn history_substring_search(&mut self, forward: bool) {
        let query = self.editor.line.to_string();
        let cursor = self.editor.cursor.pos();
        self.histories
            .insert_match(&query, cursor, &mut self.editor, true, forward, true);
    }

    //
    // History arguments ----------------------------------------------------
    //

    /// Insert the last word of the previous history line
    pub(crate) fn yank_last_arg(&mut self) {
        let Some(last) = self.histories.get_last() else {
            return;
        };
        let Some(arg) = shell_words(&last).into_iter().last() else {
            return;
        };
        self.save_history();
        self.active_editor_mut()
            .insert_str_at_cursor(&quote_if_spaced(arg));
    }

    /// Insert the nth word of the previous history line
    pub(crate) fn yank_nth_arg(&mut self) {
        let Some(last) = self.histories.get_last() else {
            return;
        };
        let words = shell_words(&last);
        let nth = self.iterations.consume_times();
        if words.len() < nth {
            return;
        }
        self.save_history();
        let arg = words[nth - 1].clone();
        self.active_editor_mut()
            .insert_str_at_cursor(&quote_if_spaced(arg));
    }

    /// Expand a `!prefix` word against the history; otherwise the space
    /// inserts itself.
    pub(crate) fn magic_space(&mut self) {
        let pos = self.editor.cursor.pos();
        let len = self.editor.line.len();

        if len == 0 || (pos == len && self.editor.line.char_at(pos - 1) == Some(' ')) {
            self.self_insert();
            return;
        }

        let (bpos, epos) = self.editor.line.select_blank_word(pos.min(len - 1));
        let word: String = self.editor.line.chars()[bpos..=epos].iter().collect();

        let Some(pattern) = word.strip_prefix('!') else {
            self.self_insert();
            return;
        };
        if pattern.is_empty() {
            self.self_insert();
            return;
        }

        let Some(suggested) = self.histories.suggest(pattern) else {
            self.self_insert();
            return;
        };

        self.save_history();
        let chars: Vec<char> = suggested.chars().collect();
        self.editor.line.cut(bpos, epos + 1);
        self.editor.line.insert(bpos, &chars);
        self.editor
            .cursor
            .set(bpos + chars.len(), &self.editor.line);
    }

    //
    // Autosuggest ----------------------------------------------------------
    //

    /// Make the shown suggestion the buffer
    pub(crate) fn autosuggest_accept(&mut self) {
        let line = self.editor.line.to_string();
        let Some(suggested) = self.histories.suggest(&line) else {
            return;
        };
        let chars: Vec<char> = suggested.chars().collect();
        self.editor.set_line(&chars);
    }

    /// Make the shown suggestion the buffer and accept it
    pub(crate) fn autosuggest_execute(&mut self) {
        self.autosuggest_accept();
        self.accept_line();
    }

    pub(crate) fn autosuggest_enable(&mut self) {
        self.histories.skip_save();
        self.config.set_from_str("history-autosuggest", "on");
    }

    pub(crate) fn autosuggest_disable(&mut self) {
        self.histories.skip_save();
        self.config.set_from_str("history-autosuggest", "off");
    }

    pub(crate) fn autosuggest_toggle(&mut self) {
        if self.config.get_bool("history-autosuggest") {
            self.autosuggest_disable();
        } else {
            self.autosuggest_enable();
        }
    }

    /// Insert the next word of the suggestion when the cursor sits at the
    /// end of the line (used by the forward-word family).
    pub(crate) fn insert_autosuggest_partial(&mut self, emacs_style: bool) {
        if !self.config.get_bool("history-autosuggest") {
            return;
        }
        let pos = self.editor.cursor.pos();
        if pos < self.editor.line.len() {
            return;
        }
        let line = self.editor.line.to_string();
        let Some(suggested) = self.histories.suggest(&line) else {
            return;
        };

        let chars: Vec<char> = suggested.chars().collect();
        let buffer = crate::core_editor::LineBuffer::from(suggested.as_str());
        let end = if emacs_style {
            (buffer.word_end(pos.saturating_sub(1), false) + 1).min(chars.len())
        } else {
            buffer.next_word_start(pos.saturating_sub(1), false).min(chars.len())
        };
        if end > pos {
            self.editor.line.insert(pos, &chars[pos..end]);
        }
    }
}

/// Split a line into blank-separated words, keeping quoted spans whole
fn shell_words(line: &str) -> Vec<String> {
    let buffer = crate::core_editor::LineBuffer::from(line);
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < buffer.len() {
        let (bpos, epos) = buffer.select_shell_word(pos);
        if epos < bpos {
            break;
        }
        words.push(buffer.chars()[bpos..=epos].iter().collect::<String>());
        pos = epos + 1;
        while pos < buffer.len() && buffer.char_at(pos).is_some_and(char::is_whitespace) {
            pos += 1;
        }
    }
    words
}

fn quote_if_spaced(word: String) -> String {
    if word.contains(' ') || word.contains('\t') {
        if word.contains('"') {
            format!("'{word}'")
        } else {
            format!("\"{word}\"")
        }
    } else {
        word
    }
}
