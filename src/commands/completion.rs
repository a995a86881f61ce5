use crate::completion::{Candidate, Values};
use crate::engine::Shell;

impl Shell {
    /// Complete the word at the cursor. A single candidate is committed
    /// outright; several open the menu with the first one selected.
    pub(crate) fn complete_word(&mut self) {
        self.histories.skip_save();

        if self.completion.is_active() {
            // A second Tab cycles.
            self.completion.select(1, 0);
            return;
        }

        self.completer_menu();
        match self.completion.matches() {
            0 => {}
            1 => {
                // A single candidate commits outright.
                self.completion.select(1, 0);
                self.completion.update_inserted(&mut self.editor);
                self.completion.reset();
            }
            _ => self.completion.select(1, 0),
        }
    }

    /// Complete, cycling forward through the candidates
    pub(crate) fn menu_complete(&mut self) {
        self.histories.skip_save();
        if !self.completion.is_active() {
            self.completer_menu();
        }
        self.completion.select(1, 0);
    }

    /// Complete, cycling backward through the candidates
    pub(crate) fn reverse_menu_complete(&mut self) {
        self.histories.skip_save();
        if !self.completion.is_active() {
            self.completer_menu();
        }
        self.completion.select(-1, 0);
    }

    /// List the candidates without selecting any
    pub(crate) fn possible_completions(&mut self) {
        self.histories.skip_save();
        self.completer_menu();
    }

    /// Offer the cut/yank registers as completion candidates
    pub(crate) fn registers_complete(&mut self) {
        self.histories.skip_save();

        let candidates: Vec<Candidate> = self
            .registers
            .dump()
            .into_iter()
            .map(|(name, content)| {
                Candidate::new(content.clone())
                    .with_display(content.replace('\n', " "))
                    .with_description(format!("register {name}"))
                    .with_tag("registers")
            })
            .collect();
        if candidates.is_empty() {
            return;
        }

        let values = Values::new(candidates).no_sort_all().list_long_all();
        let width = self.painter.screen_width() as usize;
        self.completion
            .start_with_values(values, &self.editor, &self.config, width);
        self.completion.select(1, 0);
    }
}
