use nu_ansi_term::{Color, Style};
use regex::Regex;

use super::group::{display_width, strip_ansi, Group, CONTINUATION_MARK};
use super::{Candidate, Values};
use crate::core_editor::Editor;
use crate::edit_mode::{Keymaps, LocalKeymap, MainKeymap};
use crate::hint::Hint;
use crate::inputrc::Config;

/// Which buffer the editing commands currently act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BufferView {
    /// The real input line
    Real,
    /// The incremental/non-incremental search minibuffer
    Minibuffer,
    /// The input line with a candidate virtually inserted
    Completed,
}

/// State of a non-incremental minibuffer search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NonIncSearch {
    pub(crate) forward: bool,
    pub(crate) substring: bool,
    exit_main: MainKeymap,
}

/// The completion orchestrator.
///
/// Candidate generation is delegated to the host completer; the produced
/// values are cached so incremental-search filtering never re-invokes the
/// callback. While a candidate is selected it is only *virtually* inserted:
/// commands see the completed line through the buffer view, and the real
/// line changes only when the insertion is committed.
#[derive(Default)]
pub(crate) struct CompletionEngine {
    cached: Option<Values>,
    groups: Vec<Group>,

    /// Pristine copy of the real line, the base for virtual insertions
    base: Option<Editor>,
    /// Code-point range of the completion prefix getting replaced
    span: (usize, usize),
    selected: Option<Candidate>,
    virtual_ed: Option<Editor>,
    just_selected: bool,

    minibuffer: Option<Editor>,
    isearch_regex: Option<Regex>,
    isearch_name: String,
    isearch_insert: bool,
    /// Minibuffer content kept after a search stops, for search-again
    isearch_text: String,
    non_inc: Option<NonIncSearch>,
}

impl CompletionEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    //
    // Buffer views ---------------------------------------------------------
    //

    pub(crate) fn view(&self) -> BufferView {
        if self.minibuffer.is_some() {
            BufferView::Minibuffer
        } else if self.virtual_ed.is_some() {
            BufferView::Completed
        } else {
            BufferView::Real
        }
    }

    pub(crate) fn minibuffer_mut(&mut self) -> Option<&mut Editor> {
        self.minibuffer.as_mut()
    }

    pub(crate) fn virtual_mut(&mut self) -> Option<&mut Editor> {
        self.virtual_ed.as_mut()
    }

    /// The line/cursor shown to the user right now
    pub(crate) fn display_editor<'a>(&'a self, real: &'a Editor) -> &'a Editor {
        self.virtual_ed.as_ref().unwrap_or(real)
    }

    //
    // Menu lifecycle -------------------------------------------------------
    //

    /// Cache values and build the display groups over the current line
    pub(crate) fn start_with_values(
        &mut self,
        values: Values,
        editor: &Editor,
        config: &Config,
        term_width: usize,
    ) {
        let prefix_len = if values.prefix.is_empty() {
            word_prefix_len(editor)
        } else {
            values.prefix.chars().count()
        };
        let cursor = editor.cursor.pos();
        self.span = (cursor.saturating_sub(prefix_len), cursor);
        self.base = Some(editor.clone());
        self.build_groups(&values, config, term_width);
        self.cached = Some(values);
    }

    fn build_groups(&mut self, values: &Values, config: &Config, term_width: usize) {
        self.groups.clear();
        self.selected = None;
        self.virtual_ed = None;

        let list_separator = {
            let sep = config.get_str("completion-list-separator");
            if sep.is_empty() {
                "--".to_string()
            } else {
                sep.trim_matches('"').to_string()
            }
        };

        // Tags keep their first-appearance order.
        let mut tags: Vec<&str> = Vec::new();
        for candidate in &values.candidates {
            if !tags.contains(&candidate.tag.as_str()) {
                tags.push(&candidate.tag);
            }
        }

        for tag in tags {
            let tagged: Vec<Candidate> = values
                .candidates
                .iter()
                .filter(|c| c.tag == tag)
                .cloned()
                .collect();
            let (described, bare): (Vec<Candidate>, Vec<Candidate>) = tagged
                .into_iter()
                .partition(|c| !c.description.is_empty());

            // Described candidates come first; an anonymous group carries
            // the leftovers when both kinds are present.
            if !described.is_empty() {
                self.groups.push(Group::new(
                    tag,
                    described,
                    values,
                    &list_separator,
                    term_width,
                ));
                if !bare.is_empty() {
                    self.groups
                        .push(Group::new("", bare, values, &list_separator, term_width));
                }
            } else if !bare.is_empty() {
                self.groups
                    .push(Group::new(tag, bare, values, &list_separator, term_width));
            }
        }
    }

    /// Total candidates over all groups
    pub(crate) fn matches(&self) -> usize {
        self.groups.iter().map(Group::matches).sum()
    }

    /// True while a completion menu is displayed
    pub(crate) fn is_active(&self) -> bool {
        !self.groups.is_empty()
    }

    pub(crate) fn current_candidate(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    /// Move the selection across groups and virtually insert the selected
    /// candidate into a completed view of the line.
    pub(crate) fn select(&mut self, dx: isize, dy: isize) {
        if self.matches() == 0 {
            return;
        }

        let entered = self.groups.iter().position(Group::entered);
        let forward = dx > 0 || dy > 0;
        let mut index = entered.unwrap_or(if forward { 0 } else { self.groups.len() - 1 });

        // Bounded walk: each leave/enter counts one step over the cycle.
        for _ in 0..self.groups.len() * 2 + 1 {
            let (done, next) = self.groups[index].move_selector(dx, dy);
            if !done {
                break;
            }
            index = if next {
                (index + 1) % self.groups.len()
            } else {
                (index + self.groups.len() - 1) % self.groups.len()
            };
        }

        let preserve = self.groups[index].preserve_escapes;
        let Some(candidate) = self.groups[index].selected().cloned() else {
            return;
        };

        let mut value = candidate.value.clone();
        if !preserve {
            value = strip_ansi(&value);
        }
        self.insert_virtual(&value);
        self.selected = Some(candidate);
        self.just_selected = true;
    }

    fn insert_virtual(&mut self, value: &str) {
        let Some(base) = self.base.as_ref() else {
            return;
        };
        let mut completed = base.clone();
        let (bpos, epos) = self.span;
        completed.line.cut(bpos, epos);
        let content: Vec<char> = value.chars().collect();
        completed.line.insert(bpos, &content);
        completed
            .cursor
            .set(bpos + content.len(), &completed.line);
        self.virtual_ed = Some(completed);
    }

    /// Promote the virtually inserted candidate into the real line. A noop
    /// while the minibuffer owns the dispatch (incremental search edits
    /// must not commit the shown match).
    ///
    /// The menu itself stays: cycling commands keep inserting over the
    /// pristine base line, and the loop drops the menu once a command that
    /// is not completion navigation has run.
    pub(crate) fn update_inserted(&mut self, editor: &mut Editor) {
        if self.minibuffer.is_some() {
            return;
        }
        if let Some(completed) = self.virtual_ed.take() {
            *editor = completed;
        }
        self.selected = None;
        self.just_selected = false;
    }

    /// Full reset at loop init: also closes any search minibuffer
    pub(crate) fn hard_reset(&mut self) {
        self.minibuffer = None;
        self.non_inc = None;
        self.isearch_regex = None;
        self.isearch_insert = false;
        self.reset();
    }

    /// Drop the menu and any virtual state; the real line is untouched
    pub(crate) fn reset(&mut self) {
        self.cached = None;
        self.groups.clear();
        self.base = None;
        self.selected = None;
        self.virtual_ed = None;
        self.just_selected = false;
        self.span = (0, 0);
    }

    //
    // Incremental search ---------------------------------------------------
    //

    /// Switch the local keymap to isearch and open the minibuffer; all
    /// editing commands act on it from here on.
    pub(crate) fn isearch_start(
        &mut self,
        name: &str,
        autoinsert: bool,
        editor: &Editor,
        keymaps: &mut Keymaps,
        hint: &mut Hint,
    ) {
        keymaps.set_local(LocalKeymap::Isearch);
        self.isearch_insert = autoinsert;
        self.minibuffer = Some(Editor::new());
        self.isearch_name = name.to_string();
        if self.base.is_none() {
            self.base = Some(editor.clone());
        }
        hint.set(
            Style::new()
                .bold()
                .fg(Color::Cyan)
                .paint(format!("{name} (isearch): "))
                .to_string(),
        );
    }

    /// True while the isearch minibuffer is open
    pub(crate) fn isearching(&self) -> bool {
        self.minibuffer.is_some() && self.non_inc.is_none()
    }

    /// Leave isearch. With `commit` the shown match becomes the real line;
    /// the minibuffer text is preserved for search-again either way.
    pub(crate) fn isearch_stop(
        &mut self,
        commit: bool,
        editor: &mut Editor,
        keymaps: &mut Keymaps,
    ) {
        if keymaps.local() == LocalKeymap::Isearch {
            keymaps.set_local(LocalKeymap::None);
        }
        if let Some(minibuffer) = self.minibuffer.take() {
            self.isearch_text = minibuffer.line.to_string();
        }
        self.isearch_regex = None;
        self.isearch_insert = false;

        if commit {
            if let Some(completed) = self.virtual_ed.take() {
                *editor = completed;
            }
        }
        self.reset();
    }

    /// Recompile the minibuffer as a smart-case regex, refilter the cached
    /// candidates and re-select the first match. Invoked by the loop after
    /// every command while the search minibuffer is open.
    pub(crate) fn update_isearch(
        &mut self,
        config: &Config,
        term_width: usize,
        hint: &mut Hint,
    ) {
        let Some(minibuffer) = self.minibuffer.as_ref() else {
            return;
        };
        let text = minibuffer.line.to_string();

        if let Some(search) = self.non_inc {
            let mode = if search.substring { "substring" } else { "prefix" };
            hint.set(
                Style::new()
                    .bold()
                    .fg(Color::Cyan)
                    .paint(format!("{} (non-inc-search {mode}): ", self.isearch_name))
                    .to_string()
                    + &text,
            );
            return;
        }

        // A menu selection just happened: the minibuffer did not change,
        // refiltering would drop the selection.
        if self.just_selected {
            self.just_selected = false;
            return;
        }

        let pattern = if text.chars().any(char::is_uppercase) {
            text.clone()
        } else {
            format!("(?i){text}")
        };
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(_) => {
                hint.set(
                    Style::new()
                        .fg(Color::Red)
                        .paint("Failed to compile i-search regexp")
                        .to_string(),
                );
                return;
            }
        };

        // Refilter from the cached values, never re-running the completer.
        if let Some(values) = self.cached.take() {
            self.build_groups(&values, config, term_width);
            self.cached = Some(values);
        }
        for group in &mut self.groups {
            group.update_isearch(&regex);
        }

        hint.set(
            Style::new()
                .bold()
                .fg(Color::Cyan)
                .paint(format!("{} (isearch): ", self.isearch_name))
                .to_string()
                + &Style::new().bold().paint(&text).to_string(),
        );

        if self.isearch_insert && self.matches() > 0 && !text.is_empty() {
            self.select(1, 0);
            self.just_selected = false;
        }
        self.isearch_regex = Some(regex);
    }

    //
    // Non-incremental search -----------------------------------------------
    //

    /// Open the minibuffer without candidate filtering; the query applies
    /// once, on accept. The editing keymap is forced to insert style.
    pub(crate) fn non_isearch_start(
        &mut self,
        name: &str,
        repeat: bool,
        forward: bool,
        substring: bool,
        keymaps: &mut Keymaps,
        hint: &mut Hint,
    ) {
        let text = if repeat {
            self.isearch_text.clone()
        } else {
            String::new()
        };
        self.minibuffer = Some(Editor::from_str(&text));
        self.non_inc = Some(NonIncSearch {
            forward,
            substring,
            exit_main: keymaps.main(),
        });
        self.isearch_name = name.to_string();

        if !keymaps.is_emacs() && keymaps.main() != MainKeymap::ViInsert {
            keymaps.set_main(MainKeymap::ViInsert);
        }
        hint.set(
            Style::new()
                .bold()
                .fg(Color::Cyan)
                .paint(format!("{name} (non-inc-search): "))
                .to_string()
                + &text,
        );
    }

    /// The minibuffer query of an active non-incremental search
    pub(crate) fn non_searching(&self) -> Option<NonIncSearch> {
        self.non_inc
    }

    /// Close the non-incremental minibuffer, restoring the entry keymap
    pub(crate) fn non_isearch_stop(&mut self, keymaps: &mut Keymaps, hint: &mut Hint) {
        if let Some(minibuffer) = self.minibuffer.take() {
            self.isearch_text = minibuffer.line.to_string();
        }
        if let Some(search) = self.non_inc.take() {
            if keymaps.main() != search.exit_main {
                keymaps.set_main(search.exit_main);
            }
        }
        hint.reset();
    }

    /// The query to match once a non-incremental search is accepted
    pub(crate) fn minibuffer_query(&self) -> (String, usize) {
        match self.minibuffer.as_ref() {
            Some(minibuffer) => (minibuffer.line.to_string(), minibuffer.cursor.pos()),
            None => (self.isearch_text.clone(), self.isearch_text.chars().count()),
        }
    }

    //
    // Rendering ------------------------------------------------------------
    //

    /// Lay the groups out as display lines for the painter, highlighting
    /// the selected candidate. `max_rows` bounds the area; a dimmed marker
    /// says how many candidates were not shown.
    pub(crate) fn menu_lines(&self, max_rows: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut hidden = 0usize;

        for group in &self.groups {
            if group.is_empty() {
                continue;
            }
            if !group.tag.is_empty() {
                if lines.len() < max_rows {
                    lines.push(
                        Style::new()
                            .bold()
                            .fg(Color::Yellow)
                            .paint(format!("{}:", group.tag))
                            .to_string(),
                    );
                } else {
                    hidden += group.matches();
                    continue;
                }
            }

            for (y, row) in group.rows.iter().enumerate() {
                if lines.len() >= max_rows {
                    hidden += row.len();
                    continue;
                }
                lines.push(render_row(group, y, row));
            }
        }

        if hidden > 0 {
            let marker = Style::new()
                .dimmed()
                .paint(format!("... ({hidden} more)"))
                .to_string();
            lines.push(marker);
        }
        lines
    }
}

fn render_row(group: &Group, y: usize, row: &[Candidate]) -> String {
    let mut out = String::new();
    let selector = group.selector();

    for (x, candidate) in row.iter().enumerate() {
        let display = candidate.display_str();
        let width = group.columns_width.get(x).copied().unwrap_or(1);
        let pad = width.saturating_sub(display_width(display));

        if selector == Some((x, y)) {
            out.push_str(&Style::new().reverse().paint(display).to_string());
        } else if candidate.style.is_empty() {
            out.push_str(display);
        } else {
            out.push_str(&format!("{}{}\x1b[0m", candidate.style, display));
        }
        out.push_str(&" ".repeat(pad + 1));
    }

    // Description: from the row (aliased) or the single candidate.
    let description = if group.aliased {
        group.descriptions.get(y).cloned().unwrap_or_default()
    } else if row.len() == 1 {
        row[0].description.clone()
    } else {
        String::new()
    };

    if !description.is_empty() && description != CONTINUATION_MARK {
        let description = description.trim_start_matches('|');
        out.push_str(
            &Style::new()
                .dimmed()
                .paint(format!("{} {}", group.list_separator, description))
                .to_string(),
        );
    } else if description == CONTINUATION_MARK {
        out.push_str(&Style::new().dimmed().paint(CONTINUATION_MARK).to_string());
    }
    out
}

/// Length in code points of the word being completed: the shell word
/// from its start to the cursor.
fn word_prefix_len(editor: &Editor) -> usize {
    let pos = editor.cursor.pos();
    match editor.line.char_at(pos.wrapping_sub(1)) {
        None => 0,
        Some(c) if c.is_whitespace() => 0,
        Some(_) => {
            let (bpos, _) = editor.line.select_shell_word(pos - 1);
            pos.saturating_sub(bpos)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::edit_mode::EditMode;
    use pretty_assertions::assert_eq;

    fn values(candidates: &[&str]) -> Values {
        Values::new(candidates.iter().map(|c| Candidate::new(*c)).collect())
    }

    fn engine_over(line: &str, candidates: &[&str]) -> (CompletionEngine, Editor) {
        let editor = Editor::from_str(line);
        let mut engine = CompletionEngine::new();
        engine.start_with_values(values(candidates), &editor, &Config::new(), 80);
        (engine, editor)
    }

    #[test]
    fn selection_is_virtual_until_committed() {
        let (mut engine, mut editor) = engine_over("git ch", &["checkout", "cherry-pick"]);
        assert_eq!(engine.view(), BufferView::Real);

        engine.select(1, 0);
        assert_eq!(engine.view(), BufferView::Completed);
        assert_eq!(
            engine.virtual_mut().unwrap().line.to_string(),
            "git checkout"
        );
        // The real line is untouched until the commit.
        assert_eq!(editor.line.to_string(), "git ch");

        engine.update_inserted(&mut editor);
        assert_eq!(editor.line.to_string(), "git checkout");
        assert_eq!(editor.cursor.pos(), 12);
        assert_eq!(engine.view(), BufferView::Real);
    }

    #[test]
    fn reset_discards_the_virtual_state() {
        let (mut engine, mut editor) = engine_over("git ch", &["checkout"]);
        engine.select(1, 0);
        engine.reset();
        engine.update_inserted(&mut editor);
        assert_eq!(editor.line.to_string(), "git ch");
    }

    #[test]
    fn select_cycles_through_candidates_and_wraps() {
        let (mut engine, _) = engine_over("x ", &["aa", "bb"]);
        engine.select(1, 0);
        assert_eq!(engine.current_candidate().unwrap().value, "aa");
        engine.select(1, 0);
        assert_eq!(engine.current_candidate().unwrap().value, "bb");
        engine.select(1, 0);
        assert_eq!(engine.current_candidate().unwrap().value, "aa");
    }

    #[test]
    fn isearch_edits_go_to_the_minibuffer() {
        let (mut engine, editor) = engine_over("", &["make build", "make test"]);
        let mut keymaps = Keymaps::new(EditMode::Emacs);
        let mut hint = Hint::new();
        engine.isearch_start("history", true, &editor, &mut keymaps, &mut hint);

        assert_eq!(engine.view(), BufferView::Minibuffer);
        assert_eq!(keymaps.local(), LocalKeymap::Isearch);

        engine.minibuffer_mut().unwrap().insert_str_at_cursor("te");
        engine.update_isearch(&Config::new(), 80, &mut hint);
        assert_eq!(engine.matches(), 1);
        assert_eq!(engine.current_candidate().unwrap().value, "make test");
    }

    #[test]
    fn isearch_smart_case_is_sensitive_with_uppercase() {
        let (mut engine, editor) = engine_over("", &["Make Build", "make build"]);
        let mut keymaps = Keymaps::new(EditMode::Emacs);
        let mut hint = Hint::new();
        engine.isearch_start("history", false, &editor, &mut keymaps, &mut hint);

        engine.minibuffer_mut().unwrap().insert_str_at_cursor("make");
        engine.update_isearch(&Config::new(), 80, &mut hint);
        assert_eq!(engine.matches(), 2);

        engine.minibuffer_mut().unwrap().set_line(&['M', 'a', 'k', 'e']);
        engine.update_isearch(&Config::new(), 80, &mut hint);
        assert_eq!(engine.matches(), 1);
    }

    #[test]
    fn invalid_isearch_regex_keeps_candidates() {
        let (mut engine, editor) = engine_over("", &["alpha", "beta"]);
        let mut keymaps = Keymaps::new(EditMode::Emacs);
        let mut hint = Hint::new();
        engine.isearch_start("history", false, &editor, &mut keymaps, &mut hint);

        engine.minibuffer_mut().unwrap().insert_str_at_cursor("a(");
        engine.update_isearch(&Config::new(), 80, &mut hint);
        assert_eq!(engine.matches(), 2);
        assert!(strip_ansi(hint.current()).contains("Failed to compile"));
    }

    #[test]
    fn non_incremental_search_restores_the_entry_keymap() {
        let mut engine = CompletionEngine::new();
        let mut keymaps = Keymaps::new(EditMode::Vi);
        let mut hint = Hint::new();
        keymaps.set_main(MainKeymap::ViCommand);

        engine.non_isearch_start("history /", false, true, true, &mut keymaps, &mut hint);
        assert_eq!(keymaps.main(), MainKeymap::ViInsert);
        assert!(engine.non_searching().is_some());

        engine.minibuffer_mut().unwrap().insert_str_at_cursor("query");
        engine.non_isearch_stop(&mut keymaps, &mut hint);
        assert_eq!(keymaps.main(), MainKeymap::ViCommand);
        assert_eq!(engine.minibuffer_query().0, "query");
    }
}
