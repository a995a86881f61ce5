use std::collections::HashMap;

use nu_ansi_term::{Color, Style};
use regex::Regex;

use super::{History, MemoryHistory};
use crate::commands::Command;
use crate::completion::{Candidate, Values};
use crate::core_editor::{Editor, LineState};
use crate::enums::AcceptKind;
use crate::hint::Hint;
use crate::inputrc::Config;

const DEFAULT_SOURCE_NAME: &str = "history";

/// Ceiling applied when `history-size` is set to zero explicitly.
const DEFAULT_HISTORY_SIZE: i64 = 500;

/// Per-line undo snapshots kept before the oldest ones fall off.
const UNDO_STACK_SIZE: usize = 100;

fn has_uppercase(text: &str) -> bool {
    text.chars().any(char::is_uppercase)
}

/// Per-line undo history: snapshots of `(line, cursor)` taken on save
/// requests, kept per history position so edits to a recalled line survive
/// walking away and back.
#[derive(Debug, Default, Clone)]
struct LineHistory {
    undos: Vec<LineState>,
    redos: Vec<LineState>,
    /// Last state the user saw, restored instead of the raw history line
    latest: Option<LineState>,
}

/// Manages and serves all history sources bound to the shell, the walk
/// position over them, the accept flags, and the per-line undo stacks.
pub(crate) struct Sources {
    list: Vec<(String, Box<dyn History>)>,
    source_pos: usize,

    /// Walk position: 0 is the live buffer, 1 the most recent entry
    hpos: usize,
    /// The live buffer, stashed while walking the history
    buf: String,
    /// Preserved cursor column for `history-preserve-point`
    cpos: Option<usize>,
    /// On next loop init, advance past the first match of the accepted line
    infer: bool,

    accepted: bool,
    accept_hold: bool,
    accept_line: String,
    accept_kind: Option<AcceptKind>,

    // Per-line undo state
    skip: bool,
    pushed_this_dispatch: bool,
    last: Option<Command>,
    edits: HashMap<(usize, usize), LineHistory>,
}

impl Sources {
    pub(crate) fn new() -> Self {
        let default_source: Box<dyn History> = Box::new(MemoryHistory::new());
        Sources {
            list: vec![(DEFAULT_SOURCE_NAME.to_string(), default_source)],
            source_pos: 0,
            hpos: 0,
            buf: String::new(),
            cpos: None,
            infer: false,
            accepted: false,
            accept_hold: false,
            accept_line: String::new(),
            accept_kind: None,
            skip: false,
            pushed_this_dispatch: false,
            last: None,
            edits: HashMap::new(),
        }
    }

    //
    // Source management ----------------------------------------------------
    //

    /// Bind a source under a name. The initial default in-memory source is
    /// replaced by the first added one; further sources join the list.
    pub(crate) fn add(&mut self, name: impl Into<String>, source: Box<dyn History>) {
        if self.list.len() == 1 && self.list[0].0 == DEFAULT_SOURCE_NAME {
            self.list.clear();
        }
        self.list.push((name.into(), source));
    }

    /// Remove sources by name; with no names, remove them all
    pub(crate) fn delete(&mut self, names: &[&str]) {
        if names.is_empty() {
            self.list.clear();
        } else {
            self.list.retain(|(name, _)| !names.contains(&name.as_str()));
        }
        self.source_pos = 0;
        if !self.infer {
            self.hpos = 0;
        }
    }

    /// Make the next (or previous) source the active one
    pub(crate) fn cycle(&mut self, next: bool) {
        if self.list.is_empty() {
            return;
        }
        self.source_pos = if next {
            (self.source_pos + 1) % self.list.len()
        } else {
            self.source_pos.checked_sub(1).unwrap_or(self.list.len() - 1)
        };
    }

    pub(crate) fn on_last_source(&self) -> bool {
        self.source_pos + 1 == self.list.len()
    }

    pub(crate) fn current(&self) -> Option<&dyn History> {
        self.list.get(self.source_pos).map(|(_, h)| h.as_ref())
    }

    /// Name of the active source
    pub(crate) fn name(&self) -> &str {
        self.list
            .get(self.source_pos)
            .map_or(DEFAULT_SOURCE_NAME, |(name, _)| name.as_str())
    }

    pub(crate) fn hpos(&self) -> usize {
        self.hpos
    }

    //
    // Loop lifecycle -------------------------------------------------------
    //

    /// Initialize positions and buffers at the start of a read loop. The
    /// accept-and-hold and infer flags of the previous accept decide
    /// whether a line is brought back outright.
    pub(crate) fn init(&mut self, editor: &mut Editor, hint: &mut Hint, config: &Config) {
        if self.accept_hold {
            self.hpos = 0;
            let content: Vec<char> = self.accept_line.chars().collect();
            editor.set_line(&content);
        } else if !self.infer {
            self.hpos = 0;
        } else if self.hpos == 0 {
            let accepted = self.accept_line.clone();
            self.insert_after_match(&accepted, editor);
        } else {
            self.walk(-1, editor, hint, config);
        }

        self.infer = false;
        self.source_pos = 0;
        self.accepted = false;
        self.accept_kind = None;
        self.cpos = None;
    }

    /// Reset the per-dispatch undo bookkeeping (loop init)
    pub(crate) fn reset(&mut self) {
        self.skip = false;
        self.pushed_this_dispatch = false;
        self.last = None;
    }

    //
    // Navigation -----------------------------------------------------------
    //

    /// Move the walk position by `delta` (positive walks into older
    /// entries), clamped to `[0, len]`. Leaving position 0 stashes the live
    /// buffer; coming back restores it. A recalled line with pending edits
    /// is shown in its edited state.
    pub(crate) fn walk(
        &mut self,
        delta: isize,
        editor: &mut Editor,
        hint: &mut Hint,
        config: &Config,
    ) {
        let Some(history) = self.current() else {
            return;
        };
        let len = history.len();
        if len == 0 {
            return;
        }
        if (delta < 0 && self.hpos == 0) || (delta > 0 && self.hpos == len) {
            return;
        }

        if self.hpos == 0 && delta > 0 {
            self.buf = editor.line.to_string();
        }
        self.stash_latest(editor);

        self.hpos = (self.hpos as isize + delta).clamp(0, len as isize) as usize;

        if self.hpos == 0 {
            let content: Vec<char> = self.buf.chars().collect();
            editor.set_line(&content);
            return;
        }

        let edited = self
            .edits
            .get(&(self.source_pos, self.hpos))
            .and_then(|edits| edits.latest.as_ref())
            .map(|state| state.line.to_string());

        let line = match edited {
            Some(line) => line,
            None => match self.fetch_line(len - self.hpos) {
                Ok(line) => line,
                Err(message) => {
                    hint.set(Style::new().fg(Color::Red).paint(message).to_string());
                    return;
                }
            },
        };

        self.set_line_cursor_match(&line, editor, config);
    }

    /// Make the history entry at the absolute index the current buffer
    pub(crate) fn fetch(&mut self, pos: usize, editor: &mut Editor, hint: &mut Hint) {
        let Some(history) = self.current() else {
            return;
        };
        if history.len() == 0 || pos >= history.len() {
            return;
        }
        match self.fetch_line(pos) {
            Ok(line) => {
                let content: Vec<char> = line.chars().collect();
                editor.set_line(&content);
            }
            Err(message) => hint.set(Style::new().fg(Color::Red).paint(message).to_string()),
        }
    }

    /// The most recent line of the active source
    pub(crate) fn get_last(&self) -> Option<String> {
        let history = self.current()?;
        if history.len() == 0 {
            return None;
        }
        history.get_line(history.len() - 1).ok()
    }

    fn fetch_line(&self, pos: usize) -> std::result::Result<String, String> {
        let history = self.current().ok_or_else(|| "no history".to_string())?;
        history
            .get_line(pos)
            .map_err(|err| format!("history error: {err}"))
    }

    fn set_line_cursor_match(&mut self, next: &str, editor: &mut Editor, config: &Config) {
        // Record the column the user walked away from, once.
        if self.cpos.is_none()
            && editor.line.len() > 0
            && editor.cursor.pos() + 1 < editor.line.len()
        {
            self.cpos = Some(editor.cursor.pos());
        }

        let content: Vec<char> = next.chars().collect();
        editor.line.set(&content);

        match self.cpos {
            Some(cpos) if config.get_bool("history-preserve-point") && editor.line.len() > cpos => {
                editor.cursor.set(cpos, &editor.line);
            }
            _ => editor.cursor.set(editor.line.len(), &editor.line),
        }
    }

    //
    // Accepting ------------------------------------------------------------
    //

    /// Signal the line was accepted and must be returned to the caller.
    /// With `hold` the line is redisplayed on the next loop; with `infer`
    /// the line is not written, but matched against on the next init.
    pub(crate) fn accept(
        &mut self,
        hold: bool,
        infer: bool,
        kind: AcceptKind,
        editor: &Editor,
        hint: &mut Hint,
        config: &Config,
    ) {
        self.accepted = true;
        self.accept_hold = hold;
        self.accept_line = editor.line.to_string();
        self.accept_kind = Some(kind);

        if infer {
            self.infer = true;
        } else if kind == AcceptKind::Enter {
            let line = self.accept_line.clone();
            self.write(&line, hint, config);
        }
    }

    /// Write an accepted line to every bound source, unless it duplicates
    /// the most recent entry or the source reached its `history-size`
    /// ceiling (negative: unbounded; zero set: 500; zero unset: unbounded).
    pub(crate) fn write(&mut self, line: &str, hint: &mut Hint, config: &Config) {
        if line.trim().is_empty() {
            return;
        }

        let raw = config.get_int("history-size");
        let ceiling: Option<i64> = if raw < 0 {
            None
        } else if raw == 0 {
            config
                .is_set("history-size")
                .then_some(DEFAULT_HISTORY_SIZE)
        } else {
            Some(raw)
        };

        for (_, history) in &mut self.list {
            if let Some(max) = ceiling {
                if history.len() as i64 >= max {
                    continue;
                }
            }

            // Never store the same line twice in a row.
            let last = (history.len() > 0)
                .then(|| history.get_line(history.len() - 1).ok())
                .flatten();
            if last.as_deref() == Some(line) {
                continue;
            }

            if let Err(err) = history.write(line) {
                hint.set(
                    Style::new()
                        .fg(Color::Red)
                        .paint(err.to_string())
                        .to_string(),
                );
            }
        }
    }

    /// Whether the user accepted the line; strips configured comments and,
    /// with `revert-all-at-newline`, drops all per-line edit histories.
    pub(crate) fn line_accepted(&mut self, config: &Config) -> Option<(String, AcceptKind)> {
        if !self.accepted {
            return None;
        }

        let mut line = self.accept_line.clone();
        let comment = config.get_str("comment-begin").trim_matches('"').to_string();
        if !comment.is_empty() {
            let pattern = format!(r"(^|\s){}.*", regex::escape(&comment));
            if let Ok(comments) = Regex::new(&pattern) {
                line = comments.replace_all(&line, "").to_string();
            }
        }

        if config.get_bool("revert-all-at-newline") {
            self.edits.clear();
        }

        Some((line, self.accept_kind.unwrap_or(AcceptKind::Enter)))
    }

    //
    // Searching ------------------------------------------------------------
    //

    /// Find the first history line matching the query, scanning from a
    /// start chosen by `use_pos` (the walk position) or the direction, and
    /// make it the buffer. Substring queries match as smart-case regexes,
    /// otherwise the query must be a prefix of the entry.
    pub(crate) fn insert_match(
        &mut self,
        query: &str,
        query_cursor: usize,
        editor: &mut Editor,
        use_pos: bool,
        forward: bool,
        substring: bool,
    ) {
        let Some((line, pos)) = self.match_line(query, query_cursor, use_pos, forward, substring)
        else {
            return;
        };
        let len = self.current().map_or(0, |history| history.len());

        self.hpos = len - pos;
        let content: Vec<char> = line.chars().collect();
        editor.set_line(&content);
    }

    fn match_line(
        &self,
        query: &str,
        query_cursor: usize,
        use_pos: bool,
        forward: bool,
        substring: bool,
    ) -> Option<(String, usize)> {
        let history = self.current()?;
        let len = history.len() as isize;
        if len == 0 {
            return None;
        }

        let mut pos: isize = if use_pos && self.hpos > 0 {
            len - self.hpos as isize
        } else if forward {
            -1
        } else {
            len
        };

        let matcher: Box<dyn Fn(&str) -> bool> = if substring {
            let text: String = query.chars().take(query_cursor).collect();
            let mut pattern = regex::escape(&text);
            if !has_uppercase(&text) {
                pattern = format!("(?i){pattern}");
            }
            let regex = Regex::new(&pattern).ok()?;
            Box::new(move |line: &str| regex.is_match(line))
        } else {
            let prefix = query.to_string();
            Box::new(move |line: &str| line.len() >= prefix.len() && line.starts_with(&prefix))
        };

        loop {
            if forward {
                if pos + 1 >= len {
                    return None;
                }
                pos += 1;
            } else {
                if pos <= 0 {
                    return None;
                }
                pos -= 1;
            }

            let Ok(line) = history.get_line(pos as usize) else {
                return None;
            };
            if matcher(&line) {
                return Some((line, pos as usize));
            }
        }
    }

    /// Find the entry matching `query` as a prefix and insert the entry
    /// following it, if any.
    pub(crate) fn insert_after_match(&mut self, query: &str, editor: &mut Editor) {
        let Some((_, pos)) = self.match_line(query, 0, false, false, false) else {
            return;
        };
        let Some(history) = self.current() else {
            return;
        };
        if pos + 1 >= history.len() {
            return;
        }
        if let Ok(line) = history.get_line(pos + 1) {
            let content: Vec<char> = line.chars().collect();
            editor.set_line(&content);
            self.hpos = history.len() - (pos + 1);
        }
    }

    /// The most recent history line extending `line` as a prefix, for
    /// autosuggestion. `None` when nothing (longer) matches.
    pub(crate) fn suggest(&self, line: &str) -> Option<String> {
        if line.is_empty() {
            return None;
        }
        let (suggested, _) = self.match_line(line, 0, false, false, false)?;
        (suggested.len() > line.len()).then_some(suggested)
    }

    /// History lines as completion candidates, most recent first unless
    /// `forward`; with `filter`, only lines extending the current buffer.
    pub(crate) fn complete(
        &mut self,
        forward: bool,
        filter: bool,
        editor: &Editor,
        hint: &mut Hint,
    ) -> Values {
        let Some(history) = self.current() else {
            return Values::default();
        };

        hint.set(
            Style::new()
                .bold()
                .fg(Color::Cyan)
                .paint(self.name().to_string())
                .to_string(),
        );

        let len = history.len();
        let prefix = editor.line.to_string();
        let pad = len.to_string().len();
        let mut candidates: Vec<Candidate> = Vec::new();

        let indexes: Vec<usize> = if forward {
            (0..len).collect()
        } else {
            (0..len).rev().collect()
        };

        for pos in indexes {
            let Ok(line) = history.get_line(pos) else {
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            if filter && !line.starts_with(&prefix) {
                continue;
            }
            if candidates.iter().any(|c| c.value == line) {
                continue;
            }

            let flat = line.replace('\n', " ");
            let index = Style::new().dimmed().paint(format!("{pos:<pad$}")).to_string();
            candidates.push(
                Candidate::new(line)
                    .with_display(format!("{index} {flat}"))
                    .with_tag(self.name().to_string()),
            );
        }

        let mut values = Values::new(candidates).no_sort_all().list_long_all();
        values.prefix = prefix;
        values
    }

    //
    // Per-line undo --------------------------------------------------------
    //

    fn edits_entry(&mut self) -> &mut LineHistory {
        self.edits
            .entry((self.source_pos, self.hpos))
            .or_default()
    }

    fn stash_latest(&mut self, editor: &Editor) {
        let key = (self.source_pos, self.hpos);
        if let Some(edits) = self.edits.get_mut(&key) {
            if !edits.undos.is_empty() {
                edits.latest = Some(editor.snapshot());
            }
        }
    }

    /// Push an undo snapshot of the current state, unless the running
    /// command asked to skip saving.
    pub(crate) fn save(&mut self, editor: &Editor) {
        if self.skip {
            return;
        }
        let snapshot = editor.snapshot();
        let edits = self.edits_entry();

        if edits.undos.last() == Some(&snapshot) {
            return;
        }
        // Saving along the redo path keeps it; diverging drops it.
        if edits.redos.last() == Some(&snapshot) {
            edits.redos.pop();
        } else {
            edits.redos.clear();
        }
        if edits.undos.len() == UNDO_STACK_SIZE {
            edits.undos.remove(0);
        }
        edits.undos.push(snapshot);
        self.pushed_this_dispatch = true;
    }

    /// Mark the running command as not producing an undo unit
    pub(crate) fn skip_save(&mut self) {
        self.skip = true;
    }

    /// Post-dispatch bookkeeping: records the binding and collapses
    /// consecutive identical edits into one undo unit.
    pub(crate) fn save_with_command(&mut self, bind: Option<Command>) {
        if self.pushed_this_dispatch && bind.is_some() && bind == self.last {
            let edits = self.edits_entry();
            if edits.undos.len() > 1 {
                edits.undos.pop();
            }
        }
        if bind.is_some() {
            self.last = bind;
        }
        self.skip = false;
        self.pushed_this_dispatch = false;
    }

    /// Restore the last undo snapshot
    pub(crate) fn undo(&mut self, editor: &mut Editor) {
        let current = editor.snapshot();
        let edits = self.edits_entry();
        let Some(state) = edits.undos.pop() else {
            return;
        };
        edits.redos.push(current);
        editor.restore(&state);
    }

    /// Re-apply the last undone snapshot
    pub(crate) fn redo(&mut self, editor: &mut Editor) {
        let current = editor.snapshot();
        let edits = self.edits_entry();
        let Some(state) = edits.redos.pop() else {
            return;
        };
        edits.undos.push(current);
        editor.restore(&state);
    }

    pub(crate) fn can_redo(&self) -> bool {
        self.edits
            .get(&(self.source_pos, self.hpos))
            .is_some_and(|edits| !edits.redos.is_empty())
    }

    /// Undo every change made to the current line
    pub(crate) fn revert_line(&mut self, editor: &mut Editor) {
        let edits = self.edits_entry();
        if let Some(first) = edits.undos.first().cloned() {
            edits.undos.clear();
            edits.redos.clear();
            edits.latest = None;
            editor.restore(&first);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources_with(lines: &[&str]) -> Sources {
        let mut sources = Sources::new();
        sources.add(
            "test",
            Box::new(MemoryHistory::with_lines(lines.iter().copied())),
        );
        sources
    }

    fn fixture() -> (Sources, Editor, Hint, Config) {
        (
            sources_with(&["make build", "make test", "make clean"]),
            Editor::new(),
            Hint::new(),
            Config::new(),
        )
    }

    #[test]
    fn walk_goes_to_most_recent_first() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        sources.walk(1, &mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make clean");
        sources.walk(1, &mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make test");
    }

    #[test]
    fn walk_round_trip_restores_the_live_buffer() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        editor.insert_str_at_cursor("draft line");

        sources.walk(2, &mut editor, &mut hint, &config);
        assert_eq!(sources.hpos(), 2);
        sources.walk(-2, &mut editor, &mut hint, &config);
        assert_eq!(sources.hpos(), 0);
        assert_eq!(editor.line.to_string(), "draft line");
        assert_eq!(editor.cursor.pos(), 10);
    }

    #[test]
    fn walk_clamps_at_the_ends() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        sources.walk(-1, &mut editor, &mut hint, &config);
        assert_eq!(sources.hpos(), 0);
        sources.walk(10, &mut editor, &mut hint, &config);
        assert_eq!(sources.hpos(), 3);
        sources.walk(10, &mut editor, &mut hint, &config);
        assert_eq!(sources.hpos(), 3);
    }

    #[test]
    fn preserve_point_keeps_the_column() {
        let (mut sources, mut editor, mut hint, mut config) = fixture();
        config.set_from_str("history-preserve-point", "on");
        editor.insert_str_at_cursor("draft");
        editor.cursor.set(2, &editor.line);

        sources.walk(1, &mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make clean");
        assert_eq!(editor.cursor.pos(), 2);
    }

    #[test]
    fn insert_match_forward_finds_smallest_index() {
        let (mut sources, mut editor, _, _) = fixture();
        sources.insert_match("make", 4, &mut editor, false, true, false);
        assert_eq!(editor.line.to_string(), "make build");
        assert_eq!(sources.hpos(), 3);
    }

    #[test]
    fn insert_match_backward_finds_largest_index() {
        let (mut sources, mut editor, _, _) = fixture();
        sources.insert_match("make", 4, &mut editor, false, false, false);
        assert_eq!(editor.line.to_string(), "make clean");
        assert_eq!(sources.hpos(), 1);
    }

    #[test]
    fn substring_search_uses_smart_case() {
        let mut sources = sources_with(&["Make Things", "do stuff"]);
        let mut editor = Editor::new();

        sources.insert_match("make", 4, &mut editor, false, false, true);
        assert_eq!(editor.line.to_string(), "Make Things");

        let mut editor = Editor::new();
        sources.insert_match("MAKE", 4, &mut editor, false, false, true);
        assert_eq!(editor.line.to_string(), "");
    }

    #[test]
    fn duplicate_writes_are_suppressed() {
        let (mut sources, _, mut hint, config) = fixture();
        sources.write("make clean", &mut hint, &config);
        sources.write("new line", &mut hint, &config);
        sources.write("new line", &mut hint, &config);
        assert_eq!(sources.current().unwrap().len(), 4);
    }

    #[test]
    fn history_size_ceiling_refuses_writes() {
        let (mut sources, _, mut hint, mut config) = fixture();
        config.set_from_str("history-size", "3");
        sources.write("over the limit", &mut hint, &config);
        assert_eq!(sources.current().unwrap().len(), 3);

        config.set_from_str("history-size", "-1");
        sources.write("unbounded again", &mut hint, &config);
        assert_eq!(sources.current().unwrap().len(), 4);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let (mut sources, mut editor, _, _) = fixture();
        editor.insert_str_at_cursor("abc");
        sources.save(&editor);
        editor.insert_str_at_cursor("def");
        let before_undo = editor.snapshot();

        sources.undo(&mut editor);
        assert_eq!(editor.line.to_string(), "abc");
        sources.redo(&mut editor);
        assert_eq!(editor.snapshot(), before_undo);
    }

    #[test]
    fn skip_save_never_grows_the_stack() {
        let (mut sources, mut editor, _, _) = fixture();
        editor.insert_str_at_cursor("abc");
        sources.skip_save();
        sources.save(&editor);
        sources.undo(&mut editor);
        assert_eq!(editor.line.to_string(), "abc");
    }

    #[test]
    fn consecutive_identical_edits_collapse() {
        let (mut sources, mut editor, _, _) = fixture();

        for c in ['a', 'b', 'c'] {
            sources.save(&editor);
            editor.insert_str_at_cursor(&c.to_string());
            sources.save_with_command(Some(Command::SelfInsert));
        }

        sources.undo(&mut editor);
        assert_eq!(editor.line.to_string(), "");
    }

    #[test]
    fn accept_strips_comments() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        editor.insert_str_at_cursor("make all # builds everything");
        sources.accept(
            false,
            false,
            AcceptKind::Enter,
            &editor,
            &mut hint,
            &config,
        );
        let (line, kind) = sources.line_accepted(&config).expect("accepted");
        assert_eq!(line, "make all");
        assert_eq!(kind, AcceptKind::Enter);
    }

    #[test]
    fn suggest_returns_extending_line_only() {
        let (sources, ..) = fixture();
        assert_eq!(sources.suggest("make b"), Some("make build".to_string()));
        assert_eq!(sources.suggest("make clean"), None);
        assert_eq!(sources.suggest(""), None);
    }

    #[test]
    fn edited_recalled_line_survives_walking_away() {
        let (mut sources, mut editor, mut hint, config) = fixture();

        sources.walk(1, &mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make clean");
        sources.save(&editor);
        editor.insert_str_at_cursor(" --force");

        sources.walk(1, &mut editor, &mut hint, &config);
        sources.walk(-1, &mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make clean --force");
    }

    #[test]
    fn accept_and_hold_brings_the_line_back() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        editor.insert_str_at_cursor("kept line");
        sources.accept(true, false, AcceptKind::Enter, &editor, &mut hint, &config);

        editor.reset();
        sources.init(&mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "kept line");
        assert_eq!(editor.cursor.pos(), 9);
    }

    #[test]
    fn accept_with_infer_inserts_the_following_line() {
        let (mut sources, mut editor, mut hint, config) = fixture();
        editor.insert_str_at_cursor("make build");
        sources.accept(false, true, AcceptKind::Enter, &editor, &mut hint, &config);

        editor.reset();
        sources.init(&mut editor, &mut hint, &config);
        assert_eq!(editor.line.to_string(), "make test");
    }
}
