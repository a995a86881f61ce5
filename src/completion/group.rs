use itertools::Itertools;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::{Candidate, Values};

/// Pseudo-description marking the continuation rows of a wrapped aliased
/// row in the display.
pub(crate) const CONTINUATION_MARK: &str = "|_";

/// Strip ANSI color/effect sequences before measuring display width.
pub(crate) fn strip_ansi(text: &str) -> String {
    // The sequences tideline emits are all CSI ... final-byte.
    let pattern = Regex::new("\x1b\\[[0-9;?]*[ -/]*[@-~]").expect("static pattern compiles");
    pattern.replace_all(text, "").to_string()
}

pub(crate) fn display_width(text: &str) -> usize {
    strip_ansi(text).width()
}

/// One tagged group of completion candidates with its display grid.
///
/// Non-aliased groups pack candidates into a width-balanced grid; aliased
/// groups (candidates sharing a description) lay the aliases of one
/// description out on one row, wrapping into continuation rows when the
/// cumulative column width passes half the terminal.
#[derive(Debug, Default)]
pub(crate) struct Group {
    pub(crate) tag: String,
    pub(crate) rows: Vec<Vec<Candidate>>,
    pub(crate) descriptions: Vec<String>,
    pub(crate) columns_width: Vec<usize>,
    pub(crate) list_separator: String,
    pub(crate) list: bool,
    pub(crate) no_sort: bool,
    pub(crate) aliased: bool,
    pub(crate) preserve_escapes: bool,

    // Selector coordinates; -1 means "not entered yet".
    pos_x: isize,
    pos_y: isize,

    term_width: usize,
}

impl Group {
    pub(crate) fn new(
        tag: &str,
        mut candidates: Vec<Candidate>,
        values: &Values,
        list_separator: &str,
        term_width: usize,
    ) -> Self {
        let mut group = Group {
            tag: tag.to_string(),
            list_separator: list_separator.to_string(),
            list: Values::tag_flag(&values.list_long, tag),
            no_sort: Values::tag_flag(&values.no_sort, tag),
            preserve_escapes: Values::tag_flag(&values.escapes, tag),
            pos_x: -1,
            pos_y: -1,
            term_width: term_width.max(10),
            ..Default::default()
        };
        if let Some(sep) = values.list_sep.get(tag).or_else(|| values.list_sep.get("*")) {
            group.list_separator = sep.clone();
        }

        if !group.no_sort {
            candidates.sort_by(|a, b| a.value.cmp(&b.value));
        }

        group.aliased = aliased_candidates(&candidates);
        if group.aliased {
            group.init_aliased(candidates);
        } else {
            group.init_grid(candidates);
        }
        group
    }

    /// Width-packed grid for candidates that do not share descriptions
    fn init_grid(&mut self, candidates: Vec<Candidate>) {
        let sep_width = self.list_separator.len() + 2;
        let pair_width = candidates
            .iter()
            .map(|c| {
                let desc = display_width(&c.description);
                display_width(c.display_str()) + if desc > 0 { desc + sep_width } else { 0 }
            })
            .max()
            .unwrap_or(1)
            .max(1);

        let columns = if self.list {
            1
        } else {
            (self.term_width / (pair_width + 2)).max(1)
        };

        self.rows = candidates
            .chunks(columns)
            .map(|chunk| chunk.to_vec())
            .collect();
        self.descriptions = candidates.iter().map(|c| c.description.clone()).collect();
        self.compute_column_widths(columns);
    }

    /// Aliased layout: one row per description, wrapped into continuation
    /// rows when the columns exceed half the terminal width.
    fn init_aliased(&mut self, candidates: Vec<Candidate>) {
        let mut order: Vec<String> = Vec::new();
        let mut per_description: Vec<Vec<Candidate>> = Vec::new();
        for candidate in candidates {
            match order.iter().position(|d| *d == candidate.description) {
                Some(found) => per_description[found].push(candidate),
                None => {
                    order.push(candidate.description.clone());
                    per_description.push(vec![candidate]);
                }
            }
        }

        let columns = per_description.iter().map(Vec::len).max().unwrap_or(1);
        self.compute_widths_over(&per_description, columns);

        // Cap the columns so the alias area keeps to half the terminal.
        let mut breakeven = 0;
        let mut max_columns = columns;
        for (i, width) in self.columns_width.iter().enumerate() {
            if breakeven + width + 2 > self.term_width / 2 {
                max_columns = i.max(1);
                break;
            }
            breakeven += width + 2;
        }

        let mut rows = Vec::new();
        let mut descriptions = Vec::new();
        for (description, mut row) in order.into_iter().zip(per_description) {
            let mut split = false;
            while row.len() > max_columns {
                rows.push(row.drain(..max_columns).collect_vec());
                descriptions.push(CONTINUATION_MARK.to_string());
                split = true;
            }
            descriptions.push(if split {
                format!("|{description}")
            } else {
                description
            });
            rows.push(row);
        }

        self.rows = rows;
        self.descriptions = descriptions;
        self.compute_column_widths(max_columns);
    }

    fn compute_widths_over(&mut self, rows: &[Vec<Candidate>], columns: usize) {
        let mut widths = vec![0usize; columns];
        for row in rows {
            for (x, candidate) in row.iter().enumerate() {
                widths[x] = widths[x].max(display_width(candidate.display_str()) + 1);
            }
        }
        self.columns_width = widths;
    }

    fn compute_column_widths(&mut self, columns: usize) {
        let rows = std::mem::take(&mut self.rows);
        self.compute_widths_over(&rows, columns);
        self.rows = rows;
    }

    //
    // Selection geometry ---------------------------------------------------
    //

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Total candidates in the group
    pub(crate) fn matches(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub(crate) fn entered(&self) -> bool {
        self.pos_x >= 0 && self.pos_y >= 0
    }

    pub(crate) fn selector(&self) -> Option<(usize, usize)> {
        self.entered()
            .then_some((self.pos_x as usize, self.pos_y as usize))
    }

    /// The selected candidate; the first one while not entered
    pub(crate) fn selected(&self) -> Option<&Candidate> {
        if let Some((x, y)) = self.selector() {
            return self.rows.get(y).and_then(|row| row.get(x));
        }
        self.rows.iter().find_map(|row| row.first())
    }

    pub(crate) fn first_cell(&mut self) {
        self.pos_x = 0;
        self.pos_y = 0;
    }

    pub(crate) fn last_cell(&mut self) {
        self.pos_y = self.rows.len() as isize - 1;
        let row_len = self.rows.last().map_or(0, Vec::len);
        self.pos_x = row_len as isize - 1;
    }

    /// Forget the selector position (cursor left the group)
    pub(crate) fn leave(&mut self) {
        self.pos_x = -1;
        self.pos_y = -1;
    }

    fn linear(&self) -> usize {
        let (x, y) = self.selector().unwrap_or((0, 0));
        self.rows[..y].iter().map(Vec::len).sum::<usize>() + x
    }

    fn set_linear(&mut self, mut index: usize) {
        for (y, row) in self.rows.iter().enumerate() {
            if index < row.len() {
                self.pos_y = y as isize;
                self.pos_x = index as isize;
                return;
            }
            index -= row.len();
        }
        self.last_cell();
    }

    /// Walk the grid. Returns `(done, next)`: `done` when the cursor left
    /// the group, `next` when the following group should take focus
    /// (otherwise the previous one). Vertical moves clamp to the row
    /// length, skipping the ragged right edge of aliased rows.
    pub(crate) fn move_selector(&mut self, dx: isize, dy: isize) -> (bool, bool) {
        let total = self.matches();
        if total == 0 {
            return (true, dx > 0 || dy > 0);
        }

        if !self.entered() {
            if dx < 0 || dy < 0 {
                self.last_cell();
            } else {
                self.first_cell();
            }
            return (false, false);
        }

        if dy != 0 {
            let ny = self.pos_y + dy;
            if ny < 0 {
                self.leave();
                return (true, false);
            }
            if ny >= self.rows.len() as isize {
                self.leave();
                return (true, true);
            }
            self.pos_y = ny;
            let row_len = self.rows[ny as usize].len() as isize;
            self.pos_x = self.pos_x.min(row_len - 1).max(0);
            return (false, false);
        }

        let index = self.linear() as isize + dx;
        if index < 0 {
            self.leave();
            return (true, false);
        }
        if index >= total as isize {
            self.leave();
            return (true, true);
        }
        self.set_linear(index as usize);
        (false, false)
    }

    /// Keep only the candidates matching the incremental-search regex
    /// (against value or description) and rebuild the grid.
    pub(crate) fn update_isearch(&mut self, regex: &Regex) {
        let keep: Vec<Candidate> = self
            .rows
            .drain(..)
            .flatten()
            .filter(|c| {
                regex.is_match(&c.value)
                    || (!c.description.is_empty() && regex.is_match(&c.description))
            })
            .collect();

        self.leave();
        self.descriptions.clear();
        self.columns_width = vec![0];
        if keep.is_empty() {
            return;
        }

        self.aliased = aliased_candidates(&keep);
        if self.aliased {
            self.init_aliased(keep);
        } else {
            self.init_grid(keep);
        }
    }
}

/// True when two or more candidates share a non-empty description
fn aliased_candidates(candidates: &[Candidate]) -> bool {
    candidates
        .iter()
        .filter(|c| !c.description.is_empty())
        .counts_by(|c| c.description.clone())
        .values()
        .any(|count| *count > 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(values: &[&str]) -> Vec<Candidate> {
        values.iter().map(|v| Candidate::new(*v)).collect()
    }

    fn group(candidates: Vec<Candidate>) -> Group {
        Group::new("test", candidates, &Values::default(), "--", 80)
    }

    #[test]
    fn grid_rows_pack_to_terminal_width() {
        let grid = group(plain(&["aa", "bb", "cc", "dd", "ee"]));
        assert!(!grid.aliased);
        assert_eq!(grid.matches(), 5);
        // 80 / (2 + 2) = 20 columns, so everything fits one row.
        assert_eq!(grid.rows.len(), 1);
    }

    #[test]
    fn candidates_are_sorted_unless_no_sort() {
        let grid = group(plain(&["zeta", "alpha"]));
        assert_eq!(grid.rows[0][0].value, "alpha");

        let no_sort = Group::new(
            "test",
            plain(&["zeta", "alpha"]),
            &Values::default().no_sort_all(),
            "--",
            80,
        );
        assert_eq!(no_sort.rows[0][0].value, "zeta");
    }

    #[test]
    fn shared_descriptions_are_aliased_on_one_row() {
        let candidates = vec![
            Candidate::new("-v").with_description("verbose"),
            Candidate::new("--verbose").with_description("verbose"),
            Candidate::new("-q").with_description("quiet"),
        ];
        let grid = group(candidates);
        assert!(grid.aliased);
        let verbose_row = grid
            .descriptions
            .iter()
            .position(|d| d == "verbose")
            .expect("description row");
        assert_eq!(grid.rows[verbose_row].len(), 2);
    }

    #[test]
    fn selector_walks_and_leaves_at_the_edges() {
        let mut grid = group(plain(&["aa", "bb", "cc"]));
        assert_eq!(grid.move_selector(1, 0), (false, false));
        assert_eq!(grid.selected().unwrap().value, "aa");
        assert_eq!(grid.move_selector(1, 0), (false, false));
        assert_eq!(grid.selected().unwrap().value, "bb");
        assert_eq!(grid.move_selector(1, 0), (false, false));
        assert_eq!(grid.move_selector(1, 0), (true, true));
        assert!(!grid.entered());
    }

    #[test]
    fn reverse_entry_starts_at_the_last_cell() {
        let mut grid = group(plain(&["aa", "bb", "cc"]));
        assert_eq!(grid.move_selector(-1, 0), (false, false));
        assert_eq!(grid.selected().unwrap().value, "cc");
        assert_eq!(grid.move_selector(-1, 0), (false, false));
        assert_eq!(grid.move_selector(-1, 0), (false, false));
        assert_eq!(grid.move_selector(-1, 0), (true, false));
    }

    #[test]
    fn isearch_filter_rebuilds_the_grid() {
        let mut grid = group(plain(&["make build", "make test", "cargo check"]));
        let regex = Regex::new("(?i)make").unwrap();
        grid.update_isearch(&regex);
        assert_eq!(grid.matches(), 2);
        assert!(grid.selected().is_some());
    }

    #[test]
    fn ansi_sequences_do_not_count_toward_width() {
        assert_eq!(display_width("\x1b[31mred\x1b[0m"), 3);
    }
}
