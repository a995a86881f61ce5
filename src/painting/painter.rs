use std::io::{BufWriter, Stderr, Write};

use crossterm::{
    cursor::{self, MoveTo, SetCursorStyle},
    style::Print,
    terminal::{self, Clear, ClearType, ScrollUp},
    QueueableCommand,
};
use unicode_width::UnicodeWidthChar;

use crate::completion::strip_ansi;
use crate::result::Result;

/// the type used by crossterm operations
pub(crate) type W = BufWriter<Stderr>;

/// Cursor glyph matching the active keymap: a bar for insert-style
/// dispatch, a block for command-style dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CursorShape {
    Line,
    Block,
}

/// Everything one refresh paints: the prompt segments, the styled input
/// line, the transient hint and the completion area.
pub(crate) struct PaintView<'a> {
    pub prompt: &'a str,
    pub prompt_right: &'a str,
    pub secondary: &'a str,
    /// Input line with ANSI styling (and the dim autosuggestion appended)
    pub line_styled: &'a str,
    /// Raw buffer text, for geometry
    pub line_plain: &'a str,
    /// Cursor offset in code points into `line_plain`
    pub cursor_pos: usize,
    pub cursor_shape: CursorShape,
    pub hint: &'a str,
    pub menu: &'a [String],
}

/// Redraw planner over the terminal.
///
/// Tracks where the prompt block starts and how many rows the last paint
/// used, so each refresh can move back to the start, clear below, and
/// repaint without double-printing or leaving stale glyphs.
pub(crate) struct Painter {
    stdout: W,
    prompt_start_row: u16,
    terminal_size: (u16, u16),
    last_required_lines: u16,
}

impl Painter {
    pub(crate) fn new() -> Self {
        Painter {
            stdout: BufWriter::new(std::io::stderr()),
            prompt_start_row: 0,
            terminal_size: (80, 24),
            last_required_lines: 0,
        }
    }

    pub(crate) fn screen_width(&self) -> u16 {
        self.terminal_size.0
    }

    pub(crate) fn screen_height(&self) -> u16 {
        self.terminal_size.1
    }

    fn remaining_lines(&self) -> u16 {
        self.screen_height().saturating_sub(self.prompt_start_row)
    }

    /// Sets the prompt origin position and screen size for a new read
    /// loop invocation.
    pub(crate) fn initialize_prompt_position(&mut self) -> Result<()> {
        self.terminal_size = terminal::size()?;
        let (column, row) = cursor::position()?;
        // Content left by the host stays intact; start on the next row.
        let new_row = if column > 0 { row + 1 } else { row };
        let new_row = if new_row == self.screen_height() {
            self.print_crlf()?;
            new_row.saturating_sub(1)
        } else {
            new_row
        };
        self.prompt_start_row = new_row;
        Ok(())
    }

    /// Terminal was resized mid-loop
    pub(crate) fn handle_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.prompt_start_row = self.prompt_start_row.min(height.saturating_sub(1));
    }

    fn print_crlf(&mut self) -> Result<()> {
        self.stdout.queue(Print("\r\n"))?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Rows and cursor cell of the prompt + input block, under wrapping.
    fn block_metrics(&self, view: &PaintView) -> (u16, (u16, u16)) {
        let width = self.screen_width().max(1) as usize;
        let mut row = 0usize;
        let mut col = 0usize;

        let mut put = |text: &str, row: &mut usize, col: &mut usize| {
            for c in text.chars() {
                if c == '\n' {
                    *row += 1;
                    *col = 0;
                    continue;
                }
                let w = c.width().unwrap_or(0);
                if *col + w > width {
                    *row += 1;
                    *col = 0;
                }
                *col += w;
            }
        };

        put(&strip_ansi(view.prompt), &mut row, &mut col);

        let secondary = strip_ansi(view.secondary);
        let mut cursor_cell = (row as u16, col as u16);
        for (i, c) in view.line_plain.chars().enumerate() {
            if i == view.cursor_pos {
                cursor_cell = (row as u16, col as u16);
            }
            if c == '\n' {
                row += 1;
                col = 0;
                put(&secondary, &mut row, &mut col);
                continue;
            }
            let w = c.width().unwrap_or(0);
            if col + w > width {
                row += 1;
                col = 0;
            }
            col += w;
        }
        if view.cursor_pos >= view.line_plain.chars().count() {
            cursor_cell = (row as u16, col as u16);
        }

        (row as u16 + 1, cursor_cell)
    }

    /// Repaint the prompt, input line, hint, completion area and right
    /// prompt, then park the cursor on its input position.
    pub(crate) fn repaint(&mut self, view: &PaintView) -> Result<()> {
        self.stdout.queue(cursor::Hide)?;

        let width = self.screen_width();
        let (block_rows, cursor_cell) = self.block_metrics(view);
        let hint_rows = if view.hint.is_empty() { 0 } else { 1 };
        let required = block_rows + hint_rows as u16 + view.menu.len() as u16;

        // Scroll so the whole paint area fits below the prompt origin.
        let remaining = self.remaining_lines();
        if required >= self.screen_height() {
            self.prompt_start_row = 0;
        } else if required > remaining {
            let extra = required - remaining;
            self.stdout.queue(ScrollUp(extra))?;
            self.prompt_start_row = self.prompt_start_row.saturating_sub(extra);
        }

        self.stdout
            .queue(MoveTo(0, self.prompt_start_row))?
            .queue(Clear(ClearType::FromCursorDown))?;

        // Prompt and input line; continuation rows carry the secondary
        // prompt.
        self.stdout
            .queue(Print(view.prompt.replace('\n', "\r\n")))?;
        let continued = format!("\r\n{}", view.secondary);
        self.stdout
            .queue(Print(view.line_styled.replace('\n', &continued)))?;

        if !view.hint.is_empty() {
            self.stdout.queue(Print("\r\n"))?;
            self.stdout.queue(Print(view.hint))?;
        }
        for line in view.menu {
            self.stdout.queue(Print("\r\n"))?;
            self.stdout.queue(Print(line))?;
        }

        // Right prompt, only when it fits next to the first input row.
        let right_width = str_width(&strip_ansi(view.prompt_right));
        let input_row = self.prompt_start_row + cursor_cell.0.min(block_rows - 1);
        if right_width > 0 {
            let first_row_end = cursor_cell.1 as usize;
            if first_row_end + right_width + 1 < width as usize {
                self.stdout
                    .queue(MoveTo(width - right_width as u16, input_row))?
                    .queue(Print(view.prompt_right))?;
            }
        }

        self.last_required_lines = required;

        let shape = match view.cursor_shape {
            CursorShape::Line => SetCursorStyle::BlinkingBar,
            CursorShape::Block => SetCursorStyle::SteadyBlock,
        };
        self.stdout
            .queue(MoveTo(
                cursor_cell.1,
                self.prompt_start_row + cursor_cell.0,
            ))?
            .queue(shape)?
            .queue(cursor::Show)?;
        self.stdout.flush()?;
        Ok(())
    }

    /// After a line was accepted: move below the painted block so host
    /// output continues underneath.
    pub(crate) fn finish_line(&mut self) -> Result<()> {
        let row = self
            .prompt_start_row
            .saturating_add(self.last_required_lines.max(1))
            .min(self.screen_height().saturating_sub(1));
        self.stdout.queue(MoveTo(0, row))?;
        self.stdout.queue(Clear(ClearType::FromCursorDown))?;
        self.print_crlf()
    }

    /// Replace the painted block with the transient prompt and the
    /// accepted line.
    pub(crate) fn repaint_transient(
        &mut self,
        transient: &str,
        tooltip: &str,
        line: &str,
    ) -> Result<()> {
        self.stdout
            .queue(MoveTo(0, self.prompt_start_row))?
            .queue(Clear(ClearType::FromCursorDown))?
            .queue(Print(transient))?
            .queue(Print(line.replace('\n', " ")))?;

        let used = str_width(&strip_ansi(transient)) + str_width(line);
        let tooltip_width = str_width(&strip_ansi(tooltip));
        if tooltip_width > 0 && used + tooltip_width + 1 < self.screen_width() as usize {
            self.stdout
                .queue(MoveTo(
                    self.screen_width() - tooltip_width as u16,
                    self.prompt_start_row,
                ))?
                .queue(Print(tooltip))?;
        }
        self.print_crlf()
    }

    /// Clear the screen and restart the block at the top
    pub(crate) fn clear_screen(&mut self) -> Result<()> {
        self.stdout
            .queue(Clear(ClearType::All))?
            .queue(MoveTo(0, 0))?;
        self.prompt_start_row = 0;
        self.stdout.flush()?;
        Ok(())
    }
}

fn str_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view<'a>(prompt: &'a str, line: &'a str, cursor_pos: usize) -> PaintView<'a> {
        PaintView {
            prompt,
            prompt_right: "",
            secondary: "> ",
            line_styled: line,
            line_plain: line,
            cursor_pos,
            cursor_shape: CursorShape::Line,
            hint: "",
            menu: &[],
        }
    }

    #[test]
    fn cursor_cell_accounts_for_the_prompt() {
        let painter = Painter::new();
        let (rows, cell) = painter.block_metrics(&view("$ ", "hello", 3));
        assert_eq!(rows, 1);
        assert_eq!(cell, (0, 5));
    }

    #[test]
    fn multiline_buffers_use_the_secondary_prompt_width() {
        let painter = Painter::new();
        let (rows, cell) = painter.block_metrics(&view("$ ", "one\ntwo", 5));
        assert_eq!(rows, 2);
        // "> " continuation plus one character of "two".
        assert_eq!(cell, (1, 3));
    }

    #[test]
    fn long_lines_wrap_at_terminal_width() {
        let painter = Painter::new(); // default 80 columns
        let long = "x".repeat(100);
        let (rows, cell) = painter.block_metrics(&view("", &long, 100));
        assert_eq!(rows, 2);
        assert_eq!(cell, (1, 20));
    }
}
