use nu_ansi_term::{Color, Style};

use crate::painting::StyledText;

/// The syntax highlighting trait. Implementers take the current line and
/// return a [`StyledText`] rendered by the painter on every refresh.
pub trait Highlighter: Send {
    /// The action that will handle the current buffer as a line of text
    fn highlight(&self, line: &str, cursor: usize) -> StyledText;
}

/// Passes the line through unstyled.
#[derive(Debug, Default)]
pub struct NoopHighlighter;

impl Highlighter for NoopHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        styled.push(Style::new(), line);
        styled
    }
}

/// Example highlighter coloring a configured word list, for demos and
/// tests: matched words green, the rest of the line neutral.
pub struct ExampleHighlighter {
    external_commands: Vec<String>,
}

impl ExampleHighlighter {
    pub fn new(external_commands: Vec<String>) -> ExampleHighlighter {
        ExampleHighlighter { external_commands }
    }
}

impl Highlighter for ExampleHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        for (i, token) in line.split_inclusive(' ').enumerate() {
            let word = token.trim_end();
            let known = self.external_commands.iter().any(|c| c == word);
            let style = if known {
                Style::new().fg(Color::Green)
            } else if i == 0 && !word.is_empty() {
                Style::new().fg(Color::Cyan)
            } else {
                Style::new()
            };
            styled.push(style, token);
        }
        styled
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn highlight_preserves_the_raw_text() {
        let highlighter = ExampleHighlighter::new(vec!["make".to_string()]);
        let styled = highlighter.highlight("make test now", 0);
        assert_eq!(styled.raw_string(), "make test now");
    }
}
