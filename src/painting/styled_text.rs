use nu_ansi_term::Style;

/// A string-like object that contains a series of buffers with styles
#[derive(Debug, Clone, Default)]
pub struct StyledText {
    buffer: Vec<(Style, String)>,
}

impl StyledText {
    /// Construct a new `StyledText`
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new styled string to the buffer
    pub fn push(&mut self, style: Style, text: impl Into<String>) {
        self.buffer.push((style, text.into()));
    }

    /// Render to a string with the ANSI styles applied
    pub fn render(&self) -> String {
        self.buffer
            .iter()
            .map(|(style, text)| style.paint(text).to_string())
            .collect()
    }

    /// The unstyled text
    pub fn raw_string(&self) -> String {
        self.buffer.iter().map(|(_, text)| text.as_str()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_string_drops_styles() {
        let mut text = StyledText::new();
        text.push(Style::new().bold(), "ab");
        text.push(Style::new(), "cd");
        assert_eq!(text.raw_string(), "abcd");
    }
}
