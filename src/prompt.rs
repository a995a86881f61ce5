use std::borrow::Cow;

/// API to provide the prompt segments around the input line.
///
/// The primary prompt may span several lines; only its last line shares a
/// row with the input. The right-side segment is printed only when it fits
/// next to the input; the transient form replaces the primary prompt after
/// a line was accepted, when `prompt-transient` is set.
pub trait Prompt: Send {
    /// The prompt printed before the input line
    fn render_primary(&self) -> Cow<'_, str>;

    /// Continuation prompt for the following lines of a multiline buffer
    fn render_secondary(&self) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    /// Segment printed at the right edge of the first input row
    fn render_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    /// Short form replacing the primary prompt once the line is accepted
    fn render_transient(&self) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    /// Transient right-side segment (tooltip); cleared when it cannot fit
    fn render_tooltip(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// Simple two-part prompt used when the host does not provide one.
#[derive(Debug, Clone)]
pub struct DefaultPrompt {
    pub left: String,
    pub indicator: String,
}

impl Default for DefaultPrompt {
    fn default() -> Self {
        DefaultPrompt {
            left: String::new(),
            indicator: "> ".to_string(),
        }
    }
}

impl DefaultPrompt {
    pub fn new(left: impl Into<String>) -> Self {
        DefaultPrompt {
            left: left.into(),
            indicator: "> ".to_string(),
        }
    }
}

impl Prompt for DefaultPrompt {
    fn render_primary(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}{}", self.left, self.indicator))
    }

    fn render_transient(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.indicator)
    }
}
