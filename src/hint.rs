/// Transient one-line status shown under the input line.
///
/// A set text lives until the next refresh resets it; a persisted text
/// (pending numeric argument, active register, macro recording) survives
/// refreshes until explicitly dropped.
#[derive(Debug, Default)]
pub(crate) struct Hint {
    text: String,
    persisted: String,
}

impl Hint {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the transient text
    pub(crate) fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Set a text surviving refreshes
    pub(crate) fn persist(&mut self, text: impl Into<String>) {
        self.persisted = text.into();
    }

    /// What the display should print: the transient text wins
    pub(crate) fn current(&self) -> &str {
        if self.text.is_empty() {
            &self.persisted
        } else {
            &self.text
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty() && self.persisted.is_empty()
    }

    /// Drop the transient text
    pub(crate) fn reset(&mut self) {
        self.text.clear();
    }

    /// Drop the persisted text
    pub(crate) fn reset_persist(&mut self) {
        self.persisted.clear();
    }
}
