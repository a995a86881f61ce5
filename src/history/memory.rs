use super::History;
use crate::result::{Result, TidelineError, TidelineErrorVariants};

/// In-memory history source; the default store bound to a fresh shell.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    lines: Vec<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated history, oldest line first
    pub fn with_lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        MemoryHistory {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl History for MemoryHistory {
    fn len(&self) -> usize {
        self.lines.len()
    }

    fn get_line(&self, pos: usize) -> Result<String> {
        self.lines.get(pos).cloned().ok_or_else(|| {
            TidelineError(TidelineErrorVariants::HistoryError(format!(
                "no history entry at index {pos}"
            )))
        })
    }

    fn write(&mut self, line: &str) -> Result<usize> {
        self.lines.push(line.to_string());
        Ok(self.lines.len() - 1)
    }

    fn dump(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_append_at_the_recent_end() {
        let mut history = MemoryHistory::new();
        assert_eq!(history.write("first").unwrap(), 0);
        assert_eq!(history.write("second").unwrap(), 1);
        assert_eq!(history.get_line(1).unwrap(), "second");
        assert!(history.get_line(7).is_err());
    }
}
