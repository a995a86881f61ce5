use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use super::History;
use crate::result::{Result, TidelineError, TidelineErrorVariants};

/// Newlines inside an entry are escaped so one entry stays one file line.
pub const NEWLINE_ESCAPE: &str = "<\\n>";

/// History source reading from and appending to a newline separated file.
///
/// The file is locked around every read or append, so several shells can
/// share one history file without tearing each other's lines.
#[derive(Debug, Default)]
pub struct FileBackedHistory {
    lines: Vec<String>,
    file: Option<PathBuf>,
}

fn encode_entry(line: &str) -> String {
    line.replace('\n', NEWLINE_ESCAPE)
}

fn decode_entry(line: &str) -> String {
    line.replace(NEWLINE_ESCAPE, "\n")
}

impl FileBackedHistory {
    /// An unbacked instance; behaves like an in-memory source
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or start) the history stored at `file`
    pub fn with_file(file: PathBuf) -> Result<Self> {
        let mut history = FileBackedHistory {
            lines: Vec::new(),
            file: Some(file),
        };
        history.reload()?;
        Ok(history)
    }

    fn reload(&mut self) -> Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let file = OpenOptions::new().read(true).open(path)?;
        let mut lock = fd_lock::RwLock::new(file);
        let guard = lock.read().map_err(TidelineError::from)?;

        self.lines = BufReader::new(&*guard)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()?
            .iter()
            .map(|entry| decode_entry(entry))
            .collect();
        Ok(())
    }

    fn append_to_file(&self, line: &str) -> Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(base_dir) = path.parent() {
            std::fs::create_dir_all(base_dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut lock = fd_lock::RwLock::new(file);
        let mut guard = lock.write().map_err(TidelineError::from)?;
        writeln!(guard, "{}", encode_entry(line))?;
        Ok(())
    }
}

impl History for FileBackedHistory {
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
        self.append_to_file(line)?;
        self.lines.push(line.to_string());
        Ok(self.lines.len() - 1)
    }

    fn dump(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn writes_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = FileBackedHistory::with_file(path.clone()).unwrap();
        history.write("echo one").unwrap();
        history.write("multi\nline").unwrap();

        let reloaded = FileBackedHistory::with_file(path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get_line(0).unwrap(), "echo one");
        assert_eq!(reloaded.get_line(1).unwrap(), "multi\nline");
    }

    #[test]
    fn unbacked_instance_stays_in_memory() {
        let mut history = FileBackedHistory::new();
        history.write("hello").unwrap();
        assert_eq!(history.dump(), vec!["hello".to_string()]);
    }
}
