use std::collections::HashMap;

/// A completion candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// The text actually inserted in the line
    pub value: String,
    /// Text shown in the menu instead of the value, when non-empty
    pub display: String,
    /// Description shown next to the candidate; candidates sharing one are
    /// grouped on the same row ("aliased")
    pub description: String,
    /// Color/effect sequence applied when displaying the candidate
    pub style: String,
    /// Candidates with the same tag are grouped under one heading
    pub tag: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        Candidate {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// What the menu prints for this candidate
    pub(crate) fn display_str(&self) -> &str {
        if self.display.is_empty() {
            &self.value
        } else {
            &self.display
        }
    }
}

/// Everything a completer call produced, with per-tag display options.
/// The `"*"` pseudo-tag applies an option to every group.
#[derive(Debug, Clone, Default)]
pub struct Values {
    pub candidates: Vec<Candidate>,
    /// Keep the generation order instead of sorting
    pub no_sort: HashMap<String, bool>,
    /// Force one candidate per row instead of a packed grid
    pub list_long: HashMap<String, bool>,
    /// Candidate/description separator override
    pub list_sep: HashMap<String, String>,
    /// Keep escape sequences in inserted values
    pub escapes: HashMap<String, bool>,
    /// The part of the word being completed, replaced by the candidate
    pub prefix: String,
}

impl Values {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Values {
            candidates,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Apply "don't sort" to every group
    pub fn no_sort_all(mut self) -> Self {
        self.no_sort.insert("*".to_string(), true);
        self
    }

    /// Apply "list one per row" to every group
    pub fn list_long_all(mut self) -> Self {
        self.list_long.insert("*".to_string(), true);
        self
    }

    pub(crate) fn tag_flag(map: &HashMap<String, bool>, tag: &str) -> bool {
        map.get(tag).copied().unwrap_or_else(|| {
            map.get("*").copied().unwrap_or(false)
        })
    }
}

/// Candidate generation callback supplied by the host.
///
/// `line`/`pos` are the current input line and cursor so completers can
/// inspect the word being completed; the engine caches the returned values
/// while incremental search filters them.
pub trait Completer: Send {
    fn complete(&mut self, line: &str, pos: usize) -> Values;
}

/// A noop completer, used when the host did not supply one.
pub struct DefaultCompleter;

impl Completer for DefaultCompleter {
    fn complete(&mut self, _line: &str, _pos: usize) -> Values {
        Values::default()
    }
}

impl<F> Completer for F
where
    F: FnMut(&str, usize) -> Values + Send,
{
    fn complete(&mut self, line: &str, pos: usize) -> Values {
        self(line, pos)
    }
}
