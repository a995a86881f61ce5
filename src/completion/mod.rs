mod base;
mod engine;
mod group;

pub use base::{Candidate, Completer, DefaultCompleter, Values};
pub(crate) use engine::{BufferView, CompletionEngine};
pub(crate) use group::strip_ansi;
