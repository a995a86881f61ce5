use std::fmt::{Display, Formatter};

/// Valid ways how [`crate::Shell::read_line()`] can return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Entry succeeded with the provided content
    Success(String),
    /// Entry was aborted with `Ctrl+C`
    CtrlC, // Interrupt current editing
    /// Abort with `Ctrl+D` signalling `EOF` or abort of a whole interactive session
    CtrlD, // End terminal session
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Signal::Success(line) => write!(f, "Success({line})"),
            Signal::CtrlC => write!(f, "CtrlC"),
            Signal::CtrlD => write!(f, "CtrlD"),
        }
    }
}

/// How an accepted line should be handed back by the history system.
///
/// `Enter` is the normal acceptance path. The other two deliver the
/// cancellation signals of the loop as ordinary accept events, so the
/// engine terminates without a separate control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcceptKind {
    Enter,
    Interrupt,
    EndOfFile,
}
