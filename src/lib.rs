//! # tideline: an inputrc-driven line editor
//!
//! Tideline reads a line of user input from a character-mode terminal with
//! the editing conveniences of a modern shell: cursor movement, undo/redo,
//! multiline editing, history with incremental and non-incremental search,
//! autosuggestions, grouped tab completion, and both an emacs-style and a
//! modal vi-style key dispatch.
//!
//! Minimal example:
//!
//! ```no_run
//! use tideline::{DefaultPrompt, Shell, Signal};
//!
//! let mut shell = Shell::new();
//! let prompt = DefaultPrompt::default();
//!
//! loop {
//!     match shell.read_line(&prompt) {
//!         Ok(Signal::Success(line)) => println!("We processed: {line}"),
//!         Ok(Signal::CtrlC) => continue,
//!         Ok(Signal::CtrlD) => break,
//!         Err(err) => {
//!             eprintln!("readline error: {err}");
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Editing modes
//!
//! The default dispatch is emacs-style; [`EditMode::Vi`] switches to a
//! modal editor with insert, command, visual and operator-pending keymaps:
//!
//! ```no_run
//! use tideline::{EditMode, Shell};
//!
//! let shell = Shell::new().with_edit_mode(EditMode::Vi);
//! ```
//!
//! ## History
//!
//! Any number of named history sources can be bound; walking, searching,
//! autosuggesting and the completion menu work over the active one:
//!
//! ```no_run
//! use std::path::Path;
//! use tideline::Shell;
//!
//! let shell = Shell::new()
//!     .with_history_file("local", Path::new(".app_history"))
//!     .expect("history file accessible");
//! ```
//!
//! ## Key bindings
//!
//! Bindings and options load from inputrc-style text, with `set`
//! directives and `$if mode=`/`$else`/`$endif` conditionals:
//!
//! ```no_run
//! use tideline::Shell;
//!
//! let mut shell = Shell::new();
//! shell
//!     .load_inputrc_str("set history-autosuggest on\n\"\\C-t\": transpose-words\n")
//!     .expect("valid inputrc");
//! ```

mod commands;
mod completion;
mod core_editor;
mod edit_mode;
mod engine;
mod enums;
mod highlighter;
mod hint;
mod history;
mod inputrc;
mod keys;
mod macros;
mod painting;
mod prompt;
mod result;

pub use commands::Command;
pub use completion::{Candidate, Completer, DefaultCompleter, Values};
pub use core_editor::{Cursor, Editor, LineBuffer, Selection, SelectionKind};
pub use edit_mode::{
    default_emacs_keybindings, default_vi_command_keybindings, default_vi_insert_keybindings,
    Bind, EditMode, Keybindings, MainKeymap,
};
pub use engine::Shell;
pub use enums::Signal;
pub use highlighter::{ExampleHighlighter, Highlighter, NoopHighlighter};
pub use history::{FileBackedHistory, History, MemoryHistory};
pub use inputrc::{unescape, Config, Value};
pub use painting::StyledText;
pub use prompt::{DefaultPrompt, Prompt};
pub use result::{Result, TidelineError, TidelineErrorVariants};
