mod completion;
mod editing;
mod history;
mod vi;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use crate::engine::Shell;

/// Every named operation the keymaps can bind.
///
/// The kebab-case serialization of each variant is its binding-file name:
/// `Command::ViAppendMode` is `"vi-append-mode"`. Loading an inputrc line
/// therefore needs no hand-written name table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    //
    // Standard editing
    //
    /// Insert the key that invoked the command
    SelfInsert,
    /// Read the next key and insert it literally
    QuotedInsert,
    /// Insert a tab character
    TabInsert,
    /// Start or extend the numeric argument
    DigitArgument,
    /// Move to the start of the current line
    BeginningOfLine,
    /// Move to the end of the current line
    EndOfLine,
    /// Move one character right; at end of line, accept the autosuggestion
    ForwardChar,
    /// Move one character left
    BackwardChar,
    /// Move to the end of the next word
    ForwardWord,
    /// Move to the start of the previous word
    BackwardWord,
    /// Clear the screen, keeping the current input line
    ClearScreen,
    /// Repaint the current line
    RedrawCurrentLine,
    /// Delete the character under the cursor
    DeleteChar,
    /// Delete the character left of the cursor
    BackwardDeleteChar,
    /// Delete the character under the cursor, or list completions at end of line
    DeleteCharOrList,
    /// Exchange the character under the cursor with the previous one
    TransposeChars,
    /// Exchange the word under the cursor with the previous one
    TransposeWords,
    /// Lowercase the current word and move past it
    DownCaseWord,
    /// Uppercase the current word and move past it
    UpCaseWord,
    /// Capitalize the current word and move past it
    CapitalizeWord,
    /// Kill from the cursor to the end of the line
    KillLine,
    /// Kill backward to the beginning of the line
    BackwardKillLine,
    /// Kill the entire current line
    KillWholeLine,
    /// Kill to the end of the current word
    KillWord,
    /// Kill backward to the start of the current word
    BackwardKillWord,
    /// Kill the blank-word behind the cursor
    UnixWordRubout,
    /// Kill backward from the cursor to the beginning of the line
    UnixLineDiscard,
    /// Paste the most recent kill
    Yank,
    /// Rotate the kill ring and paste the new head
    YankPop,
    /// Set the mark at the cursor
    SetMark,
    /// Swap the cursor with the mark
    ExchangePointAndMark,
    /// Read a key and move to its next occurrence
    CharacterSearch,
    /// Read a key and move to its previous occurrence
    CharacterSearchBackward,
    /// Insert the comment prefix at the start of the line and accept it
    InsertComment,
    /// Undo all changes made to this line
    RevertLine,
    /// Incrementally undo the last text modification
    Undo,
    /// Abort the current pending operation (and incremental search)
    Abort,
    /// Signal end-of-file when the line is empty
    EndOfFile,
    /// Interrupt the current input (Ctrl-C style)
    Interrupt,
    /// Switch to the emacs keymap
    EmacsEditingMode,

    //
    // History
    //
    /// Accept the input line
    AcceptLine,
    /// Move to the next event in the history list
    NextHistory,
    /// Move to the previous event in the history list
    PreviousHistory,
    /// Move to the first event in the history list
    BeginningOfHistory,
    /// Move to the last event in the history list
    EndOfHistory,
    /// Accept the line and fetch the next history event for the next cycle
    OperateAndGetNext,
    /// Fetch the history entry given by the numeric argument
    FetchHistory,
    /// Incremental search forward through history
    ForwardSearchHistory,
    /// Incremental search backward through history
    ReverseSearchHistory,
    /// Non-incremental forward search, query read in a minibuffer
    NonIncrementalForwardSearchHistory,
    /// Non-incremental backward search, query read in a minibuffer
    NonIncrementalReverseSearchHistory,
    /// Search forward for history lines starting with the current line
    HistorySearchForward,
    /// Search backward for history lines starting with the current line
    HistorySearchBackward,
    /// Search forward for history lines containing the current line
    HistorySubstringSearchForward,
    /// Search backward for history lines containing the current line
    HistorySubstringSearchBackward,
    /// Insert the last argument of the previous history line
    YankLastArg,
    /// Insert the nth argument of the previous history line
    YankNthArg,
    /// History-expand the word before the cursor and insert a space
    MagicSpace,
    /// Accept the line and keep it in the buffer for the next cycle
    AcceptAndHold,
    /// Accept the line and infer the following history line next cycle
    AcceptAndInferNextHistory,
    /// Move down a buffer line, or to the next history event
    DownLineOrHistory,
    /// Move up a buffer line, or to the previous history event
    UpLineOrHistory,
    /// Move up a buffer line, or prefix-search backward
    UpLineOrSearch,
    /// Move down a buffer line, or prefix-search forward
    DownLineOrSearch,
    /// Fetch the history line following the first match of the buffer
    InferNextHistory,
    /// Go to the start of the buffer, or to the first history event
    BeginningOfBufferOrHistory,
    /// Go to the end of the buffer, or to the last history event
    EndOfBufferOrHistory,
    /// Go to the line start, or one buffer line up, or one history event up
    BeginningOfLineHist,
    /// Go to the line end, or one buffer line down, or one history event down
    EndOfLineHist,
    /// Incremental autocompletion over history, forward
    IncrementalForwardSearchHistory,
    /// Incremental autocompletion over history, backward
    IncrementalReverseSearchHistory,
    /// Make the current autosuggestion the buffer
    AutosuggestAccept,
    /// Make the current autosuggestion the buffer and accept it
    AutosuggestExecute,
    /// Enable history autosuggestions
    AutosuggestEnable,
    /// Disable history autosuggestions
    AutosuggestDisable,
    /// Toggle history autosuggestions
    AutosuggestToggle,

    //
    // Completion
    //
    /// Complete the word at the cursor
    Complete,
    /// Complete, cycling forward through the candidates
    MenuComplete,
    /// Complete, cycling backward through the candidates
    ReverseMenuComplete,
    /// List the possible completions without inserting
    PossibleCompletions,
    /// Complete from the cut/yank registers
    ViRegistersComplete,

    //
    // Keyboard macros
    //
    /// Begin saving typed keys into a macro
    StartKbdMacro,
    /// Stop saving typed keys
    EndKbdMacro,
    /// Replay the last recorded macro
    CallLastKbdMacro,
    /// Show the last recorded macro on the hint line
    PrintLastKbdMacro,

    //
    // Vi modes
    //
    /// Enter insert mode after the current character
    ViAppendMode,
    /// Enter insert mode at the end of the line
    ViAppendEol,
    /// Enter insert mode
    ViInsertionMode,
    /// Enter insert mode at the beginning of the line
    ViInsertBeg,
    /// Enter command mode
    ViMovementMode,
    /// Enter visual character selection
    ViVisualMode,
    /// Enter visual line selection
    ViVisualLineMode,
    /// Switch to the vi keymap (insert mode)
    ViEditingMode,

    //
    // Vi movement
    //
    /// Move back one character, staying on the line
    ViBackwardChar,
    /// Move forward one character, staying on the line
    ViForwardChar,
    /// Move to the previous word start
    ViPrevWord,
    /// Move to the next word start
    ViNextWord,
    /// Move to the previous word start
    ViBackwardWord,
    /// Move to the next word start
    ViForwardWord,
    /// Move to the previous blank-word start
    ViBackwardBigword,
    /// Move to the next blank-word start
    ViForwardBigword,
    /// Move to the current or next word end
    ViEndWord,
    /// Move to the current or next blank-word end
    ViEndBigword,
    /// Move to the previous word end
    ViBackwardEndWord,
    /// Move to the previous blank-word end
    ViBackwardEndBigword,
    /// Move to the matching bracket
    ViMatch,
    /// Move to the column given by the numeric argument
    ViColumn,
    /// Move to the end of the line (append semantics, for `d$`/`y$`)
    ViEndOfLine,
    /// Move to the first non-blank character of the line
    ViBackToIndent,
    /// Move to the first non-blank character of the line
    ViFirstPrint,
    /// Move to the mark, or to the inactive end of the selection
    ViGotoMark,

    //
    // Vi text changes
    //
    /// Change over a motion; doubled, change the whole line
    ViChangeTo,
    /// Delete over a motion; doubled, delete the whole line
    ViDeleteTo,
    /// Delete the character under the cursor
    ViDelete,
    /// Read a key and replace the character (or selection) with it
    ViChangeChar,
    /// Enter overwrite mode until escape
    ViReplace,
    /// Enter overwrite mode until escape
    ViOverstrike,
    /// Toggle the case under the cursor, or of the selection
    ViChangeCase,
    /// Delete the next characters (or selection) and enter insert mode
    ViSubst,
    /// Change from the cursor to the end of the line
    ViChangeEol,
    /// Read a key and surround the selection with it
    ViAddSurround,
    /// Read a surround key, then a replacement for the matched pair
    ViChangeSurround,
    /// Open a line above the cursor and enter insert mode
    ViOpenLineAbove,
    /// Open a line below the cursor and enter insert mode
    ViOpenLineBelow,
    /// Lowercase over a motion or selection
    ViDownCase,
    /// Uppercase over a motion or selection
    ViUpCase,

    //
    // Vi kill & yank
    //
    /// Kill from the cursor to the end of the line
    ViKillEol,
    /// Kill the blank-word behind the cursor
    ViUnixWordRubout,
    /// Delete characters backward
    ViRubout,
    /// Yank over a motion; doubled, yank the whole line
    ViYankTo,
    /// Rotate the kill ring after a paste
    ViYankPop,
    /// Insert the last argument of the previous history line
    ViYankArg,
    /// Kill from the cursor back to where insert mode was entered
    ViKillLine,
    /// Paste, before or after depending on the invoking key
    ViPut,
    /// Paste the active register after the cursor
    ViPutAfter,
    /// Paste the active register before the cursor
    ViPutBefore,
    /// Read a key and select the register for the next operation
    ViSetBuffer,
    /// Yank the whole current line
    ViYankWholeLine,

    //
    // Vi selections
    //
    /// Select a blank-word with its trailing blanks
    SelectABlankWord,
    /// Select a shell word with its quotes
    SelectAShellWord,
    /// Select a word with its trailing blanks
    SelectAWord,
    /// Select the inner blank-word
    SelectInBlankWord,
    /// Select the inner shell word
    SelectInShellWord,
    /// Select the inner word
    SelectInWord,
    /// Read a surround key and select the region inside/around it
    ViSelectSurround,

    //
    // Vi miscellaneous
    //
    /// Signal end-of-file if the line is empty
    ViEofMaybe,
    /// Start a `/` or `?` history search
    ViSearch,
    /// Repeat the last `/` or `?` search
    ViSearchAgain,
    /// Start or extend the numeric argument
    ViArgDigit,
    /// `f`/`F`/`t`/`T` character search, chosen by the invoking key
    ViCharSearch,
    /// Set the mark at the cursor
    ViSetMark,
    /// Undo the last text modification
    ViUndo,
    /// Redo an undone modification, or enter insert mode
    ViRedo,
    /// Read a key and move to its next occurrence
    ViFindNextChar,
    /// Read a key and move just before its next occurrence
    ViFindNextCharSkip,
    /// Read a key and move to its previous occurrence
    ViFindPrevChar,
    /// Read a key and move just after its previous occurrence
    ViFindPrevCharSkip,
    /// Non-incremental forward regexp search
    ViSearchForward,
    /// Non-incremental backward regexp search
    ViSearchBackward,
    /// Repeat the last search forward
    ViSearchAgainForward,
    /// Repeat the last search backward
    ViSearchAgainBackward,
}

impl Command {
    /// Resolve a binding-file command name
    pub fn from_name(name: &str) -> Option<Command> {
        Command::from_str(name).ok()
    }

    /// Commands that navigate an open completion menu instead of moving
    /// past it
    pub(crate) fn is_completion_nav(&self) -> bool {
        matches!(
            self,
            Command::Complete
                | Command::MenuComplete
                | Command::ReverseMenuComplete
                | Command::PossibleCompletions
                | Command::ViRegistersComplete
                | Command::DeleteCharOrList
                | Command::ForwardSearchHistory
                | Command::ReverseSearchHistory
                | Command::IncrementalForwardSearchHistory
                | Command::IncrementalReverseSearchHistory
        )
    }
}

impl Shell {
    /// Run one dispatched command. Grouped the way the classic readline
    /// tables group them; each arm delegates to the implementation in the
    /// matching commands submodule.
    pub(crate) fn run_command(&mut self, command: Command) {
        use Command::*;

        match command {
            // Standard editing
            SelfInsert => self.self_insert(),
            QuotedInsert => self.quoted_insert(),
            TabInsert => self.tab_insert(),
            DigitArgument | ViArgDigit => self.digit_argument(),
            BeginningOfLine => self.beginning_of_line(),
            EndOfLine => self.end_of_line(),
            ForwardChar => self.forward_char(),
            BackwardChar => self.backward_char(),
            ForwardWord => self.forward_word(),
            BackwardWord => self.backward_word(),
            ClearScreen => self.clear_screen(),
            RedrawCurrentLine => self.redraw_current_line(),
            DeleteChar => self.delete_char(),
            BackwardDeleteChar => self.backward_delete_char(),
            DeleteCharOrList => self.delete_char_or_list(),
            TransposeChars => self.transpose_chars(),
            TransposeWords => self.transpose_words(),
            DownCaseWord => self.down_case_word(),
            UpCaseWord => self.up_case_word(),
            CapitalizeWord => self.capitalize_word(),
            KillLine => self.kill_line(),
            BackwardKillLine | UnixLineDiscard => self.backward_kill_line(),
            KillWholeLine => self.kill_whole_line(),
            KillWord => self.kill_word(),
            BackwardKillWord => self.backward_kill_word(),
            UnixWordRubout | ViUnixWordRubout => self.unix_word_rubout(),
            Yank => self.yank(),
            YankPop | ViYankPop => self.yank_pop(),
            SetMark | ViSetMark => self.set_mark(),
            ExchangePointAndMark => self.exchange_point_and_mark(),
            CharacterSearch => self.character_search(true),
            CharacterSearchBackward => self.character_search(false),
            InsertComment => self.insert_comment(),
            RevertLine => self.revert_line(),
            Undo | ViUndo => self.undo_last(),
            Abort => self.abort(),
            EndOfFile | ViEofMaybe => self.end_of_file(),
            Interrupt => self.interrupt(),
            EmacsEditingMode => self.emacs_editing_mode(),

            // History
            AcceptLine => self.accept_line(),
            NextHistory => self.down_history(),
            PreviousHistory => self.up_history(),
            BeginningOfHistory => self.beginning_of_history(),
            EndOfHistory => self.end_of_history(),
            OperateAndGetNext | AcceptAndInferNextHistory => self.accept_and_infer_next_history(),
            FetchHistory => self.fetch_history(),
            ForwardSearchHistory => self.forward_search_history(),
            ReverseSearchHistory => self.reverse_search_history(),
            NonIncrementalForwardSearchHistory => self.non_incremental_search_history(true),
            NonIncrementalReverseSearchHistory => self.non_incremental_search_history(false),
            HistorySearchForward => self.history_search_forward(),
            HistorySearchBackward => self.history_search_backward(),
            HistorySubstringSearchForward => self.history_substring_search(true),
            HistorySubstringSearchBackward => self.history_substring_search(false),
            YankLastArg | ViYankArg => self.yank_last_arg(),
            YankNthArg => self.yank_nth_arg(),
            MagicSpace => self.magic_space(),
            AcceptAndHold => self.accept_and_hold(),
            DownLineOrHistory => self.down_line_or_history(),
            UpLineOrHistory => self.up_line_or_history(),
            UpLineOrSearch => self.up_line_or_search(),
            DownLineOrSearch => self.down_line_or_search(),
            InferNextHistory => self.infer_next_history(),
            BeginningOfBufferOrHistory => self.beginning_of_buffer_or_history(),
            EndOfBufferOrHistory => self.end_of_buffer_or_history(),
            BeginningOfLineHist => self.beginning_of_line_hist(),
            EndOfLineHist => self.end_of_line_hist(),
            IncrementalForwardSearchHistory => self.incremental_search_history(true),
            IncrementalReverseSearchHistory => self.incremental_search_history(false),
            AutosuggestAccept => self.autosuggest_accept(),
            AutosuggestExecute => self.autosuggest_execute(),
            AutosuggestEnable => self.autosuggest_enable(),
            AutosuggestDisable => self.autosuggest_disable(),
            AutosuggestToggle => self.autosuggest_toggle(),

            // Completion
            Complete => self.complete_word(),
            MenuComplete => self.menu_complete(),
            ReverseMenuComplete => self.reverse_menu_complete(),
            PossibleCompletions => self.possible_completions(),
            ViRegistersComplete => self.registers_complete(),

            // Keyboard macros
            StartKbdMacro => self.start_kbd_macro(),
            EndKbdMacro => self.end_kbd_macro(),
            CallLastKbdMacro => self.call_last_kbd_macro(),
            PrintLastKbdMacro => self.print_last_kbd_macro(),

            // Vi modes
            ViAppendMode => self.vi_add_next(),
            ViAppendEol => self.vi_add_eol(),
            ViInsertionMode | ViEditingMode => self.vi_insert_mode(),
            ViInsertBeg => self.vi_insert_bol(),
            ViMovementMode => self.vi_command_mode(),
            ViVisualMode => self.vi_visual_mode(),
            ViVisualLineMode => self.vi_visual_line_mode(),

            // Vi movement
            ViBackwardChar => self.vi_backward_char(),
            ViForwardChar => self.vi_forward_char(),
            ViPrevWord | ViBackwardWord => self.vi_backward_word(),
            ViNextWord | ViForwardWord => self.vi_forward_word(),
            ViBackwardBigword => self.vi_backward_blank_word(),
            ViForwardBigword => self.vi_forward_blank_word(),
            ViEndWord => self.vi_forward_word_end(),
            ViEndBigword => self.vi_forward_blank_word_end(),
            ViBackwardEndWord => self.vi_backward_word_end(),
            ViBackwardEndBigword => self.vi_backward_blank_word_end(),
            ViMatch => self.vi_match_bracket(),
            ViColumn => self.vi_goto_column(),
            ViEndOfLine => self.vi_end_of_line(),
            ViBackToIndent | ViFirstPrint => self.vi_first_print(),
            ViGotoMark => self.vi_goto_mark(),

            // Vi text changes
            ViChangeTo => self.vi_change_to(),
            ViDeleteTo => self.vi_delete_to(),
            ViDelete => self.vi_delete_char(),
            ViChangeChar => self.vi_change_char(),
            ViReplace | ViOverstrike => self.vi_replace(),
            ViChangeCase => self.vi_change_case(),
            ViSubst => self.vi_substitute(),
            ViChangeEol => self.vi_change_eol(),
            ViAddSurround => self.vi_add_surround(),
            ViChangeSurround => self.vi_change_surround(),
            ViOpenLineAbove => self.vi_open_line_above(),
            ViOpenLineBelow => self.vi_open_line_below(),
            ViDownCase => self.vi_down_case(),
            ViUpCase => self.vi_up_case(),

            // Vi kill & yank
            ViKillEol => self.vi_kill_eol(),
            ViRubout => self.vi_rubout(),
            ViYankTo => self.vi_yank_to(),
            ViKillLine => self.vi_kill_line(),
            ViPut => self.vi_put(),
            ViPutAfter => self.vi_put_after(),
            ViPutBefore => self.vi_put_before(),
            ViSetBuffer => self.vi_set_buffer(),
            ViYankWholeLine => self.vi_yank_whole_line(),

            // Vi selections
            SelectABlankWord => self.vi_select_a_blank_word(),
            SelectAShellWord => self.vi_select_a_shell_word(),
            SelectAWord => self.vi_select_a_word(),
            SelectInBlankWord => self.vi_select_in_blank_word(),
            SelectInShellWord => self.vi_select_in_shell_word(),
            SelectInWord => self.vi_select_in_word(),
            ViSelectSurround => self.vi_select_surround(),

            // Vi miscellaneous
            ViSearch => self.vi_search(),
            ViSearchAgain => self.vi_search_again(),
            ViCharSearch => self.vi_char_search(),
            ViRedo => self.vi_redo(),
            ViFindNextChar => self.vi_find_char(true, false),
            ViFindNextCharSkip => self.vi_find_char(true, true),
            ViFindPrevChar => self.vi_find_char(false, false),
            ViFindPrevCharSkip => self.vi_find_char(false, true),
            ViSearchForward => self.vi_search_start(true),
            ViSearchBackward => self.vi_search_start(false),
            ViSearchAgainForward => self.vi_search_repeat(true),
            ViSearchAgainBackward => self.vi_search_repeat(false),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case("self-insert", Command::SelfInsert)]
    #[case("vi-append-mode", Command::ViAppendMode)]
    #[case("beginning-of-line-hist", Command::BeginningOfLineHist)]
    #[case("non-incremental-reverse-search-history", Command::NonIncrementalReverseSearchHistory)]
    #[case("select-a-blank-word", Command::SelectABlankWord)]
    fn names_resolve(#[case] name: &str, #[case] expected: Command) {
        assert_eq!(Command::from_name(name), Some(expected));
        assert_eq!(expected.to_string(), name);
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Command::from_name("frobnicate-line"), None);
    }

    #[test]
    fn the_command_surface_is_large_enough_for_the_default_tables() {
        assert!(Command::iter().count() > 100);
    }
}
