use super::Keybindings;
use crate::commands::Command;

/// Returns the default keymap for vi insert mode
pub fn default_vi_insert_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    kb.bind(r"\e", ViMovementMode);
    kb.bind("\r", AcceptLine);
    kb.bind("\n", AcceptLine);
    kb.bind("\t", Complete);
    kb.bind(r"\C-?", BackwardDeleteChar);
    kb.bind(r"\C-c", Interrupt);
    kb.bind(r"\C-d", ViEofMaybe);
    kb.bind(r"\C-g", Abort);
    kb.bind(r"\C-h", BackwardDeleteChar);
    kb.bind(r"\C-l", ClearScreen);
    kb.bind(r"\C-n", NextHistory);
    kb.bind(r"\C-p", PreviousHistory);
    kb.bind(r"\C-r", ReverseSearchHistory);
    kb.bind(r"\C-s", ForwardSearchHistory);
    kb.bind(r"\C-t", TransposeChars);
    kb.bind(r"\C-u", UnixLineDiscard);
    kb.bind(r"\C-v", QuotedInsert);
    kb.bind(r"\C-w", ViUnixWordRubout);
    kb.bind(r"\C-y", Yank);
    kb.bind(r"\e[A", UpLineOrHistory);
    kb.bind(r"\e[B", DownLineOrHistory);
    kb.bind(r"\e[C", ForwardChar);
    kb.bind(r"\e[D", BackwardChar);
    kb.bind(r"\e[H", BeginningOfLine);
    kb.bind(r"\e[F", EndOfLine);
    kb.bind(r"\e[3~", DeleteChar);

    kb
}

/// Returns the default keymap for vi command mode.
///
/// Doubled operators (`dd`, `cc`, `yy`) are not sequences in this table:
/// the operator enters pending state and running it again acts on the
/// whole line.
pub fn default_vi_command_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    // Modes
    kb.bind("i", ViInsertionMode);
    kb.bind("I", ViInsertBeg);
    kb.bind("a", ViAppendMode);
    kb.bind("A", ViAppendEol);
    kb.bind("v", ViVisualMode);
    kb.bind("V", ViVisualLineMode);
    kb.bind("R", ViReplace);
    kb.bind("r", ViChangeChar);

    // Movement
    kb.bind("h", ViBackwardChar);
    kb.bind("l", ViForwardChar);
    kb.bind(" ", ViForwardChar);
    kb.bind("k", UpLineOrHistory);
    kb.bind("j", DownLineOrHistory);
    kb.bind("w", ViNextWord);
    kb.bind("W", ViForwardBigword);
    kb.bind("b", ViPrevWord);
    kb.bind("B", ViBackwardBigword);
    kb.bind("e", ViEndWord);
    kb.bind("E", ViEndBigword);
    kb.bind("ge", ViBackwardEndWord);
    kb.bind("gE", ViBackwardEndBigword);
    kb.bind("0", BeginningOfLine);
    kb.bind("$", ViEndOfLine);
    kb.bind("^", ViFirstPrint);
    kb.bind("%", ViMatch);
    kb.bind("|", ViColumn);
    kb.bind("`", ViGotoMark);
    kb.bind("f", ViCharSearch);
    kb.bind("F", ViCharSearch);
    kb.bind("t", ViCharSearch);
    kb.bind("T", ViCharSearch);

    // Operators and changes
    kb.bind("c", ViChangeTo);
    kb.bind("C", ViChangeTo);
    kb.bind("d", ViDeleteTo);
    kb.bind("D", ViDeleteTo);
    kb.bind("y", ViYankTo);
    kb.bind("Y", ViYankTo);
    kb.bind("gu", ViDownCase);
    kb.bind("gU", ViUpCase);
    kb.bind("x", ViDelete);
    kb.bind("X", ViRubout);
    kb.bind("s", ViSubst);
    kb.bind("~", ViChangeCase);
    kb.bind("o", ViOpenLineBelow);
    kb.bind("O", ViOpenLineAbove);

    // Kill and yank
    kb.bind("p", ViPut);
    kb.bind("P", ViPut);
    kb.bind("\"", ViSetBuffer);
    kb.bind(r"\C-w", ViUnixWordRubout);

    // Undo and history
    kb.bind("u", ViUndo);
    kb.bind(r"\C-r", ViRedo);
    kb.bind("U", RevertLine);
    kb.bind("m", ViSetMark);
    kb.bind("G", FetchHistory);
    kb.bind("+", NextHistory);
    kb.bind("-", PreviousHistory);
    for digit in '1'..='9' {
        kb.bind(&digit.to_string(), ViArgDigit);
    }

    // Search
    kb.bind("/", ViSearch);
    kb.bind("?", ViSearch);
    kb.bind("n", ViSearchAgain);
    kb.bind("N", ViSearchAgain);
    kb.bind("#", InsertComment);
    kb.bind("=", PossibleCompletions);

    // Specials
    kb.bind("\r", AcceptLine);
    kb.bind("\n", AcceptLine);
    kb.bind(r"\e", Abort);
    kb.bind(r"\C-c", Interrupt);
    kb.bind(r"\C-d", ViEofMaybe);
    kb.bind(r"\C-l", ClearScreen);
    kb.bind(r"\e[A", UpLineOrHistory);
    kb.bind(r"\e[B", DownLineOrHistory);
    kb.bind(r"\e[C", ViForwardChar);
    kb.bind(r"\e[D", ViBackwardChar);

    kb
}

/// Text-object bindings shared by the visual and operator-pending keymaps
fn bind_text_objects(kb: &mut Keybindings) {
    use Command::*;

    kb.bind("iw", SelectInWord);
    kb.bind("aw", SelectAWord);
    kb.bind("iW", SelectInBlankWord);
    kb.bind("aW", SelectABlankWord);
    for surround in ['"', '\'', '`', '(', ')', '[', ']', '{', '}'] {
        kb.bind(&format!("i{surround}"), ViSelectSurround);
        kb.bind(&format!("a{surround}"), ViSelectSurround);
    }
}

/// Returns the local keymap layered while a visual selection is active
pub fn default_vi_visual_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    kb.bind(r"\e", ViMovementMode);
    kb.bind("v", ViVisualMode);
    kb.bind("V", ViVisualLineMode);
    kb.bind("d", ViDeleteTo);
    kb.bind("x", ViDeleteTo);
    kb.bind("c", ViChangeTo);
    kb.bind("s", ViChangeTo);
    kb.bind("y", ViYankTo);
    kb.bind("~", ViChangeCase);
    kb.bind("u", ViDownCase);
    kb.bind("U", ViUpCase);
    kb.bind("r", ViChangeChar);
    kb.bind("S", ViAddSurround);
    kb.bind("A", ViAppendEol);
    bind_text_objects(&mut kb);

    kb
}

/// Returns the local keymap layered while an operator waits for a motion
pub fn default_vi_opp_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    kb.bind(r"\e", Abort);
    bind_text_objects(&mut kb);

    kb
}

/// Returns the local keymap layered during incremental search
pub fn default_vi_isearch_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    kb.bind(r"\C-r", ReverseSearchHistory);
    kb.bind(r"\C-s", ForwardSearchHistory);
    kb.bind(r"\C-g", Abort);
    kb.bind(r"\e", Abort);

    kb
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::edit_mode::Bind;
    use pretty_assertions::assert_eq;

    #[test]
    fn operators_are_single_key_bindings() {
        let kb = default_vi_command_keybindings();
        assert_eq!(kb.get("d"), Some(&Bind::Command(Command::ViDeleteTo)));
        assert_eq!(kb.get("y"), Some(&Bind::Command(Command::ViYankTo)));
    }

    #[test]
    fn text_objects_live_in_the_local_keymaps() {
        let visual = default_vi_visual_keybindings();
        let viopp = default_vi_opp_keybindings();
        assert_eq!(visual.get("iw"), Some(&Bind::Command(Command::SelectInWord)));
        assert_eq!(viopp.get("a\""), Some(&Bind::Command(Command::ViSelectSurround)));
    }
}
