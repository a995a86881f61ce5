use super::Keybindings;
use crate::commands::Command;

/// Returns the default emacs keymap
pub fn default_emacs_keybindings() -> Keybindings {
    use Command::*;

    let mut kb = Keybindings::new();

    // CTRL
    kb.bind(r"\C-a", BeginningOfLine);
    kb.bind(r"\C-b", BackwardChar);
    kb.bind(r"\C-c", Interrupt);
    kb.bind(r"\C-d", EndOfFile);
    kb.bind(r"\C-e", EndOfLine);
    kb.bind(r"\C-f", ForwardChar);
    kb.bind(r"\C-g", Abort);
    kb.bind(r"\C-h", BackwardDeleteChar);
    kb.bind(r"\C-k", KillLine);
    kb.bind(r"\C-l", ClearScreen);
    kb.bind(r"\C-n", NextHistory);
    kb.bind(r"\C-o", OperateAndGetNext);
    kb.bind(r"\C-p", PreviousHistory);
    kb.bind(r"\C-r", ReverseSearchHistory);
    kb.bind(r"\C-s", ForwardSearchHistory);
    kb.bind(r"\C-t", TransposeChars);
    kb.bind(r"\C-u", UnixLineDiscard);
    kb.bind(r"\C-v", QuotedInsert);
    kb.bind(r"\C-w", UnixWordRubout);
    kb.bind(r"\C-y", Yank);
    kb.bind(r"\C-]", CharacterSearch);
    kb.bind(r"\C-@", SetMark);
    kb.bind(r"\C-_", Undo);
    kb.bind(r"\C-x\C-u", Undo);
    kb.bind(r"\C-x\C-x", ExchangePointAndMark);
    kb.bind(r"\C-x(", StartKbdMacro);
    kb.bind(r"\C-x)", EndKbdMacro);
    kb.bind(r"\C-xe", CallLastKbdMacro);

    // META
    kb.bind(r"\eb", BackwardWord);
    kb.bind(r"\ef", ForwardWord);
    kb.bind(r"\ed", KillWord);
    kb.bind(r"\e\C-?", BackwardKillWord);
    kb.bind(r"\eu", UpCaseWord);
    kb.bind(r"\el", DownCaseWord);
    kb.bind(r"\ec", CapitalizeWord);
    kb.bind(r"\et", TransposeWords);
    kb.bind(r"\ey", YankPop);
    kb.bind(r"\e.", YankLastArg);
    kb.bind(r"\e_", YankLastArg);
    kb.bind(r"\e\C-y", YankNthArg);
    kb.bind(r"\e<", BeginningOfHistory);
    kb.bind(r"\e>", EndOfHistory);
    kb.bind(r"\ep", NonIncrementalReverseSearchHistory);
    kb.bind(r"\en", NonIncrementalForwardSearchHistory);
    kb.bind(r"\e#", InsertComment);
    kb.bind(r"\er", RevertLine);
    kb.bind(r"\e\C-]", CharacterSearchBackward);
    kb.bind(r"\e-", DigitArgument);
    for digit in '0'..='9' {
        kb.bind(&format!(r"\e{digit}"), DigitArgument);
    }

    // Specials
    kb.bind("\r", AcceptLine);
    kb.bind("\n", AcceptLine);
    kb.bind("\t", Complete);
    kb.bind(r"\C-?", BackwardDeleteChar);
    kb.bind(r"\e[A", UpLineOrHistory);
    kb.bind(r"\e[B", DownLineOrHistory);
    kb.bind(r"\e[C", ForwardChar);
    kb.bind(r"\e[D", BackwardChar);
    kb.bind(r"\e[H", BeginningOfLine);
    kb.bind(r"\e[F", EndOfLine);
    kb.bind(r"\e[3~", DeleteChar);
    kb.bind(r"\e[Z", ReverseMenuComplete);

    kb
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::edit_mode::Bind;
    use pretty_assertions::assert_eq;

    #[test]
    fn the_classics_are_bound() {
        let kb = default_emacs_keybindings();
        assert_eq!(
            kb.get(r"\C-r"),
            Some(&Bind::Command(Command::ReverseSearchHistory))
        );
        assert_eq!(kb.get(r"\C-a"), Some(&Bind::Command(Command::BeginningOfLine)));
        assert_eq!(kb.get("\r"), Some(&Bind::Command(Command::AcceptLine)));
    }
}
