use tideline::{
    default_emacs_keybindings, Bind, Candidate, Command, EditMode, FileBackedHistory, History,
    LineBuffer, MemoryHistory, Shell, Values,
};

/// The public builder wires up without touching the terminal.
#[test]
fn builds_a_configured_shell() {
    let shell = Shell::new()
        .with_edit_mode(EditMode::Vi)
        .with_history("app", Box::new(MemoryHistory::new()));
    assert_eq!(shell.config().get_str("editing-mode"), "vi");
}

#[test]
fn inputrc_text_configures_options_and_bindings() {
    let mut shell = Shell::new();
    shell
        .load_inputrc_str(
            "set history-size 200\nset prompt-transient on\n\"\\C-t\": transpose-words\n",
        )
        .expect("valid inputrc");

    assert_eq!(shell.config().get_int("history-size"), 200);
    assert!(shell.config().get_bool("prompt-transient"));
}

#[test]
fn invalid_inputrc_surfaces_at_load_time() {
    let mut shell = Shell::new();
    let result = shell.load_inputrc_str("\"\\C-q\": no-such-command\n");
    assert!(result.is_err());
}

#[test]
fn command_names_match_the_readline_tables() {
    assert_eq!(Command::from_name("accept-line"), Some(Command::AcceptLine));
    assert_eq!(
        Command::from_name("vi-movement-mode"),
        Some(Command::ViMovementMode)
    );
    let bindings = default_emacs_keybindings();
    assert_eq!(
        bindings.get(r"\C-y"),
        Some(&Bind::Command(Command::Yank))
    );
}

#[test]
fn file_history_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");

    let mut history = FileBackedHistory::with_file(path.clone()).unwrap();
    history.write("cargo build").unwrap();
    history.write("cargo test").unwrap();

    let reloaded = FileBackedHistory::with_file(path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get_line(1).unwrap(), "cargo test");
}

#[test]
fn line_buffer_is_code_point_addressed() {
    let mut line = LineBuffer::from("héllo wörld");
    assert_eq!(line.len(), 11);
    assert_eq!(line.next_word_start(0, false), 6);
    assert_eq!(line.cut(0, 6), "héllo ");
    assert_eq!(line.to_string(), "wörld");
}

#[test]
fn completion_values_carry_group_options() {
    let values = Values::new(vec![
        Candidate::new("alpha").with_tag("words"),
        Candidate::new("beta").with_tag("words"),
    ])
    .no_sort_all();
    assert!(!values.is_empty());
    assert_eq!(values.candidates.len(), 2);
}
