use std::collections::HashMap;

use crate::commands::Command;
use crate::edit_mode::{Bind, Keybindings};
use crate::result::{Result, TidelineError, TidelineErrorVariants};

/// A configuration value from a `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// The option store read from inputrc-style configuration.
///
/// Options tideline acts on: `history-size`, `history-preserve-point`,
/// `history-autosuggest`, `comment-begin`, `revert-all-at-newline`,
/// `prompt-transient`, `completion-list-separator`, `editing-mode`.
/// Unknown options are stored and readable, but have no effect.
#[derive(Debug, Clone)]
pub struct Config {
    vars: HashMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        let mut vars = HashMap::new();
        vars.insert("comment-begin".into(), Value::Str("#".into()));
        vars.insert("completion-list-separator".into(), Value::Str("--".into()));
        vars.insert("editing-mode".into(), Value::Str("emacs".into()));
        vars.insert("history-autosuggest".into(), Value::Bool(false));
        vars.insert("history-preserve-point".into(), Value::Bool(false));
        vars.insert("prompt-transient".into(), Value::Bool(false));
        vars.insert("revert-all-at-newline".into(), Value::Bool(false));
        Config { vars }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the option was given a value (by default or by `set`)
    pub fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        match self.vars.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Int(i)) => *i != 0,
            Some(Value::Str(s)) => s == "on" || s == "1",
            None => false,
        }
    }

    pub fn get_int(&self, name: &str) -> i64 {
        match self.vars.get(name) {
            Some(Value::Int(i)) => *i,
            Some(Value::Str(s)) => s.parse().unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            None => 0,
        }
    }

    pub fn get_str(&self, name: &str) -> &str {
        match self.vars.get(name) {
            Some(Value::Str(s)) => s.as_str(),
            _ => "",
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Apply a `set name value` directive, with readline's loose typing
    pub fn set_from_str(&mut self, name: &str, value: &str) {
        let value = value.trim().trim_matches('"');
        let parsed = match value {
            "on" | "On" | "ON" => Value::Bool(true),
            "off" | "Off" | "OFF" => Value::Bool(false),
            other => match other.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Str(other.to_string()),
            },
        };
        self.vars.insert(name.to_string(), parsed);
    }
}

//
// Key sequence notation ----------------------------------------------------
//

fn control(c: char) -> char {
    match c.to_ascii_lowercase() {
        c @ 'a'..='z' => (c as u8 - b'a' + 1) as char,
        '@' | ' ' => '\0',
        '[' => '\x1b',
        '\\' => '\x1c',
        ']' => '\x1d',
        '^' => '\x1e',
        '_' | '/' => '\x1f',
        '?' => '\x7f',
        other => other,
    }
}

/// Expand inputrc escape notation into the raw code point sequence:
/// `\C-x` (control), `\M-x` (meta), `\e`, the C escapes, and `\nnn`/`\xHH`
/// numeric forms.
pub fn unescape(seq: &str) -> Vec<char> {
    let mut out = Vec::new();
    let mut chars = seq.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('C') => {
                // \C-x
                if chars.peek() == Some(&'-') {
                    chars.next();
                }
                if let Some(target) = chars.next() {
                    // \C-\M-x and \C-\e nest
                    if target == '\\' {
                        let rest: String = std::iter::once('\\').chain(chars.by_ref()).collect();
                        let inner = unescape(&rest);
                        if let Some(first) = inner.first() {
                            out.push(control(*first));
                            out.extend(&inner[1..]);
                        }
                        return out;
                    }
                    out.push(control(target));
                }
            }
            Some('M') => {
                // \M-x == ESC x
                if chars.peek() == Some(&'-') {
                    chars.next();
                }
                out.push('\x1b');
            }
            Some('e') => out.push('\x1b'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('d') => out.push('\x7f'),
            Some('f') => out.push('\x0c'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some('x') => {
                let mut hex = String::new();
                while hex.len() < 2 && chars.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    hex.push(chars.next().expect("peeked"));
                }
                if let Ok(code) = u8::from_str_radix(&hex, 16) {
                    out.push(code as char);
                }
            }
            Some(d @ '0'..='7') => {
                let mut oct = String::from(d);
                while oct.len() < 3 && chars.peek().is_some_and(|c| ('0'..='7').contains(c)) {
                    oct.push(chars.next().expect("peeked"));
                }
                if let Ok(code) = u8::from_str_radix(&oct, 8) {
                    out.push(code as char);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Render a raw key sequence back into readable inputrc notation
pub fn escape(seq: &[char]) -> String {
    let mut out = String::new();
    for &c in seq {
        match c {
            '\x1b' => out.push_str(r"\e"),
            '\x7f' => out.push_str(r"\C-?"),
            c if (c as u32) < 0x20 => {
                out.push_str(r"\C-");
                out.push(((c as u8) + b'a' - 1) as char);
            }
            c => out.push(c),
        }
    }
    out
}

//
// Binding file parser ------------------------------------------------------
//

/// The keymap tables an inputrc load writes into.
pub(crate) struct BindingTables<'a> {
    pub emacs: &'a mut Keybindings,
    pub vi_insert: &'a mut Keybindings,
    pub vi_command: &'a mut Keybindings,
}

fn parse_error(line: usize, message: impl Into<String>) -> TidelineError {
    TidelineError(TidelineErrorVariants::BindingParseError {
        line,
        message: message.into(),
    })
}

/// Parse inputrc text: `set` directives into `config`, key bindings into
/// the table selected by the editing mode and `$if mode=` conditionals.
///
/// Surfaced errors are configuration-load errors; they never occur at loop
/// time.
pub(crate) fn parse(text: &str, config: &mut Config, tables: &mut BindingTables) -> Result<()> {
    // Condition stack: (parent active, this branch active)
    let mut conds: Vec<(bool, bool)> = Vec::new();
    let active = |conds: &[(bool, bool)]| conds.iter().all(|(parent, here)| *parent && *here);

    for (num, raw) in text.lines().enumerate() {
        let num = num + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(cond) = line.strip_prefix("$if") {
            let cond = cond.trim();
            let holds = match cond.split_once('=') {
                Some(("mode", mode)) => config.get_str("editing-mode") == mode.trim(),
                Some((name, value)) => config.get_str(name.trim()) == value.trim(),
                // Application name conditions: we are not that application.
                None => cond.eq_ignore_ascii_case("tideline"),
            };
            let parent = active(&conds);
            conds.push((parent, holds));
            continue;
        }
        if line == "$else" {
            match conds.last_mut() {
                Some((_, here)) => *here = !*here,
                None => return Err(parse_error(num, "$else without $if")),
            }
            continue;
        }
        if line == "$endif" {
            if conds.pop().is_none() {
                return Err(parse_error(num, "$endif without $if"));
            }
            continue;
        }
        if !active(&conds) {
            continue;
        }

        if let Some(rest) = line.strip_prefix("set ") {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or_default().trim();
            let value = parts.next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(parse_error(num, "set without an option name"));
            }
            config.set_from_str(name, value);
            continue;
        }

        let (seq, target) = split_binding(line).ok_or_else(|| {
            parse_error(num, format!("not a binding or directive: {line}"))
        })?;

        // `set keymap` scoped binds target an explicit table; otherwise
        // the editing mode decides.
        let keymap: &mut Keybindings = match config.get_str("keymap") {
            "vi-command" | "vi-move" | "vi" => &mut *tables.vi_command,
            "vi-insert" => &mut *tables.vi_insert,
            "emacs" | "emacs-standard" => &mut *tables.emacs,
            _ => match config.get_str("editing-mode") {
                "vi" => &mut *tables.vi_insert,
                _ => &mut *tables.emacs,
            },
        };

        if let Some(expansion) = target.strip_prefix('"') {
            keymap.bind_macro(&seq, expansion.trim_end_matches('"'));
        } else {
            match Command::from_name(target) {
                Some(command) => keymap.bind_raw(unescape(&seq), Bind::Command(command)),
                None => return Err(parse_error(num, format!("unknown command: {target}"))),
            }
        }
    }

    if conds.is_empty() {
        Ok(())
    } else {
        Err(parse_error(text.lines().count(), "unterminated $if"))
    }
}

/// Split `"seq": target` into the escaped sequence and the bind target.
fn split_binding(line: &str) -> Option<(String, &str)> {
    let rest = line.strip_prefix('"')?;
    // The sequence ends at the first unescaped quote.
    let mut end = None;
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                end = Some(i);
                break;
            }
            _ => escaped = false,
        }
    }
    let end = end?;
    let seq = rest[..end].to_string();
    let target = rest[end + 1..].trim().strip_prefix(':')?.trim();
    Some((seq, target))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r"\C-a", vec!['\x01'])]
    #[case(r"\C-?", vec!['\x7f'])]
    #[case(r"\M-f", vec!['\x1b', 'f'])]
    #[case(r"\e[A", vec!['\x1b', '[', 'A'])]
    #[case(r"abc", vec!['a', 'b', 'c'])]
    #[case(r"\033[B", vec!['\x1b', '[', 'B'])]
    #[case(r"\x7f", vec!['\x7f'])]
    fn unescape_notation(#[case] seq: &str, #[case] expected: Vec<char>) {
        assert_eq!(unescape(seq), expected);
    }

    #[test]
    fn escape_round_trips_controls() {
        assert_eq!(escape(&['\x12', 'a', '\x1b']), r"\C-ra\e");
        assert_eq!(unescape(&escape(&['\x12', 'a'])), vec!['\x12', 'a']);
    }

    fn load(text: &str) -> (Config, Keybindings, Keybindings, Keybindings) {
        let mut config = Config::new();
        let mut emacs = Keybindings::new();
        let mut vi_insert = Keybindings::new();
        let mut vi_command = Keybindings::new();
        let mut tables = BindingTables {
            emacs: &mut emacs,
            vi_insert: &mut vi_insert,
            vi_command: &mut vi_command,
        };
        parse(text, &mut config, &mut tables).expect("valid inputrc");
        (config, emacs, vi_insert, vi_command)
    }

    #[test]
    fn set_directives_are_typed() {
        let (config, ..) = load("set history-size 500\nset comment-begin \"#\"\nset history-autosuggest on\n");
        assert_eq!(config.get_int("history-size"), 500);
        assert_eq!(config.get_str("comment-begin"), "#");
        assert!(config.get_bool("history-autosuggest"));
    }

    #[test]
    fn bindings_reach_the_mode_table() {
        let (_, emacs, ..) = load("\"\\C-t\": transpose-chars\n");
        assert_eq!(
            emacs.get(r"\C-t"),
            Some(&Bind::Command(Command::TransposeChars))
        );
    }

    #[test]
    fn mode_conditionals_select_tables() {
        let text = "set editing-mode vi\n$if mode=vi\n\"\\C-l\": clear-screen\n$else\n\"\\C-l\": end-of-line\n$endif\n";
        let (_, emacs, vi_insert, _) = load(text);
        assert_eq!(
            vi_insert.get(r"\C-l"),
            Some(&Bind::Command(Command::ClearScreen))
        );
        assert_eq!(emacs.get(r"\C-l"), None);
    }

    #[test]
    fn macro_bindings_stay_escaped() {
        let (_, emacs, ..) = load("\"\\C-x\": \"echo hi\"\n");
        assert_eq!(emacs.get(r"\C-x"), Some(&Bind::Macro("echo hi".to_string())));
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        let mut config = Config::new();
        let mut emacs = Keybindings::new();
        let mut vi_insert = Keybindings::new();
        let mut vi_command = Keybindings::new();
        let mut tables = BindingTables {
            emacs: &mut emacs,
            vi_insert: &mut vi_insert,
            vi_command: &mut vi_command,
        };
        let err = parse("\"\\C-q\": frobnicate\n", &mut config, &mut tables);
        assert!(err.is_err());
    }
}
