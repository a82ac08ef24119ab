//! Command argument tokenizing.

use crate::markup::escaped_char;

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Split a command's argument string into arguments.
///
/// Arguments are separated by whitespace. An argument starting with `'` runs
/// to the next unescaped `'` and may contain whitespace and backslash escapes;
/// an unterminated quote runs to the end of the input.
pub fn parse_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|&c| is_separator(c)).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };

        let mut arg = String::new();
        if first == '\'' {
            chars.next();
            while let Some(c) = chars.next() {
                match c {
                    '\'' => break,
                    '\\' => match chars.next() {
                        Some(escaped) => arg.push(escaped_char(escaped)),
                        None => arg.push('\\'),
                    },
                    other => arg.push(other),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|&c| !is_separator(c)) {
                arg.push(c);
            }
        }
        args.push(arg);
    }

    args
}

/// Split a raw command into its name and the unparsed argument string.
pub fn split_command(command: &str) -> (&str, &str) {
    let command = command.trim();
    match command.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim_start()),
        None => (command, ""),
    }
}
