//! Terminal prompts for interactive sessions
//!
//! Reads input from the controlling terminal rather than stdin, since stdin
//! carries the daemon's control channel when the exchange runs as a pipe.
//! All prompt output goes to stderr for the same reason.

use super::Responder;
use crate::exchange::ReplyHandle;
use crate::form::{Answer, Form};
use crate::record::{FieldKind, FormField};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Prompts for each field on the terminal, masking password input.
///
/// An EOF or unreadable terminal cancels the exchange, the same way a
/// dismissed dialog would.
pub struct ConsoleResponder {
    title: String,
}

impl ConsoleResponder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn prompt_field(&self, field: &FormField) -> Option<String> {
        match field.kind {
            FieldKind::Password => {
                rpassword::prompt_password(format!("{}: ", field.label)).ok()
            }
            FieldKind::Select => self.prompt_choice(field),
            _ => self.prompt_text(field),
        }
    }

    fn prompt_text(&self, field: &FormField) -> Option<String> {
        if field.value.is_empty() {
            eprint!("{}: ", field.label);
        } else {
            eprint!("{} [{}]: ", field.label, field.value);
        }
        io::stderr().flush().ok();

        let input = read_tty_line()?;
        if input.is_empty() && !field.value.is_empty() {
            return Some(field.value.clone());
        }
        Some(input)
    }

    fn prompt_choice(&self, field: &FormField) -> Option<String> {
        // A select whose choice list failed to parse degrades to free text.
        if field.choices.is_empty() {
            return self.prompt_text(field);
        }

        eprintln!("{}:", field.label);
        for (i, choice) in field.choices.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, choice.label);
        }
        eprint!("choice [1-{}]: ", field.choices.len());
        io::stderr().flush().ok();

        loop {
            let picked = read_tty_line()?;
            let choice = picked
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| field.choices.get(i));
            if let Some(choice) = choice {
                return Some(choice.name.clone());
            }
            eprint!("invalid choice, try again: ");
            io::stderr().flush().ok();
        }
    }
}

impl Responder for ConsoleResponder {
    fn present(&mut self, form: Form, reply: ReplyHandle) {
        eprintln!("== {} ==", self.title);
        for field in form.fields() {
            if field.kind == FieldKind::Message {
                eprintln!("{}", field.value);
            }
        }

        let mut answers = Vec::new();
        for field in form.answerable() {
            match self.prompt_field(field) {
                Some(value) => answers.push(Answer::new(field.name.clone(), value)),
                None => {
                    debug!("terminal input aborted, cancelling exchange");
                    reply.cancel();
                    return;
                }
            }
        }
        reply.submit(answers);
    }
}

/// Read one line from the controlling terminal, falling back to stdin when
/// no tty is available.
fn read_tty_line() -> Option<String> {
    #[cfg(unix)]
    {
        if let Ok(tty) = std::fs::File::open("/dev/tty") {
            return read_line_from(io::BufReader::new(tty));
        }
    }
    read_line_from(io::stdin().lock())
}

fn read_line_from<R: BufRead>(mut reader: R) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

// Note: interactive prompting is exercised manually; the scripted responder
// and the exchange tests cover the non-terminal paths.
