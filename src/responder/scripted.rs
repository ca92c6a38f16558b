//! Replaying answers from a prepared file
//!
//! Lets unattended runs answer the daemon's prompts, e.g. when an outer tool
//! injects the credentials. Answers load from a JSON object keyed by field
//! name:
//!
//! ```json
//! { "user": "bob", "code": "123456" }
//! ```

use super::Responder;
use crate::exchange::ReplyHandle;
use crate::form::{Answer, Form};
use crate::record::{FieldKind, FormField};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AnswerFileError {
    #[error("failed to read answer file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse answer file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Answers each form from a fixed name → value map.
///
/// A field with no entry falls back to its pre-filled default (first choice
/// for a select); a field with neither cancels the exchange, since the
/// daemon would reject a half-answered form anyway.
pub struct ScriptedResponder {
    answers: HashMap<String, String>,
}

impl ScriptedResponder {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    pub fn from_file(path: &Path) -> Result<Self, AnswerFileError> {
        let content = std::fs::read_to_string(path)?;
        let answers = serde_json::from_str(&content)?;
        Ok(Self::new(answers))
    }

    fn answer_for(&self, field: &FormField) -> Option<String> {
        if let Some(value) = self.answers.get(&field.name) {
            return Some(value.clone());
        }
        match field.kind {
            // The raw value of a select is its choice list, not an answer.
            FieldKind::Select => field.choices.first().map(|c| c.name.clone()),
            _ if field.value.is_empty() => None,
            _ => Some(field.value.clone()),
        }
    }
}

impl Responder for ScriptedResponder {
    fn present(&mut self, form: Form, reply: ReplyHandle) {
        let mut answers = Vec::new();
        for field in form.answerable() {
            match self.answer_for(field) {
                Some(value) => {
                    debug!("scripted answer for field {:?}", field.name);
                    answers.push(Answer::new(field.name.clone(), value));
                }
                None => {
                    warn!("no scripted answer for field {:?}, cancelling", field.name);
                    reply.cancel();
                    return;
                }
            }
        }
        reply.submit(answers);
    }
}
