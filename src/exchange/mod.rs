//! The request/answer loop against the daemon control channel
//!
//! Prompt records flow in one line at a time and accumulate into a form
//! until the daemon closes it with the `E` sentinel. Each completed form
//! goes to a [`Responder`]; the session thread then parks on the rendezvous
//! until the answers arrive, writes them back as one command batch, and
//! resumes reading. A bare `X` ends the exchange. Because the loop never
//! reads past an unanswered form, at most one form is ever in flight.

mod channel;
mod rendezvous;

pub use channel::{ChannelError, CommandSink, LineSink, LineSource, RecordSource};
pub use rendezvous::{Rendezvous, ReplyHandle};

use crate::form::{Answer, AnswerSet, Form};
use crate::record::{self, FieldKind, FormField};
use crate::responder::Responder;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("control channel closed before end of exchange")]
    ClosedEarly,

    #[error("no answer within {0:?}")]
    AnswerTimeout(Duration),
}

/// How a finished session ended.
///
/// Channel failures are reported separately through [`ExchangeError`], so a
/// caller sees the full tri-state: completed, cancelled, or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The daemon signalled end of control; the connection can proceed
    Completed,
    /// The user declined somewhere along the way
    Cancelled,
}

/// Drives the authentication exchange over a daemon control channel.
pub struct Exchange<S, K, R> {
    source: S,
    sink: K,
    responder: R,
    rendezvous: Arc<Rendezvous>,
    answer_timeout: Option<Duration>,
}

impl<S: RecordSource, K: CommandSink, R: Responder> Exchange<S, K, R> {
    pub fn new(source: S, sink: K, responder: R) -> Self {
        Self {
            source,
            sink,
            responder,
            rendezvous: Rendezvous::new(),
            answer_timeout: None,
        }
    }

    /// Bound the wait for each form's answers. The default waits forever,
    /// matching a responder that is itself waiting on a human.
    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = Some(timeout);
        self
    }

    /// Handle through which cancellation can be signalled from outside the
    /// responder, e.g. a Ctrl+C handler.
    pub fn reply_handle(&self) -> ReplyHandle {
        self.rendezvous.handle()
    }

    /// Run until the daemon ends the exchange or the user aborts.
    pub fn run(&mut self) -> Result<Outcome, ExchangeError> {
        let mut pending: Vec<FormField> = Vec::new();

        loop {
            let Some(line) = self.source.next_record()? else {
                return Err(ExchangeError::ClosedEarly);
            };

            let field = match record::parse(&line) {
                Ok(field) => field,
                Err(e) => {
                    // One bad record drops; the form keeps accumulating.
                    warn!("skipping record: {}", e);
                    continue;
                }
            };

            match field.kind {
                FieldKind::EndOfControl => {
                    if !pending.is_empty() {
                        warn!(
                            "discarding {} unclosed fields at end of control",
                            pending.len()
                        );
                    }
                    info!("daemon ended the exchange");
                    return Ok(Outcome::Completed);
                }
                FieldKind::EndOfForm => {
                    if pending.is_empty() {
                        debug!("end of form with nothing collected, ignoring");
                        continue;
                    }
                    let form = Form::new(std::mem::take(&mut pending));
                    match self.collect_answers(form)? {
                        Some(records) => self.sink.send_command(&records)?,
                        None => return Ok(Outcome::Cancelled),
                    }
                }
                _ => pending.push(field),
            }
        }
    }

    /// Dispatch one form and park until it is answered.
    ///
    /// Returns the encoded answer records, or `None` on cancellation.
    fn collect_answers(&mut self, form: Form) -> Result<Option<Vec<String>>, ExchangeError> {
        if self.rendezvous.is_cancelled() {
            debug!("exchange already cancelled, dropping form");
            return Ok(None);
        }

        debug!("dispatching form with {} fields", form.fields().len());
        let dispatched = form.clone();
        self.responder.present(form, self.rendezvous.handle());

        let Some(set) = self.rendezvous.wait(self.answer_timeout) else {
            return Err(ExchangeError::AnswerTimeout(
                self.answer_timeout.unwrap_or_default(),
            ));
        };

        match set {
            AnswerSet::Cancelled => {
                info!("exchange cancelled by responder");
                Ok(None)
            }
            AnswerSet::Submitted(answers) => Ok(Some(encode_answers(&dispatched, &answers))),
        }
    }
}

/// Encode an answer batch against the form it completes.
///
/// Answers that name no field in the form are dropped; the daemon only
/// understands replies to prompts it issued.
fn encode_answers(form: &Form, answers: &[Answer]) -> Vec<String> {
    answers
        .iter()
        .filter_map(|answer| match form.field(&answer.name) {
            Some(field) => Some(field.encode_answer(&answer.value)),
            None => {
                warn!("dropping answer for unknown field {:?}", answer.name);
                None
            }
        })
        .collect()
}
