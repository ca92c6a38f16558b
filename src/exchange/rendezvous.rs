//! Single-slot handoff between the session thread and the responder
//!
//! After dispatching a form, the session thread parks in [`Rendezvous::wait`]
//! until whichever thread collects the user's input completes the slot
//! through a [`ReplyHandle`]. The slot holds at most one answer set, matching
//! the one-form-in-flight rule of the exchange. Cancellation is sticky: once
//! signalled it survives the current form and suppresses later dispatches.

use crate::form::{Answer, AnswerSet};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Default)]
struct Slot {
    answers: Option<Vec<Answer>>,
    cancelled: bool,
}

/// One mutex/condvar pair carrying one [`AnswerSet`] at a time.
pub struct Rendezvous {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl Rendezvous {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(Slot::default()),
            ready: Condvar::new(),
        })
    }

    /// Handle for the producing side, cloneable across threads.
    pub fn handle(self: &Arc<Self>) -> ReplyHandle {
        ReplyHandle {
            rendezvous: Arc::clone(self),
        }
    }

    /// True once [`ReplyHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, answers: Vec<Answer>) {
        let mut slot = self.lock();
        if slot.answers.is_some() {
            warn!("dropping answer set: a previous one is still pending");
            return;
        }
        slot.answers = Some(answers);
        self.ready.notify_one();
    }

    fn cancel(&self) {
        let mut slot = self.lock();
        slot.cancelled = true;
        self.ready.notify_one();
    }

    /// Block until an answer set or cancellation arrives.
    ///
    /// Cancellation wins over answers delivered alongside it. With a timeout
    /// configured, returns `None` once it elapses with the slot still empty.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> Option<AnswerSet> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut slot = self.lock();
        loop {
            if slot.cancelled {
                return Some(AnswerSet::Cancelled);
            }
            if let Some(answers) = slot.answers.take() {
                return Some(AnswerSet::Submitted(answers));
            }
            slot = match deadline {
                None => self.ready.wait(slot).unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    self.ready
                        .wait_timeout(slot, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

/// Producer-side handle to the rendezvous.
#[derive(Clone)]
pub struct ReplyHandle {
    rendezvous: Arc<Rendezvous>,
}

impl ReplyHandle {
    /// Complete the pending form with the collected answers.
    pub fn submit(&self, answers: Vec<Answer>) {
        self.rendezvous.deliver(answers);
    }

    /// Abort the exchange. Wins over any answers submitted afterwards.
    pub fn cancel(&self) {
        self.rendezvous.cancel();
    }
}
