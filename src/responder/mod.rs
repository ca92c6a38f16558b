//! Collecting answers for dispatched forms
//!
//! The exchange does not care where answers come from: [`console`] prompts
//! on the terminal, [`scripted`] replays a prepared answer file, and test
//! doubles drive the [`ReplyHandle`] directly.

pub mod console;
pub mod scripted;

pub use console::ConsoleResponder;
pub use scripted::ScriptedResponder;

use crate::exchange::ReplyHandle;
use crate::form::Form;

/// Turns one dispatched [`Form`] into an answer set.
///
/// `present` may reply before returning, or hand the form to another thread
/// and reply later; the exchange parks on its rendezvous either way. Exactly
/// one [`ReplyHandle::submit`] or [`ReplyHandle::cancel`] call is expected
/// per dispatched form.
pub trait Responder {
    fn present(&mut self, form: Form, reply: ReplyHandle);
}
