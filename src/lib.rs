//! oc-auth - Interactive authentication exchange for OpenConnect-compatible
//! VPN daemons
//!
//! A connecting daemon that needs credentials mid-handshake writes prompt
//! records, one per line, on its control channel. This crate parses those
//! records into typed form fields, batches them into forms, hands each form
//! to a [`Responder`] for the user's input, and writes the encoded answers
//! back - repeating until the daemon signals end of control or the user
//! aborts.
//!
//! # Architecture
//!
//! - `record`: wire grammar for prompt records and answer encoding
//! - `form`: forms, answers and answer sets
//! - `exchange`: the session loop, channel traits and the rendezvous
//! - `responder`: terminal and scripted answer collection
//! - `config`: configuration file handling (TOML)
//!
//! # Usage
//!
//! Pipe the daemon's control channel through the bundled binary:
//! ```bash
//! oc-auth run < /run/ocd/control.out > /run/ocd/control.in
//! ```

pub mod config;
pub mod exchange;
pub mod form;
pub mod record;
pub mod responder;

pub use config::Config;
pub use exchange::{Exchange, ExchangeError, Outcome};
pub use form::{Answer, AnswerSet, Form};
pub use record::{FieldKind, FormField};
pub use responder::Responder;
