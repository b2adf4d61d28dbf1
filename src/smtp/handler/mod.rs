//! Command handlers
//!
//! Every handler wraps a [`Handler`], which borrows the session, the live
//! message and the configuration for the duration of one request. A
//! request is checked by an ordered chain of predicates. The first
//! predicate that rejects it writes the failure response, and the rest
//! of the chain is skipped.

mod data;
mod helo;
mod mailfrom;
mod msg;
mod noop;
mod quit;
mod rcptto;
mod rset;

pub use data::HandlerData;
pub use helo::HandlerHelo;
pub use mailfrom::HandlerMailfrom;
pub use msg::HandlerMessage;
pub use noop::HandlerNoop;
pub use quit::HandlerQuit;
pub use rcptto::HandlerRcptto;
pub use rset::HandlerRset;

use crate::smtp::config::Configuration;
use crate::smtp::error::SmtpError;
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// A validation step. Returns `true` when it rejected the request and
/// already wrote the response.
pub type Predicate<H> = fn(&mut H, &str) -> bool;

/// State shared by all command handlers
#[derive(Debug)]
pub struct Handler<'a, S> {
    pub session: &'a mut S,
    pub message: &'a mut Message,
    pub configuration: &'a Configuration,
}

impl<'a, S: SessionInterface> Handler<'a, S> {
    pub fn new(
        session: &'a mut S,
        message: &'a mut Message,
        configuration: &'a Configuration,
    ) -> Self {
        Self {
            session,
            message,
            configuration,
        }
    }

    /// Drop errors recorded for a previous request
    pub fn clear_error(&mut self) {
        self.session.clear_error();
    }

    /// Reset what the message knows about `stage` and the stages after it
    pub fn clear_message(&mut self, stage: Stage) {
        self.message.clear(stage);
    }

    /// Writes the handled result to the session and the message.
    ///
    /// A failure is also recorded as an error on the session. Always
    /// returns `true`: the response has been sent, whatever it said.
    pub fn write_result(
        &mut self,
        stage: Stage,
        is_successful: bool,
        request: &str,
        response: &str,
    ) -> bool {
        if !is_successful {
            tracing::debug!(?stage, request, response, "request rejected");
            self.session.add_error(SmtpError::Rejected(response.to_owned()));
        }

        self.message.record(stage, request, response, is_successful);
        self.session.write_response(response);
        true
    }
}

/// Runs `chain` in order and stops at the first predicate that rejects
/// the request. Returns whether any did.
pub fn is_invalid_request<H>(handler: &mut H, request: &str, chain: &[Predicate<H>]) -> bool {
    chain.iter().any(|predicate| predicate(handler, request))
}
