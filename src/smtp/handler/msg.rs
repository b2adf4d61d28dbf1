//! Message body received after DATA

use crate::smtp::config::Configuration;
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::{MessageBody, SessionInterface};

/// Handles the body of a message, as read by the dispatcher up to the
/// terminating `.` line. The body text is recorded as the request.
#[derive(Debug)]
pub struct HandlerMessage<'a, S> {
    handler: Handler<'a, S>,
    /// Size of the body being handled, which may exceed its kept text
    size: usize,
}

impl<'a, S: SessionInterface> HandlerMessage<'a, S> {
    pub fn new(
        session: &'a mut S,
        message: &'a mut Message,
        configuration: &'a Configuration,
    ) -> Self {
        Self {
            handler: Handler::new(session, message, configuration),
            size: 0,
        }
    }

    pub fn run(&mut self, body: &MessageBody) {
        self.handler.clear_error();
        self.handler.clear_message(Stage::Msg);
        self.size = body.size;

        let request = body.text.as_str();
        let chain: [Predicate<Self>; 1] = [Self::is_invalid_msg_size];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Msg, true, request, &configuration.msg_msg_received);
    }

    fn is_invalid_msg_size(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        if !configuration.is_over_size_limit(self.size) {
            return false;
        }

        self.handler
            .write_result(Stage::Msg, false, request, &configuration.msg_msg_size_is_too_big)
    }
}
