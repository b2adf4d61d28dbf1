//! DATA

use crate::smtp::config::Configuration;
use crate::smtp::grammar::{self, DATA};
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// Accepts the DATA command itself. The body that follows is read by
/// the dispatcher and handled by [`HandlerMessage`](super::HandlerMessage).
#[derive(Debug)]
pub struct HandlerData<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerData<'a, S> {
    pub fn new(
        session: &'a mut S,
        message: &'a mut Message,
        configuration: &'a Configuration,
    ) -> Self {
        Self {
            handler: Handler::new(session, message, configuration),
        }
    }

    pub fn run(&mut self, request: &str) {
        self.handler.clear_error();
        self.handler.clear_message(Stage::Data);

        let chain: [Predicate<Self>; 2] = [Self::is_invalid_cmd_sequence, Self::is_invalid_cmd_arg];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Data, true, request, &configuration.msg_data_received);
    }

    /// DATA needs at least one accepted recipient
    fn is_invalid_cmd_sequence(&mut self, request: &str) -> bool {
        let message = &self.handler.message;
        if message.is_successful(Stage::Mailfrom) && !message.rcptto_emails.is_empty() {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Data, false, request, &configuration.msg_invalid_cmd_data_sequence)
    }

    fn is_invalid_cmd_arg(&mut self, request: &str) -> bool {
        if grammar::matches(request, &DATA) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Data, false, request, &configuration.msg_invalid_cmd_data_arg)
    }
}
