//! RSET

use crate::smtp::config::Configuration;
use crate::smtp::grammar::{self, RSET};
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// Drops the current mail transaction. The greeting is kept.
#[derive(Debug)]
pub struct HandlerRset<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerRset<'a, S> {
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
        self.handler.clear_message(Stage::Rset);

        let chain: [Predicate<Self>; 2] = [Self::is_invalid_cmd_sequence, Self::is_invalid_cmd_arg];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        self.handler.message.clear_transaction();
        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Rset, true, request, &configuration.msg_rset_received);
    }

    fn is_invalid_cmd_sequence(&mut self, request: &str) -> bool {
        if self.handler.message.is_successful(Stage::Helo) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Rset, false, request, &configuration.msg_invalid_cmd_rset_sequence)
    }

    fn is_invalid_cmd_arg(&mut self, request: &str) -> bool {
        if grammar::matches(request, &RSET) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Rset, false, request, &configuration.msg_invalid_cmd_rset_arg)
    }
}
