//! NOOP

use crate::smtp::config::Configuration;
use crate::smtp::handler::Handler;
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// Always answers with `msg_noop_received`. An argument is allowed and
/// ignored.
#[derive(Debug)]
pub struct HandlerNoop<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerNoop<'a, S> {
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
        self.handler.clear_message(Stage::Noop);

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Noop, true, request, &configuration.msg_noop_received);
    }
}
