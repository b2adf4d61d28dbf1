//! QUIT

use crate::smtp::config::Configuration;
use crate::smtp::handler::Handler;
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// Says goodbye. The dispatcher closes the connection afterwards.
#[derive(Debug)]
pub struct HandlerQuit<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerQuit<'a, S> {
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
        self.handler.clear_message(Stage::Quit);

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Quit, true, request, &configuration.msg_quit_cmd);
        self.handler.message.quit_sent = true;
    }
}
