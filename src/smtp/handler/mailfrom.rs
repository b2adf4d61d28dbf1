//! MAIL FROM

use crate::smtp::config::Configuration;
use crate::smtp::grammar::{self, MAILFROM};
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

#[derive(Debug)]
pub struct HandlerMailfrom<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerMailfrom<'a, S> {
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
        self.handler.clear_message(Stage::Mailfrom);

        let chain: [Predicate<Self>; 3] = [
            Self::is_invalid_cmd_sequence,
            Self::is_invalid_cmd_arg,
            Self::is_blacklisted_email,
        ];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Mailfrom, true, request, &configuration.msg_mailfrom_received);
        self.handler.message.mailfrom_email = Self::mailfrom_email(request).map(str::to_owned);
    }

    fn mailfrom_email(request: &str) -> Option<&str> {
        grammar::capture(request, &MAILFROM, 1)
    }

    /// MAIL FROM is only accepted after a successful HELO
    fn is_invalid_cmd_sequence(&mut self, request: &str) -> bool {
        if self.handler.message.is_successful(Stage::Helo) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler.write_result(
            Stage::Mailfrom,
            false,
            request,
            &configuration.msg_invalid_cmd_mailfrom_sequence,
        )
    }

    fn is_invalid_cmd_arg(&mut self, request: &str) -> bool {
        if grammar::matches(request, &MAILFROM) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler.write_result(
            Stage::Mailfrom,
            false,
            request,
            &configuration.msg_invalid_cmd_mailfrom_arg,
        )
    }

    fn is_blacklisted_email(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        let blacklisted = Self::mailfrom_email(request)
            .is_some_and(|email| configuration.blacklisted_mailfrom_emails.contains(email));
        if !blacklisted {
            return false;
        }

        self.handler.write_result(
            Stage::Mailfrom,
            false,
            request,
            &configuration.msg_mailfrom_blacklisted_email,
        )
    }
}
