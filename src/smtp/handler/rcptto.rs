//! RCPT TO

use crate::smtp::config::Configuration;
use crate::smtp::grammar::{self, RCPTTO};
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

#[derive(Debug)]
pub struct HandlerRcptto<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerRcptto<'a, S> {
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
        self.handler.clear_message(Stage::Rcptto);

        let chain: [Predicate<Self>; 4] = [
            Self::is_invalid_cmd_sequence,
            Self::is_invalid_cmd_arg,
            Self::is_blacklisted_email,
            Self::is_not_registered_email,
        ];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Rcptto, true, request, &configuration.msg_rcptto_received);
        if let Some(email) = Self::rcptto_email(request) {
            self.handler.message.rcptto_emails.push(email.to_owned());
        }
    }

    fn rcptto_email(request: &str) -> Option<&str> {
        grammar::capture(request, &RCPTTO, 1)
    }

    /// RCPT TO needs an accepted MAIL FROM, and only one recipient is
    /// accepted unless `multiple_rcptto` is set
    fn is_invalid_cmd_sequence(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        let message = &self.handler.message;
        let has_recipient = !message.rcptto_emails.is_empty();
        if message.is_successful(Stage::Mailfrom)
            && (configuration.multiple_rcptto || !has_recipient)
        {
            return false;
        }

        self.handler.write_result(
            Stage::Rcptto,
            false,
            request,
            &configuration.msg_invalid_cmd_rcptto_sequence,
        )
    }

    fn is_invalid_cmd_arg(&mut self, request: &str) -> bool {
        if grammar::matches(request, &RCPTTO) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Rcptto, false, request, &configuration.msg_invalid_cmd_rcptto_arg)
    }

    fn is_blacklisted_email(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        let blacklisted = Self::rcptto_email(request)
            .is_some_and(|email| configuration.blacklisted_rcptto_emails.contains(email));
        if !blacklisted {
            return false;
        }

        self.handler.write_result(
            Stage::Rcptto,
            false,
            request,
            &configuration.msg_rcptto_blacklisted_email,
        )
    }

    fn is_not_registered_email(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        let not_registered = Self::rcptto_email(request)
            .is_some_and(|email| configuration.not_registered_emails.contains(email));
        if !not_registered {
            return false;
        }

        self.handler.write_result(
            Stage::Rcptto,
            false,
            request,
            &configuration.msg_rcptto_not_registered_email,
        )
    }
}
