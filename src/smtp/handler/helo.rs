//! HELO and EHLO

use crate::smtp::config::Configuration;
use crate::smtp::grammar::{self, HELO};
use crate::smtp::handler::{Handler, Predicate, is_invalid_request};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::SessionInterface;

/// Greeting handler. EHLO is answered exactly like HELO.
#[derive(Debug)]
pub struct HandlerHelo<'a, S> {
    handler: Handler<'a, S>,
}

impl<'a, S: SessionInterface> HandlerHelo<'a, S> {
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
        self.handler.clear_message(Stage::Helo);

        let chain: [Predicate<Self>; 2] = [Self::is_invalid_cmd_arg, Self::is_blacklisted_domain];
        if is_invalid_request(self, request, &chain) {
            return;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Helo, true, request, &configuration.msg_helo_received);
        self.handler.message.helo_domain = Self::helo_domain(request).map(str::to_owned);
    }

    fn helo_domain(request: &str) -> Option<&str> {
        grammar::capture(request, &HELO, 2)
    }

    fn is_invalid_cmd_arg(&mut self, request: &str) -> bool {
        if grammar::matches(request, &HELO) {
            return false;
        }

        let configuration = self.handler.configuration;
        self.handler
            .write_result(Stage::Helo, false, request, &configuration.msg_invalid_cmd_helo_arg)
    }

    fn is_blacklisted_domain(&mut self, request: &str) -> bool {
        let configuration = self.handler.configuration;
        let blacklisted = Self::helo_domain(request)
            .is_some_and(|domain| configuration.blacklisted_helo_domains.contains(domain));
        if !blacklisted {
            return false;
        }

        self.handler
            .write_result(Stage::Helo, false, request, &configuration.msg_helo_blacklisted_domain)
    }
}
