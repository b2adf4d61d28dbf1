//! Per-connection command loop

use crate::smtp::config::Configuration;
use crate::smtp::error::SmtpError;
use crate::smtp::grammar::{self, VERB};
use crate::smtp::handler::{
    HandlerData, HandlerHelo, HandlerMailfrom, HandlerMessage, HandlerNoop, HandlerQuit,
    HandlerRcptto, HandlerRset,
};
use crate::smtp::message::{Message, Stage};
use crate::smtp::session::{Session, SessionInterface};

use std::io::{BufRead, Write};
use std::sync::mpsc;

/// A command the server knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Helo,
    Mailfrom,
    Rcptto,
    Data,
    Rset,
    Noop,
    Quit,
}

impl Command {
    /// Recognize the command of a request line by its leading verb
    pub fn from_request(request: &str) -> Option<Self> {
        let verb = grammar::capture(request, &VERB, 1)?.to_ascii_lowercase();
        match verb.as_str() {
            "helo" | "ehlo" => Some(Command::Helo),
            "mail from" => Some(Command::Mailfrom),
            "rcpt to" => Some(Command::Rcptto),
            "data" => Some(Command::Data),
            "rset" => Some(Command::Rset),
            "noop" => Some(Command::Noop),
            "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Drives one session: reads requests, runs the handler for each, and
/// hands finished messages to the consumer
pub struct Dispatcher<'a, R, W> {
    session: Session<R, W>,
    message: Message,
    configuration: &'a Configuration,
    sender: Option<&'a mpsc::Sender<Message>>,
    /// Whether `message` holds activity not yet delivered
    pending: bool,
}

impl<'a, R: BufRead, W: Write> Dispatcher<'a, R, W> {
    pub fn new(
        session: Session<R, W>,
        configuration: &'a Configuration,
        sender: Option<&'a mpsc::Sender<Message>>,
    ) -> Self {
        Self {
            session,
            message: Message::default(),
            configuration,
            sender,
            pending: false,
        }
    }

    /// Run the session until the client quits or disconnects.
    /// Returns the session so callers can inspect what was written.
    pub fn run(mut self) -> Result<Session<R, W>, SmtpError> {
        let result = self.serve();
        self.deliver_pending();
        result.map(|()| self.session)
    }

    fn serve(&mut self) -> Result<(), SmtpError> {
        self.session.write_response(&self.configuration.msg_greeting);

        while let Some(request) = self.session.read_request()? {
            if request.is_empty() {
                continue;
            }

            let Some(command) = Command::from_request(&request) else {
                self.invalid_command(&request);
                continue;
            };

            // A new greeting resets the message, so report what it holds first
            if command == Command::Helo && self.message.has_activity_after_helo() {
                self.deliver_pending();
            }

            self.pending = true;
            self.dispatch(command, &request);

            match command {
                Command::Quit => break,
                Command::Data if self.message.is_successful(Stage::Data) => {
                    if !self.receive_message()? {
                        break;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, command: Command, request: &str) {
        let (session, message, configuration) =
            (&mut self.session, &mut self.message, self.configuration);

        match command {
            Command::Helo => HandlerHelo::new(session, message, configuration).run(request),
            Command::Mailfrom => HandlerMailfrom::new(session, message, configuration).run(request),
            Command::Rcptto => HandlerRcptto::new(session, message, configuration).run(request),
            Command::Data => HandlerData::new(session, message, configuration).run(request),
            Command::Rset => HandlerRset::new(session, message, configuration).run(request),
            Command::Noop => HandlerNoop::new(session, message, configuration).run(request),
            Command::Quit => HandlerQuit::new(session, message, configuration).run(request),
        }
    }

    /// Read and handle the body after an accepted DATA. Returns `false`
    /// if the client disconnected before finishing it.
    fn receive_message(&mut self) -> Result<bool, SmtpError> {
        let limit = self.configuration.msg_size_limit;
        let Some(body) = self.session.read_message_body(limit)? else {
            return Ok(false);
        };

        HandlerMessage::new(&mut self.session, &mut self.message, self.configuration).run(&body);

        let next = self.message.next_transaction();
        let finished = std::mem::replace(&mut self.message, next);
        self.deliver(finished);
        Ok(true)
    }

    fn invalid_command(&mut self, request: &str) {
        tracing::debug!(request, "unrecognized command");
        let response = &self.configuration.msg_invalid_cmd;
        self.session.clear_error();
        self.session.add_error(SmtpError::Rejected(response.clone()));
        self.session.write_response(response);
    }

    fn deliver_pending(&mut self) {
        if self.pending {
            let finished = std::mem::take(&mut self.message);
            self.deliver(finished);
        }
    }

    fn deliver(&mut self, message: Message) {
        self.pending = false;
        tracing::debug!(
            from = message.mailfrom_email.as_deref(),
            to = ?message.rcptto_emails,
            consistent = message.is_consistent(),
            "message delivered"
        );

        if let Some(sender) = self.sender {
            // Errors when there are no listeners.
            // We ignore these errors for now.
            let _ = sender.send(message);
        }
    }
}
