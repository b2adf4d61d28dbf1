//! # smtpmock
//!
//! smtpmock is a configurable mock SMTP server for testing.
//!
//! It lets you test code that sends mail without a real mail server, and
//! lets you decide how the server answers each command.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smtpmock::{Configuration, Server};
//! use std::sync::mpsc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let configuration = Configuration {
//!     blacklisted_helo_domains: ["evil.example".to_owned()].into(),
//!     ..Default::default()
//! };
//!
//! // Create and start server
//! let (tx, rx) = mpsc::channel();
//! let server = Server::new(configuration);
//!
//! thread::spawn(move || {
//!     server.start("127.0.0.1:2525", tx).unwrap();
//! });
//!
//! // Application sends email to localhost:2525
//! // ...
//!
//! // Check what the server saw
//! if let Ok(message) = rx.recv_timeout(Duration::from_millis(100)) {
//!     println!("HELO answered with: {}", message.helo.response);
//!     println!("Received message from: {:?}", message.mailfrom_email);
//! }
//! ```
//!
//! ## Supported SMTP commands
//!
//! - `HELO` / `EHLO` - Identify the sender
//! - `MAIL FROM` - Specify the sender's address
//! - `RCPT TO` - Specify the destination
//! - `DATA` - Send the email body
//! - `RSET` - Reset the current transaction
//! - `NOOP` - Do nothing
//! - `QUIT` - Close connection
//!
//! ## Responses
//!
//! Every response line comes from a template in [`Configuration`]. A
//! request is checked by an ordered chain of rules (command sequence,
//! argument syntax, blacklists, registered recipients, message size), and
//! the first rule it breaks decides the response. Rejections never close
//! the connection.
//!
//! ## Received messages
//!
//! Each session reports a [`Message`] to the channel given to the server:
//! one per finished DATA body, one before a HELO or EHLO that would reset
//! unreported commands, and one when the client disconnects with activity
//! that was not reported yet. A message records the request,
//! response and outcome of every command, so tests can assert on failed
//! attempts too.
//!
//! ## Notes
//!
//! - Runs in-memory only. Nothing is relayed or delivered.
//! - SMTP authentication is not supported.
//! - SSL/TLS connection is not supported.

mod smtp;

pub use smtp::handler;
pub use smtp::{
    Command, Configuration, Dispatcher, Exchange, Message, MessageBody, Server, Session,
    SessionInterface, SmtpError, Stage,
};
