//! Mock SMTP server implementation

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod grammar;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;

pub use config::Configuration;
pub use dispatcher::{Command, Dispatcher};
pub use error::SmtpError;
pub use message::{Exchange, Message, Stage};
pub use server::Server;
pub use session::{MessageBody, Session, SessionInterface};
