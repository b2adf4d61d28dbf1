//! SMTP server implementation

use crate::smtp::config::Configuration;
use crate::smtp::dispatcher::Dispatcher;
use crate::smtp::error::SmtpError;
use crate::smtp::message::Message;
use crate::smtp::session::Session;

use std::io::{BufReader, BufWriter};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Mock SMTP server. Every connection gets its own session thread, and
/// the messages those sessions record are sent to a channel.
#[derive(Debug, Clone)]
pub struct Server {
    configuration: Arc<Configuration>,
}

impl Server {
    /// Create a new SMTP server
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration: Arc::new(configuration),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Start the server on the specified address (blocking)
    /// Messages will be sent to the provided channel as they are received
    pub fn start(
        &self,
        addr: impl ToSocketAddrs,
        message_sender: mpsc::Sender<Message>,
    ) -> Result<(), SmtpError> {
        let listener = TcpListener::bind(addr)?;
        self.start_with_listener(listener, message_sender)
    }

    /// Start the server with an existing listener (blocking)
    /// Messages will be sent to the provided channel as they are received
    pub fn start_with_listener(
        &self,
        listener: TcpListener,
        message_sender: mpsc::Sender<Message>,
    ) -> Result<(), SmtpError> {
        tracing::info!(addr = %listener.local_addr()?, "SMTP server listening");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let configuration = Arc::clone(&self.configuration);
                    let sender = message_sender.clone();
                    thread::spawn(move || {
                        let peer = stream
                            .peer_addr()
                            .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
                        tracing::info!(%peer, "connection accepted");

                        match handle_client(stream, &configuration, &sender) {
                            Ok(()) => tracing::info!(%peer, "connection closed"),
                            Err(e) if e.is_timeout() => {
                                tracing::info!(%peer, "session timed out")
                            }
                            Err(e) => tracing::error!(%peer, error = %e, "error handling client"),
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "error accepting connection");
                }
            }
        }

        Ok(())
    }
}

/// Handle a client connection
fn handle_client(
    stream: TcpStream,
    configuration: &Configuration,
    message_sender: &mpsc::Sender<Message>,
) -> Result<(), SmtpError> {
    if configuration.session_timeout > 0 {
        stream.set_read_timeout(Some(Duration::from_secs(configuration.session_timeout)))?;
    }

    let reader = BufReader::new(stream.try_clone()?);
    let writer = BufWriter::new(stream);
    let session = Session::new(reader, writer);

    Dispatcher::new(session, configuration, Some(message_sender)).run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};

    fn start_test_server(configuration: Configuration) -> (String, mpsc::Receiver<Message>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = Server::new(configuration);
        let (tx, rx) = mpsc::channel();

        // Start server in background thread
        thread::spawn(move || {
            if let Err(e) = server.start_with_listener(listener, tx) {
                eprintln!("Error starting server: {e}");
            }
        });

        (addr, rx)
    }

    fn send_command(
        stream: &mut TcpStream,
        reader: &mut BufReader<TcpStream>,
        command: &str,
    ) -> String {
        write!(stream, "{command}\r\n").unwrap();
        stream.flush().unwrap();

        let mut response = String::new();
        reader.read_line(&mut response).unwrap();
        response.trim_end().to_string()
    }

    #[test]
    fn test_server_creation() {
        let server = Server::new(Configuration::default());
        assert_eq!(server.configuration(), &Configuration::default());
    }

    #[test]
    fn test_complete_smtp_session() {
        let configuration = Configuration::default();
        let (addr, rx) = start_test_server(configuration.clone());

        let mut stream = TcpStream::connect(&addr).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut greeting = String::new();
        reader.read_line(&mut greeting).unwrap();
        assert_eq!(greeting.trim_end(), configuration.msg_greeting);

        let response = send_command(&mut stream, &mut reader, "HELO client.local");
        assert_eq!(response, configuration.msg_helo_received);

        let response = send_command(&mut stream, &mut reader, "MAIL FROM:<test@example.com>");
        assert_eq!(response, configuration.msg_mailfrom_received);

        let response = send_command(&mut stream, &mut reader, "RCPT TO:<recipient@example.com>");
        assert_eq!(response, configuration.msg_rcptto_received);

        let response = send_command(&mut stream, &mut reader, "DATA");
        assert_eq!(response, configuration.msg_data_received);

        write!(stream, "Subject: Test Email\r\n\r\nThis is a test email.\r\n").unwrap();
        let response = send_command(&mut stream, &mut reader, ".");
        assert_eq!(response, configuration.msg_msg_received);

        let response = send_command(&mut stream, &mut reader, "QUIT");
        assert_eq!(response, configuration.msg_quit_cmd);

        let message = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(message.mailfrom_email.as_deref(), Some("test@example.com"));
        assert_eq!(message.rcptto_emails, vec!["recipient@example.com"]);
        assert_eq!(message.subject(), Some("Test Email"));
        assert!(message.body().contains("This is a test email."));
    }

    #[test]
    fn test_session_timeout() {
        let configuration = Configuration {
            session_timeout: 1,
            ..Default::default()
        };
        let (addr, _rx) = start_test_server(configuration);

        let stream = TcpStream::connect(&addr).unwrap();
        let mut reader = BufReader::new(stream);

        let mut greeting = String::new();
        reader.read_line(&mut greeting).unwrap();

        // The server gives up on an idle client and closes the connection
        let mut rest = String::new();
        assert_eq!(reader.read_line(&mut rest).unwrap(), 0);
    }
}
