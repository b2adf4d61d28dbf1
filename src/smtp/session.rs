//! Per-connection session: line I/O and the diagnostic error log

use crate::smtp::error::SmtpError;

use std::io::{BufRead, Write};

/// What a command handler may do to the session it runs on
pub trait SessionInterface {
    /// Send one response line to the client
    fn write_response(&mut self, response: &str);

    /// Append an error to the session's error log
    fn add_error(&mut self, error: SmtpError);

    /// Drop errors left over from a previous request
    fn clear_error(&mut self);
}

/// A message body read after DATA
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    /// The body text, empty if the body went over the size limit
    pub text: String,
    /// Size of the whole body in bytes, as if every line had been kept
    pub size: usize,
}

impl MessageBody {
    /// Whether the text was dropped for going over the size limit
    pub fn is_discarded(&self) -> bool {
        self.text.len() < self.size
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            size: text.len(),
        }
    }
}

/// A client connection, with the errors recorded for its latest request
#[derive(Debug)]
pub struct Session<R, W> {
    reader: R,
    writer: W,
    errors: Vec<SmtpError>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a new session over a connection's read and write halves
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            errors: Vec::new(),
        }
    }

    /// Errors recorded since the last `clear_error`
    pub fn errors(&self) -> &[SmtpError] {
        &self.errors
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Read one request line without its line ending.
    /// Returns `None` once the client has closed the connection.
    pub fn read_request(&mut self) -> Result<Option<String>, SmtpError> {
        let mut buffer = Vec::new();
        if self.reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }

        // Invalid UTF-8 is replaced rather than refused; the grammar
        // rejects whatever it does not recognize.
        let line = String::from_utf8_lossy(&buffer);
        let request = line.trim_end_matches(['\r', '\n']).to_owned();
        tracing::trace!(request = %request, "incoming");
        Ok(Some(request))
    }

    /// Read the message body that follows an accepted DATA, up to the
    /// terminating `.` line. Dot-stuffing is undone and lines are joined
    /// with `\n`. Once the body grows past `limit` bytes its text is
    /// dropped and only the size is counted; `limit = 0` keeps everything.
    /// Returns `None` if the connection closes first.
    pub fn read_message_body(
        &mut self,
        limit: usize,
    ) -> Result<Option<MessageBody>, SmtpError> {
        let mut lines = Vec::new();
        let mut size = 0;
        let mut count = 0;
        let mut discarded = false;
        loop {
            let Some(line) = self.read_request()? else {
                return Ok(None);
            };

            if line == "." {
                return Ok(Some(MessageBody {
                    text: lines.join("\n"),
                    size,
                }));
            }

            let line = match line.strip_prefix('.') {
                Some(unstuffed) => unstuffed.to_owned(),
                None => line,
            };

            size += line.len() + usize::from(count > 0);
            count += 1;

            if limit > 0 && size > limit {
                if !discarded {
                    tracing::debug!(size, limit, "message body over size limit");
                    lines = Vec::new();
                    discarded = true;
                }
                continue;
            }

            lines.push(line);
        }
    }
}

impl<R, W: Write> SessionInterface for Session<R, W> {
    fn write_response(&mut self, response: &str) {
        tracing::trace!(response, "outgoing");

        let result = self
            .writer
            .write_all(format!("{response}\r\n").as_bytes())
            .and_then(|()| self.writer.flush());

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to write response");
            self.errors.push(SmtpError::Io(e));
        }
    }

    fn add_error(&mut self, error: SmtpError) {
        self.errors.push(error);
    }

    fn clear_error(&mut self) {
        self.errors.clear();
    }
}
