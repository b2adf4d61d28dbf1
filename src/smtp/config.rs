//! Server configuration: response templates and request policies

use crate::smtp::error::SmtpError;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Default limit on the size of a received message body
pub const DEFAULT_MSG_SIZE_LIMIT: usize = 10 * 1024 * 1024; // 10MB

/// Default read timeout for a session, in seconds
pub const DEFAULT_SESSION_TIMEOUT: u64 = 30;

/// Static policy shared by every session of a server.
///
/// Every response line the server writes comes from one of the `msg_*`
/// templates, so status codes and wording are decided here rather than
/// in the handlers. All fields have defaults; a TOML file only needs to
/// list what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    pub msg_greeting: String,
    pub msg_invalid_cmd: String,

    pub msg_invalid_cmd_helo_arg: String,
    pub msg_helo_blacklisted_domain: String,
    pub msg_helo_received: String,

    pub msg_invalid_cmd_mailfrom_sequence: String,
    pub msg_invalid_cmd_mailfrom_arg: String,
    pub msg_mailfrom_blacklisted_email: String,
    pub msg_mailfrom_received: String,

    pub msg_invalid_cmd_rcptto_sequence: String,
    pub msg_invalid_cmd_rcptto_arg: String,
    pub msg_rcptto_blacklisted_email: String,
    pub msg_rcptto_not_registered_email: String,
    pub msg_rcptto_received: String,

    pub msg_invalid_cmd_data_sequence: String,
    pub msg_invalid_cmd_data_arg: String,
    pub msg_data_received: String,

    pub msg_msg_size_is_too_big: String,
    pub msg_msg_received: String,

    pub msg_invalid_cmd_rset_sequence: String,
    pub msg_invalid_cmd_rset_arg: String,
    pub msg_rset_received: String,

    pub msg_noop_received: String,
    pub msg_quit_cmd: String,

    /// HELO/EHLO domains answered with `msg_helo_blacklisted_domain`
    pub blacklisted_helo_domains: HashSet<String>,
    /// Senders answered with `msg_mailfrom_blacklisted_email`
    pub blacklisted_mailfrom_emails: HashSet<String>,
    /// Recipients answered with `msg_rcptto_blacklisted_email`
    pub blacklisted_rcptto_emails: HashSet<String>,
    /// Recipients answered with `msg_rcptto_not_registered_email`
    pub not_registered_emails: HashSet<String>,

    /// Accept more than one RCPT TO per transaction
    pub multiple_rcptto: bool,
    /// Maximum message body size in bytes, 0 disables the check
    pub msg_size_limit: usize,
    /// Read timeout in seconds, 0 disables it
    pub session_timeout: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            msg_greeting: "220 Welcome".to_owned(),
            msg_invalid_cmd: "502 Command unrecognized. Available commands: HELO, EHLO, MAIL FROM:, RCPT TO:, DATA, RSET, NOOP, QUIT".to_owned(),

            msg_invalid_cmd_helo_arg: "501 HELO requires domain address".to_owned(),
            msg_helo_blacklisted_domain: "421 Blacklisted domain".to_owned(),
            msg_helo_received: "250 Received".to_owned(),

            msg_invalid_cmd_mailfrom_sequence:
                "503 Bad sequence of commands. MAIL FROM command should be used after HELO"
                    .to_owned(),
            msg_invalid_cmd_mailfrom_arg: "501 MAIL FROM requires valid email address".to_owned(),
            msg_mailfrom_blacklisted_email: "421 Blacklisted email".to_owned(),
            msg_mailfrom_received: "250 Received".to_owned(),

            msg_invalid_cmd_rcptto_sequence:
                "503 Bad sequence of commands. RCPT TO command should be used after MAIL FROM"
                    .to_owned(),
            msg_invalid_cmd_rcptto_arg: "501 RCPT TO requires valid email address".to_owned(),
            msg_rcptto_blacklisted_email: "421 Blacklisted email".to_owned(),
            msg_rcptto_not_registered_email: "550 User not found".to_owned(),
            msg_rcptto_received: "250 Received".to_owned(),

            msg_invalid_cmd_data_sequence:
                "503 Bad sequence of commands. DATA command should be used after RCPT TO"
                    .to_owned(),
            msg_invalid_cmd_data_arg: "501 DATA command does not accept arguments".to_owned(),
            msg_data_received: "354 Ready for receive message. End data with <CR><LF>.<CR><LF>"
                .to_owned(),

            msg_msg_size_is_too_big: "552 Message exceeded max size".to_owned(),
            msg_msg_received: "250 Received".to_owned(),

            msg_invalid_cmd_rset_sequence:
                "503 Bad sequence of commands. RSET command should be used after HELO".to_owned(),
            msg_invalid_cmd_rset_arg: "501 RSET command does not accept arguments".to_owned(),
            msg_rset_received: "250 Received".to_owned(),

            msg_noop_received: "250 Received".to_owned(),
            msg_quit_cmd: "221 Closing connection".to_owned(),

            blacklisted_helo_domains: HashSet::new(),
            blacklisted_mailfrom_emails: HashSet::new(),
            blacklisted_rcptto_emails: HashSet::new(),
            not_registered_emails: HashSet::new(),

            multiple_rcptto: false,
            msg_size_limit: DEFAULT_MSG_SIZE_LIMIT,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl Configuration {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, SmtpError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SmtpError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Whether a body of `size` bytes exceeds the configured limit
    pub fn is_over_size_limit(&self, size: usize) -> bool {
        self.msg_size_limit > 0 && size > self.msg_size_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let configuration = Configuration::from_toml("").unwrap();
        assert_eq!(configuration, Configuration::default());
    }

    #[test]
    fn test_partial_override() {
        let configuration = Configuration::from_toml(
            r#"
            msg_helo_received = "250 Hello"
            blacklisted_helo_domains = ["evil.example"]
            multiple_rcptto = true
            "#,
        )
        .unwrap();

        assert_eq!(configuration.msg_helo_received, "250 Hello");
        assert!(configuration.blacklisted_helo_domains.contains("evil.example"));
        assert!(configuration.multiple_rcptto);
        assert_eq!(configuration.msg_greeting, "220 Welcome");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Configuration::from_toml("msg_helo_recieved = \"250 typo\"");
        assert!(matches!(result, Err(SmtpError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Configuration::from_file("/nonexistent/smtpmock.toml");
        assert!(matches!(result, Err(SmtpError::Io(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut configuration = Configuration {
            msg_size_limit: 10,
            ..Default::default()
        };
        assert!(!configuration.is_over_size_limit(10));
        assert!(configuration.is_over_size_limit(11));

        configuration.msg_size_limit = 0;
        assert!(!configuration.is_over_size_limit(usize::MAX));
    }
}
