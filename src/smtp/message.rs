//! Per-transaction record of what the client sent and what it was told

/// A step of the SMTP conversation that records an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Helo,
    Mailfrom,
    Rcptto,
    Data,
    Msg,
    Rset,
    Noop,
    Quit,
}

impl Stage {
    /// Stages of a mail transaction, each invalidated when an earlier one
    /// is retried
    const TRANSACTION: [Stage; 4] = [
        Stage::Mailfrom,
        Stage::Rcptto,
        Stage::Data,
        Stage::Msg,
    ];
}

/// One request line and the response written for it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    pub request: String,
    pub response: String,
    pub successful: bool,
}

impl Exchange {
    fn record(&mut self, request: &str, response: &str, successful: bool) {
        self.request = request.to_owned();
        self.response = response.to_owned();
        self.successful = successful;
    }
}

/// Outcome of each command of the current transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub helo: Exchange,
    pub mailfrom: Exchange,
    pub rcptto: Exchange,
    pub data: Exchange,
    pub msg: Exchange,
    pub rset: Exchange,
    pub noop: Exchange,
    pub quit: Exchange,

    /// Domain given with an accepted HELO or EHLO
    pub helo_domain: Option<String>,
    /// Sender given with an accepted MAIL FROM
    pub mailfrom_email: Option<String>,
    /// Recipients given with accepted RCPT TO commands
    pub rcptto_emails: Vec<String>,
    /// Whether the client sent QUIT
    pub quit_sent: bool,
}

impl Message {
    pub fn exchange(&self, stage: Stage) -> &Exchange {
        match stage {
            Stage::Helo => &self.helo,
            Stage::Mailfrom => &self.mailfrom,
            Stage::Rcptto => &self.rcptto,
            Stage::Data => &self.data,
            Stage::Msg => &self.msg,
            Stage::Rset => &self.rset,
            Stage::Noop => &self.noop,
            Stage::Quit => &self.quit,
        }
    }

    pub fn exchange_mut(&mut self, stage: Stage) -> &mut Exchange {
        match stage {
            Stage::Helo => &mut self.helo,
            Stage::Mailfrom => &mut self.mailfrom,
            Stage::Rcptto => &mut self.rcptto,
            Stage::Data => &mut self.data,
            Stage::Msg => &mut self.msg,
            Stage::Rset => &mut self.rset,
            Stage::Noop => &mut self.noop,
            Stage::Quit => &mut self.quit,
        }
    }

    /// Record the outcome of a request for `stage`
    pub fn record(&mut self, stage: Stage, request: &str, response: &str, successful: bool) {
        self.exchange_mut(stage).record(request, response, successful);
    }

    /// Whether the last request of `stage` was accepted
    pub fn is_successful(&self, stage: Stage) -> bool {
        self.exchange(stage).successful
    }

    /// Reset `stage` to its zero value. Resetting HELO resets the whole
    /// message; for any other transaction stage every later transaction
    /// stage is reset too. The recipient list survives a RCPT TO retry
    /// and is only dropped by resetting MAIL FROM.
    pub fn clear(&mut self, stage: Stage) {
        if stage == Stage::Helo {
            *self = Self::default();
            return;
        }

        if !Stage::TRANSACTION.contains(&stage) {
            *self.exchange_mut(stage) = Exchange::default();
            return;
        }

        for later in Stage::TRANSACTION.into_iter().filter(|s| *s >= stage) {
            *self.exchange_mut(later) = Exchange::default();
        }

        if stage == Stage::Mailfrom {
            self.mailfrom_email = None;
            self.rcptto_emails.clear();
        }
    }

    /// Drop the mail transaction, keeping the greeting
    pub fn clear_transaction(&mut self) {
        self.clear(Stage::Mailfrom);
    }

    /// Start the next transaction on the same connection: only the
    /// greeting carries over
    pub fn next_transaction(&self) -> Self {
        Self {
            helo: self.helo.clone(),
            helo_domain: self.helo_domain.clone(),
            ..Default::default()
        }
    }

    /// Whether any command besides HELO and EHLO was recorded
    pub fn has_activity_after_helo(&self) -> bool {
        [
            Stage::Mailfrom,
            Stage::Rcptto,
            Stage::Data,
            Stage::Msg,
            Stage::Rset,
            Stage::Noop,
            Stage::Quit,
        ]
        .into_iter()
        .any(|stage| *self.exchange(stage) != Exchange::default())
    }

    /// Whether the client completed a transaction up to an accepted body
    pub fn is_consistent(&self) -> bool {
        self.helo.successful
            && self.mailfrom.successful
            && !self.rcptto_emails.is_empty()
            && self.data.successful
            && self.msg.successful
    }

    /// Body of the received message, as sent after DATA
    pub fn body(&self) -> &str {
        &self.msg.request
    }

    /// Check if a recipient was accepted for this message
    pub fn has_recipient(&self, recipient: &str) -> bool {
        self.rcptto_emails.iter().any(|addr| addr == recipient)
    }

    /// Get the subject line from the message headers (if present)
    pub fn subject(&self) -> Option<&str> {
        self.body()
            .lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("subject").then(|| value.trim())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_message() -> Message {
        let mut message = Message::default();
        message.record(Stage::Helo, "HELO client.local", "250 Received", true);
        message.helo_domain = Some("client.local".to_owned());
        message.record(Stage::Mailfrom, "MAIL FROM:<a@example.com>", "250 Received", true);
        message.mailfrom_email = Some("a@example.com".to_owned());
        message.record(Stage::Rcptto, "RCPT TO:<b@example.com>", "250 Received", true);
        message.rcptto_emails.push("b@example.com".to_owned());
        message.record(Stage::Data, "DATA", "354 Go ahead", true);
        message.record(Stage::Msg, "Subject: Hi\n\nBody", "250 Received", true);
        message
    }

    #[test]
    fn test_default_is_empty() {
        let message = Message::default();
        assert!(!message.is_successful(Stage::Helo));
        assert!(message.helo.request.is_empty());
        assert!(message.rcptto_emails.is_empty());
        assert!(!message.quit_sent);
    }

    #[test]
    fn test_record() {
        let mut message = Message::default();
        message.record(Stage::Noop, "NOOP", "250 Received", true);
        assert_eq!(message.noop.request, "NOOP");
        assert_eq!(message.noop.response, "250 Received");
        assert!(message.is_successful(Stage::Noop));
    }

    #[test]
    fn test_clear_helo_resets_everything() {
        let mut message = completed_message();
        message.record(Stage::Noop, "NOOP", "250 Received", true);
        message.quit_sent = true;
        message.clear(Stage::Helo);

        assert_eq!(message, Message::default());
    }

    #[test]
    fn test_clear_rcptto_keeps_earlier_stages_and_recipients() {
        let mut message = completed_message();
        message.clear(Stage::Rcptto);

        assert!(message.is_successful(Stage::Helo));
        assert!(message.is_successful(Stage::Mailfrom));
        assert!(!message.is_successful(Stage::Rcptto));
        assert!(!message.is_successful(Stage::Data));
        assert!(!message.is_successful(Stage::Msg));
        assert_eq!(message.rcptto_emails, vec!["b@example.com"]);
    }

    #[test]
    fn test_clear_non_transaction_stage() {
        let mut message = completed_message();
        message.record(Stage::Noop, "NOOP", "250 Received", true);
        message.clear(Stage::Noop);

        assert_eq!(message.noop, Exchange::default());
        assert!(message.is_consistent());
    }

    #[test]
    fn test_clear_transaction() {
        let mut message = completed_message();
        message.clear_transaction();

        assert!(message.is_successful(Stage::Helo));
        assert_eq!(message.helo_domain.as_deref(), Some("client.local"));
        assert!(message.mailfrom_email.is_none());
        assert!(message.rcptto_emails.is_empty());
        assert!(!message.is_consistent());
    }

    #[test]
    fn test_next_transaction() {
        let message = completed_message();
        let next = message.next_transaction();

        assert_eq!(next.helo, message.helo);
        assert_eq!(next.helo_domain, message.helo_domain);
        assert_eq!(next.mailfrom, Exchange::default());
        assert!(next.rcptto_emails.is_empty());
    }

    #[test]
    fn test_is_consistent() {
        assert!(completed_message().is_consistent());
        assert!(!Message::default().is_consistent());
    }

    #[test]
    fn test_activity_after_helo() {
        let mut message = Message::default();
        assert!(!message.has_activity_after_helo());

        message.record(Stage::Helo, "HELO", "501 bad", false);
        assert!(!message.has_activity_after_helo());

        message.record(Stage::Mailfrom, "MAIL FROM:<a@b.c>", "503 bad sequence", false);
        assert!(message.has_activity_after_helo());
        assert!(completed_message().has_activity_after_helo());
    }

    #[test]
    fn test_has_recipient() {
        let message = completed_message();
        assert!(message.has_recipient("b@example.com"));
        assert!(!message.has_recipient("c@example.com"));
    }

    #[test]
    fn test_subject() {
        let message = completed_message();
        assert_eq!(message.subject(), Some("Hi"));

        let mut lowercase = Message::default();
        lowercase.record(Stage::Msg, "subject: quiet\n\nbody", "250 Received", true);
        assert_eq!(lowercase.subject(), Some("quiet"));

        let mut in_body = Message::default();
        in_body.record(Stage::Msg, "From: a@b\n\nSubject: not a header", "250", true);
        assert_eq!(in_body.subject(), None);
    }
}
