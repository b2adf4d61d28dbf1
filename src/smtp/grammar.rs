//! Command grammars shared by the dispatcher and the handlers
//!
//! Each pattern is compiled once. Handlers validate a request and capture
//! its argument with the same pattern, so an argument is only ever
//! extracted from a request that passed validation.

use regex::Regex;
use std::sync::LazyLock;

/// `HELO <domain>` or `EHLO <domain>`, domain in group 2
pub static HELO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A(helo|ehlo) (\S+)\z").unwrap());

/// `MAIL FROM:<user@domain>`, address in group 1
pub static MAILFROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\Amail from: ?<([^<>\s@]+@[^<>\s@]+)>\z").unwrap());

/// `RCPT TO:<user@domain>`, address in group 1
pub static RCPTTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\Arcpt to: ?<([^<>\s@]+@[^<>\s@]+)>\z").unwrap());

pub static DATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\Adata\z").unwrap());

pub static RSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\Arset\z").unwrap());

/// Leading verb of any supported command, in group 1
pub static VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A(helo|ehlo|mail from|rcpt to|data|rset|noop|quit)\b").unwrap()
});

/// Whether the whole request matches `pattern`
pub fn matches(request: &str, pattern: &Regex) -> bool {
    pattern.is_match(request)
}

/// Capture group `group` of `pattern` in `request`, if the request matches
pub fn capture<'r>(request: &'r str, pattern: &Regex, group: usize) -> Option<&'r str> {
    pattern
        .captures(request)
        .and_then(|captures| captures.get(group))
        .map(|m| m.as_str())
}
