use std::borrow::Cow;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex = email_regex();
}

#[allow(clippy::unwrap_used)] // constant pattern
fn email_regex() -> Regex {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
}

/// Mask every e-mail address found in free text.
///
/// Meant for error strings from providers and decoders, which may echo the
/// recipient back.
pub fn redact_emails(text: &str) -> Cow<'_, str> {
    EMAIL_REGEX.replace_all(text, |caps: &regex::Captures| {
        mask_email(caps.get(0).map_or("", |m| m.as_str()))
    })
}

/// Mask an address down to the first character of local part and domain.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{}***@{}***", first_char(local), first_char(domain)),
        None if email.is_empty() => String::new(),
        None => "***".to_string(),
    }
}

fn first_char(part: &str) -> &str {
    part.char_indices()
        .nth(1)
        .map_or(part, |(idx, _)| part.get(..idx).unwrap_or(part))
}

/// `Display` wrapper that prints a masked e-mail address.
///
/// Intended for tracing fields: `info!(recipient = %RedactedEmail(addr), ...)`.
#[derive(Debug, Clone, Copy)]
pub struct RedactedEmail<'a>(pub &'a str);

impl fmt::Display for RedactedEmail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_email(self.0))
    }
}

/// `Display` wrapper that masks any addresses inside a message, typically an
/// error: `warn!(error = %Redacted(&e), ...)`.
#[derive(Debug, Clone, Copy)]
pub struct Redacted<'a, T: fmt::Display + ?Sized>(pub &'a T);

impl<T: fmt::Display + ?Sized> fmt::Display for Redacted<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact_emails(&self.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redaction() {
        let redacted = redact_emails("Sending mail to john.doe@example.com now");
        assert_eq!(redacted, "Sending mail to j***@e*** now");
    }

    #[test]
    fn test_text_without_addresses_is_borrowed() {
        let redacted = redact_emails("connection refused");
        assert!(matches!(redacted, Cow::Borrowed("connection refused")));
    }

    #[test]
    fn test_redacted_error_display() {
        let error = "550 mailbox a.b@corp.example unavailable, cc c@d.org";
        assert_eq!(
            Redacted(error).to_string(),
            "550 mailbox a***@c*** unavailable, cc c***@d***"
        );
    }

    #[test]
    fn test_mask_email_edge_cases() {
        assert_eq!(mask_email(""), "");
        assert_eq!(mask_email("radek"), "***");
        assert_eq!(mask_email("ž@ü.cz"), "ž***@ü***");
        assert_eq!(RedactedEmail("sohlich@gmail.com").to_string(), "s***@g***");
    }
}
