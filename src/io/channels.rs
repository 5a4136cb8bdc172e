//! Communication channel intents
//!
//! Every operation here is fire-and-forget: success means "the external
//! composer was asked to open", never that a message was delivered. The URL
//! builders reproduce the platform deep-link rules exactly (Android `sms:`
//! takes `?body=`, iOS takes `&body=`; `mailto:` wants header-style `?to=`
//! recipients and a CRLF body for picky clients).

use crate::domain::types::OsFamily;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// A platform intent failed to launch; recoverable, surfaced as a notice
#[derive(Debug, Clone, Error)]
#[error("platform intent failed: {0}")]
pub struct DispatchError(pub String);

/// Fire-and-forget platform intents. No return signal of delivery exists.
#[async_trait]
pub trait ChannelDispatcher: Send + Sync {
    /// Open the SMS composer; `recipients` is already delimiter-joined
    async fn open_sms(&self, recipients: &str, body: &str) -> Result<(), DispatchError>;
    /// Open the dialer with the given number
    async fn open_dialer(&self, number: &str) -> Result<(), DispatchError>;
    /// Open the email composer; `recipients` is comma-joined
    async fn open_email(
        &self,
        recipients: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DispatchError>;
    /// Write text to the platform clipboard
    async fn write_clipboard(&self, text: &str) -> Result<(), DispatchError>;
}

/// Percent-encode a URL component (the `encodeURIComponent` character set)
pub fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(*byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Build an `sms:` deep link for the given OS family
pub fn sms_url(recipients: &str, body: &str, os_family: OsFamily) -> String {
    // iOS expects the body as a second query parameter
    let body_delimiter = match os_family {
        OsFamily::Ios => '&',
        OsFamily::Android | OsFamily::Other => '?',
    };
    format!("sms:{}{}body={}", recipients, body_delimiter, encode_component(body))
}

/// Build a `tel:` deep link
pub fn tel_url(number: &str) -> String {
    format!("tel:{}", number)
}

/// Build a `mailto:` link with header-style recipients and a CRLF body
pub fn mailto_url(recipients: &str, subject: &str, body: &str) -> String {
    let crlf_body = body.replace('\n', "\r\n");
    format!(
        "mailto:?to={}&subject={}&body={}",
        encode_component(recipients),
        encode_component(subject),
        encode_component(&crlf_body)
    )
}

/// Dispatcher that logs the intent URLs instead of launching them.
///
/// Used by hosts without a deep-link launcher; also documents the exact URL
/// each channel would receive on a mobile host.
pub struct IntentLogDispatcher {
    os_family: OsFamily,
}

impl IntentLogDispatcher {
    pub fn new(os_family: OsFamily) -> Self {
        Self { os_family }
    }
}

#[async_trait]
impl ChannelDispatcher for IntentLogDispatcher {
    async fn open_sms(&self, recipients: &str, body: &str) -> Result<(), DispatchError> {
        let url = sms_url(recipients, body, self.os_family);
        info!(url = %url, "intent_sms");
        Ok(())
    }

    async fn open_dialer(&self, number: &str) -> Result<(), DispatchError> {
        let url = tel_url(number);
        info!(url = %url, "intent_dial");
        Ok(())
    }

    async fn open_email(
        &self,
        recipients: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DispatchError> {
        let url = mailto_url(recipients, subject, body);
        info!(url = %url, "intent_email");
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), DispatchError> {
        info!(chars = %text.chars().count(), "intent_clipboard_write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_uri_component_set() {
        assert_eq!(encode_component("abc-_.!~*'()"), "abc-_.!~*'()");
        assert_eq!(encode_component("a b"), "a%20b");
        assert_eq!(encode_component("x&y=z"), "x%26y%3Dz");
        assert_eq!(encode_component("+91"), "%2B91");
    }

    #[test]
    fn test_sms_url_body_delimiter_by_platform() {
        assert_eq!(sms_url("+1;+2", "hi", OsFamily::Android), "sms:+1;+2?body=hi");
        assert_eq!(sms_url("+1,+2", "hi", OsFamily::Ios), "sms:+1,+2&body=hi");
        assert_eq!(sms_url("+1", "hi", OsFamily::Other), "sms:+1?body=hi");
    }

    #[test]
    fn test_mailto_url_uses_crlf_body() {
        let url = mailto_url("a@b.c", "Emergency Alert", "line1\nline2");
        assert_eq!(
            url,
            "mailto:?to=a%40b.c&subject=Emergency%20Alert&body=line1%0D%0Aline2"
        );
    }

    #[test]
    fn test_tel_url() {
        assert_eq!(tel_url("911"), "tel:911");
    }
}
