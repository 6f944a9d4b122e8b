//! Link press handling.
//!
//! Pressing a link runs through a fixed pipeline: normalize the href, ask
//! the host's link-press handler (which may answer asynchronously), check
//! the scheme against an allow-list and finally hand the href to a
//! [`LinkOpener`]. Every step reports through [`LinkOutcome`]; opener
//! failures are logged and never surface as errors.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{Error, Result};

/// Schemes an href may use to be opened externally.
pub const ALLOWED_SCHEMES: [&str; 5] = ["http", "https", "mailto", "tel", "sms"];

/// Answer of a link-press handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkVerdict {
    /// Continue with the default open behavior
    #[default]
    Allow,
    /// The host handled or rejected the press; do not open
    Deny,
}

impl From<bool> for LinkVerdict {
    fn from(allow: bool) -> Self {
        if allow {
            LinkVerdict::Allow
        } else {
            LinkVerdict::Deny
        }
    }
}

/// Future resolving to a [`LinkVerdict`].
pub type LinkFuture = Pin<Box<dyn Future<Output = LinkVerdict> + Send>>;

/// Host callback consulted before a link is opened.
pub type LinkPressHandler = Arc<dyn Fn(&str) -> LinkFuture + Send + Sync>;

/// Wrap a synchronous handler into a [`LinkPressHandler`].
pub fn link_handler<F, V>(handler: F) -> LinkPressHandler
where
    F: Fn(&str) -> V + Send + Sync + 'static,
    V: Into<LinkVerdict>,
{
    Arc::new(move |href: &str| {
        let verdict = handler(href).into();
        Box::pin(std::future::ready(verdict)) as LinkFuture
    })
}

/// Wrap an asynchronous handler into a [`LinkPressHandler`].
pub fn async_link_handler<F, Fut>(handler: F) -> LinkPressHandler
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LinkVerdict> + Send + 'static,
{
    Arc::new(move |href: &str| Box::pin(handler(href.to_string())) as LinkFuture)
}

/// Opens an href with the platform (browser, mail client, dialer, ...).
pub trait LinkOpener {
    /// Open `uri`.
    fn open(&self, uri: &str) -> Result<()>;
}

impl<F> LinkOpener for F
where
    F: Fn(&str) -> Result<()>,
{
    fn open(&self, uri: &str) -> Result<()> {
        self(uri)
    }
}

/// Result of pressing a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The opener accepted the href
    Opened,
    /// The href was empty after trimming
    Ignored,
    /// The link-press handler denied the press
    Denied,
    /// The scheme is not on the allow-list
    Blocked,
    /// The opener failed
    Failed(String),
}

/// Trim an href; `None` when nothing is left.
pub fn normalize_link_href(href: &str) -> Option<&str> {
    let href = href.trim();
    (!href.is_empty()).then_some(href)
}

fn scheme_regex() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| Regex::new(r"(?i)^([a-z][a-z0-9+.-]*):").expect("valid scheme pattern"))
}

/// Return the href when its explicit scheme is on the allow-list.
///
/// Relative paths and fragments have no scheme and are rejected.
pub fn allowed_external_href(href: &str) -> Option<&str> {
    let captures = scheme_regex().captures(href)?;
    let scheme = captures.get(1)?.as_str().to_ascii_lowercase();
    ALLOWED_SCHEMES
        .contains(&scheme.as_str())
        .then_some(href)
}

/// Run the link-press pipeline for `href`.
pub async fn press_link(
    href: &str,
    handler: Option<&LinkPressHandler>,
    opener: &dyn LinkOpener,
) -> LinkOutcome {
    let Some(href) = normalize_link_href(href) else {
        return LinkOutcome::Ignored;
    };

    if let Some(handler) = handler {
        if handler(href).await == LinkVerdict::Deny {
            log::debug!("Link press denied by handler: {}", href);
            return LinkOutcome::Denied;
        }
    }

    let Some(href) = allowed_external_href(href) else {
        log::debug!("Blocked link with disallowed scheme: {}", href);
        return LinkOutcome::Blocked;
    };

    match opener.open(href) {
        Ok(()) => LinkOutcome::Opened,
        Err(Error::LinkOpen { href, reason }) => {
            log::warn!("Failed to open link {}: {}", href, reason);
            LinkOutcome::Failed(reason)
        }
        Err(e) => {
            log::warn!("{}", Error::link_open(href, &e));
            LinkOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn test_normalize_link_href() {
        assert_eq!(normalize_link_href(""), None);
        assert_eq!(normalize_link_href("   "), None);
        assert_eq!(
            normalize_link_href("  https://example.com  "),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_allowed_schemes() {
        assert!(allowed_external_href("https://example.com").is_some());
        assert!(allowed_external_href("mailto:dev@example.com").is_some());
        assert_eq!(allowed_external_href("TEL:+123456789"), Some("TEL:+123456789"));
        assert!(allowed_external_href("sms:+1").is_some());
    }

    #[test]
    fn test_rejected_schemes() {
        assert!(allowed_external_href("javascript:alert(1)").is_none());
        assert!(allowed_external_href("file:///tmp/a").is_none());
        assert!(allowed_external_href("data:text/plain,abc").is_none());
        assert!(allowed_external_href("/internal/path").is_none());
        assert!(allowed_external_href("#local-anchor").is_none());
    }

    #[test]
    fn test_press_link_opens_allowed_href() {
        let opened = RefCell::new(Vec::new());
        let opener = |uri: &str| -> Result<()> {
            opened.borrow_mut().push(uri.to_string());
            Ok(())
        };

        let outcome = block_on(press_link(" https://example.com ", None, &opener));
        assert_eq!(outcome, LinkOutcome::Opened);
        assert_eq!(*opened.borrow(), vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_press_link_pipeline_stops_early() {
        let opener = |_: &str| -> Result<()> { panic!("opener must not run") };

        assert_eq!(block_on(press_link("  ", None, &opener)), LinkOutcome::Ignored);
        assert_eq!(
            block_on(press_link("javascript:alert(1)", None, &opener)),
            LinkOutcome::Blocked
        );

        let deny = link_handler(|_: &str| false);
        assert_eq!(
            block_on(press_link("https://example.com", Some(&deny), &opener)),
            LinkOutcome::Denied
        );
    }

    #[test]
    fn test_async_handler_allows() {
        let handler = async_link_handler(|href: String| async move {
            LinkVerdict::from(href.starts_with("https"))
        });
        let opener = |_: &str| -> Result<()> { Ok(()) };

        assert_eq!(
            block_on(press_link("https://a.dev", Some(&handler), &opener)),
            LinkOutcome::Opened
        );
        assert_eq!(
            block_on(press_link("http://a.dev", Some(&handler), &opener)),
            LinkOutcome::Denied
        );
    }

    #[test]
    fn test_open_failure_is_reported() {
        let opener = |_: &str| -> Result<()> { Err(Error::Other("no browser".into())) };
        let outcome = block_on(press_link("https://example.com", None, &opener));
        assert_eq!(outcome, LinkOutcome::Failed("no browser".to_string()));
    }

    #[test]
    fn test_link_open_error_keeps_reason() {
        let opener =
            |uri: &str| -> Result<()> { Err(Error::link_open(uri, "dialer unavailable")) };
        let outcome = block_on(press_link("tel:+123", None, &opener));
        assert_eq!(outcome, LinkOutcome::Failed("dialer unavailable".to_string()));
    }
}
