//! Values that cross the browser-session seam

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by a [`BrowserSession`](super::BrowserSession)
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("no element matches selector '{selector}'")]
    NotFound { selector: String },

    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("failed to launch browser session: {0}")]
    Launch(String),
}

impl SessionError {
    /// True for failures that only mean "the element isn't there (yet)".
    ///
    /// Field probes swallow these; anything else is logged first.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Timeout { .. })
    }

    pub(crate) fn not_found(selector: &str) -> Self {
        Self::NotFound {
            selector: selector.to_string(),
        }
    }
}

/// Text and requested attributes of one matched element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub text: String,
    pub attributes: HashMap<String, String>,
}

impl ElementSnapshot {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed text, or `None` when only whitespace was rendered
    #[must_use]
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// One browser cookie in a driver-neutral shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            secure: false,
            http_only: false,
        }
    }
}

/// Cookie set captured after login, shared read-only by every worker.
///
/// Cloning is a reference-count bump.
#[derive(Debug, Clone, Default)]
pub struct SessionCredential {
    cookies: Arc<[SessionCookie]>,
}

impl SessionCredential {
    /// Credential for runs without a login step
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_cookies(cookies: Vec<SessionCookie>) -> Self {
        Self {
            cookies: cookies.into(),
        }
    }

    #[must_use]
    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }
}
