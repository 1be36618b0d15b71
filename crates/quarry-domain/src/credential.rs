//! Backend credentials

use std::fmt;

/// An API key (or other secret) authorizing one extraction call.
///
/// The secret never appears in `Debug` output, so credentials can travel
/// through logged structures without leaking.
///
/// # Examples
///
/// ```
/// use quarry_domain::Credential;
///
/// let key = Credential::new("AIza-secret");
/// assert_eq!(key.expose(), "AIza-secret");
/// assert!(!format!("{:?}", key).contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the raw secret for use in an outgoing request
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the secret is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted, {} chars>)", self.0.len())
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}
