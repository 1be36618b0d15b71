//! Round-robin credential pool

use crate::error::ExtractorError;
use quarry_domain::Credential;

/// Ordered, deduplicated, non-empty set of credentials with a rotation cursor
///
/// One pool belongs to one extraction run; concurrent runs each build their
/// own, so rotation state is never shared.
///
/// # Examples
///
/// ```
/// use quarry_extractor::CredentialPool;
///
/// let mut pool = CredentialPool::from_keys(["a", "b", "a", ""]).unwrap();
/// assert_eq!(pool.len(), 2);
/// assert_eq!(pool.current().expose(), "a");
/// pool.rotate();
/// assert_eq!(pool.current().expose(), "b");
/// pool.rotate();
/// assert_eq!(pool.current().expose(), "a");
/// ```
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    cursor: usize,
}

impl CredentialPool {
    /// Build a pool, dropping blank and repeated credentials
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` when no usable credential remains.
    pub fn new<I>(credentials: I) -> Result<Self, ExtractorError>
    where
        I: IntoIterator<Item = Credential>,
    {
        let mut unique: Vec<Credential> = Vec::new();
        for credential in credentials {
            if !credential.is_blank() && !unique.contains(&credential) {
                unique.push(credential);
            }
        }

        if unique.is_empty() {
            return Err(ExtractorError::Config(
                "No valid API keys found. Configure api_keys or the QUARRY_API_KEY variables"
                    .to_string(),
            ));
        }

        Ok(Self {
            credentials: unique,
            cursor: 0,
        })
    }

    /// Build a pool from raw key strings
    pub fn from_keys<I, S>(keys: I) -> Result<Self, ExtractorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(keys.into_iter().map(|key| Credential::new(key)))
    }

    /// Credential at the cursor
    pub fn current(&self) -> &Credential {
        &self.credentials[self.cursor]
    }

    /// Advance the cursor circularly
    pub fn rotate(&mut self) {
        self.cursor = (self.cursor + 1) % self.credentials.len();
    }

    /// Index of the current credential (0-based)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of credentials
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false: construction rejects empty pools
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Credentials in rotation order
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }
}
