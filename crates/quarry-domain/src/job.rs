//! Submitted extraction jobs

use std::fmt;

/// Unique identifier for a job based on UUIDv7
///
/// Sortable by submission time, which keeps log correlation simple when
/// several jobs share a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u128);

impl JobId {
    /// Generate a new UUIDv7-based JobId
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::JobId;
    ///
    /// let id = JobId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A caller-submitted document and the instruction describing what to extract.
///
/// Immutable once built; the page count is discovered later by the planner.
#[derive(Clone)]
pub struct Job {
    /// Identifier used to correlate log lines of one run
    pub id: JobId,

    /// Raw document bytes
    pub document: Vec<u8>,

    /// Extraction instruction sent with every chunk
    pub instruction: String,
}

impl Job {
    /// Create a job with a fresh identifier
    pub fn new(document: Vec<u8>, instruction: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            document,
            instruction: instruction.into(),
        }
    }

    /// Size of the submitted document in bytes
    pub fn byte_len(&self) -> usize {
        self.document.len()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("document_bytes", &self.document.len())
            .field("instruction", &self.instruction)
            .finish()
    }
}
