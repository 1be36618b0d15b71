//! Page ranges and chunks

use std::fmt;

/// Half-open, 0-based page interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageRange {
    /// First page (inclusive, 0-based)
    pub start: usize,

    /// One past the last page
    pub end: usize,
}

impl PageRange {
    /// Create a range; `start` must not exceed `end`
    pub fn new(start: usize, end: usize) -> Result<Self, String> {
        if start > end {
            return Err(format!("invalid page range: start {} > end {}", start, end));
        }
        Ok(Self { start, end })
    }

    /// Number of pages covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range covers no pages
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Partition `[0, page_count)` into contiguous windows of `window` pages.
    ///
    /// The last window may be shorter. Returns an empty vector when
    /// `page_count` is zero or `window` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::PageRange;
    ///
    /// let windows = PageRange::windows(20, 8);
    /// assert_eq!(windows.len(), 3);
    /// assert_eq!(windows[2], PageRange { start: 16, end: 20 });
    /// ```
    pub fn windows(page_count: usize, window: usize) -> Vec<PageRange> {
        if window == 0 {
            return Vec::new();
        }

        (0..page_count)
            .step_by(window)
            .map(|start| PageRange {
                start,
                end: usize::min(start + window, page_count),
            })
            .collect()
    }
}

impl fmt::Display for PageRange {
    /// Human-facing, 1-based inclusive form (e.g. `pages 9-16`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no pages");
        }
        write!(f, "pages {}-{}", self.start + 1, self.end)
    }
}

/// One unit of work handed to the retry scheduler
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the plan (0-based)
    pub index: usize,

    /// Pages covered, or `None` when the page count could not be determined
    /// and the whole document travels as a single chunk
    pub page_range: Option<PageRange>,

    /// Self-contained document fragment covering exactly `page_range`
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Size of the fragment in bytes
    pub fn byte_len(&self) -> usize {
        self.payload.len()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("index", &self.index)
            .field("page_range", &self.page_range)
            .field("payload_bytes", &self.payload.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_invalid_range_rejected() {
        assert!(PageRange::new(5, 3).is_err());
        assert!(PageRange::new(3, 3).unwrap().is_empty());
    }

    #[test]
    fn test_windows_exact_multiple() {
        let windows = PageRange::windows(16, 8);
        assert_eq!(
            windows,
            vec![PageRange { start: 0, end: 8 }, PageRange { start: 8, end: 16 }]
        );
    }

    #[test]
    fn test_windows_short_tail() {
        let windows = PageRange::windows(20, 8);
        assert_eq!(
            windows,
            vec![
                PageRange { start: 0, end: 8 },
                PageRange { start: 8, end: 16 },
                PageRange { start: 16, end: 20 },
            ]
        );
    }

    #[test]
    fn test_windows_degenerate_inputs() {
        assert!(PageRange::windows(0, 8).is_empty());
        assert!(PageRange::windows(10, 0).is_empty());
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(PageRange { start: 8, end: 16 }.to_string(), "pages 9-16");
        assert_eq!(PageRange { start: 4, end: 4 }.to_string(), "no pages");
    }

    #[test]
    fn test_chunk_debug_hides_payload() {
        let chunk = Chunk {
            index: 0,
            page_range: None,
            payload: vec![1, 2, 3],
        };
        let debug = format!("{:?}", chunk);
        assert!(debug.contains("payload_bytes: 3"));
    }

    proptest! {
        #[test]
        fn prop_windows_cover_every_page_once(page_count in 1usize..500, window in 1usize..64) {
            let windows = PageRange::windows(page_count, window);

            prop_assert!(!windows.is_empty());
            prop_assert_eq!(windows[0].start, 0);
            prop_assert_eq!(windows[windows.len() - 1].end, page_count);

            for pair in windows.windows(2) {
                // Contiguous and ordered: each window starts where the previous ended
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            for range in &windows {
                prop_assert!(!range.is_empty());
                prop_assert!(range.len() <= window);
            }

            let covered: usize = windows.iter().map(PageRange::len).sum();
            prop_assert_eq!(covered, page_count);
        }
    }
}
