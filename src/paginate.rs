//! Splitting long item listings into bounded message chunks.
//!
//! Telegram rejects messages above its size limit, so listings such as the
//! full tag catalogue are sent as several parts. Each part stays below a
//! threshold that leaves room for the header the caller prepends.

use crate::config::{MESSAGE_CHUNK_THRESHOLD, MESSAGE_HARD_LIMIT};
use crate::utils::truncate_str;
use std::borrow::Cow;

/// Separator placed between items of a chunk
pub const SEPARATOR: &str = ", ";

/// Length bounds for multi-part replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Absolute bound of a rendered message
    pub hard_limit: usize,
    /// Running-length threshold that closes a chunk
    pub chunk_threshold: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            hard_limit: MESSAGE_HARD_LIMIT,
            chunk_threshold: MESSAGE_CHUNK_THRESHOLD,
        }
    }
}

impl PageLimits {
    /// Threshold actually applied, never above the hard limit and never zero
    #[must_use]
    pub fn effective_threshold(&self) -> usize {
        self.chunk_threshold.min(self.hard_limit).max(1)
    }
}

/// Split `items` into chunks joined with [`SEPARATOR`].
///
/// Items keep the order they are given in. The running length of a chunk
/// counts every item plus one separator; when the next item would push it
/// past the threshold, the chunk is closed and the item starts a new one.
/// An item longer than the threshold on its own is cut down to it, so no
/// chunk ever exceeds the threshold.
///
/// # Examples
///
/// ```
/// use cataas_bot::paginate::{paginate, PageLimits};
///
/// let limits = PageLimits { hard_limit: 20, chunk_threshold: 10 };
/// let chunks = paginate(&["aaa", "bbb", "ccc"], limits);
/// assert_eq!(chunks, ["aaa, bbb", "ccc"]);
/// ```
#[must_use]
pub fn paginate<S: AsRef<str>>(items: &[S], limits: PageLimits) -> Vec<String> {
    let threshold = limits.effective_threshold();
    let separator_len = SEPARATOR.chars().count();

    let mut chunks = Vec::new();
    let mut current: Vec<Cow<'_, str>> = Vec::new();
    let mut current_len = 0;

    for item in items {
        let item = item.as_ref();
        let item: Cow<'_, str> = if item.chars().count() > threshold {
            Cow::Owned(truncate_str(item, threshold))
        } else {
            Cow::Borrowed(item)
        };
        let item_len = item.chars().count() + separator_len;

        if current_len + item_len > threshold && !current.is_empty() {
            chunks.push(current.join(SEPARATOR));
            current.clear();
            current_len = 0;
        }
        current.push(item);
        current_len += item_len;
    }

    if !current.is_empty() {
        chunks.push(current.join(SEPARATOR));
    }

    chunks
}
