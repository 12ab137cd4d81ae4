//! Chapter pagination.
//!
//! Text is sliced into fixed-capacity pages measured in UTF-16 code units,
//! because that is the unit the remote progress API counts in. A character
//! is never split across pages: a supplementary-plane character (two UTF-16
//! units) moves to the next page whole if it does not fit. Every page holds
//! at least one character, so pagination always terminates and the pages
//! concatenate back to the source text exactly.

use tracing::debug;

pub const DEFAULT_PAGE_SIZE: usize = 600;

/// One page of chapter text. `start` and `end` are UTF-16 code-unit offsets
/// into the source, half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub content: String,
}

/// Slices chapter text into pages and tracks a cursor through them.
///
/// Navigation past either end returns `None` and leaves the cursor where it
/// was; callers use that signal to chain into chapter navigation.
pub struct Paginator {
    pages: Vec<Page>,
    cursor: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Paginator {
            pages: Vec::new(),
            cursor: 0,
            page_size: page_size.max(1),
        }
    }

    /// Re-slice `text` into pages and reset the cursor to the first page.
    /// Empty text yields zero pages.
    pub fn paginate(&mut self, text: &str) {
        self.pages.clear();
        self.cursor = 0;

        let mut content = String::new();
        let mut start = 0usize;
        let mut offset = 0usize;
        let mut width = 0usize;

        for ch in text.chars() {
            let units = ch.len_utf16();
            if width > 0 && width + units > self.page_size {
                self.push_page(start, offset, std::mem::take(&mut content));
                start = offset;
                width = 0;
            }
            content.push(ch);
            offset += units;
            width += units;
        }
        if !content.is_empty() {
            self.push_page(start, offset, content);
        }

        debug!(
            pages = self.pages.len(),
            page_size = self.page_size,
            units = offset,
            "Chapter paginated"
        );
    }

    fn push_page(&mut self, start: usize, end: usize, content: String) {
        let index = self.pages.len();
        self.pages.push(Page {
            index,
            start,
            end,
            content,
        });
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.cursor)
    }

    pub fn next_page(&mut self) -> Option<&Page> {
        if self.cursor + 1 < self.pages.len() {
            self.cursor += 1;
            self.pages.get(self.cursor)
        } else {
            None
        }
    }

    pub fn previous_page(&mut self) -> Option<&Page> {
        if self.cursor > 0 && !self.pages.is_empty() {
            self.cursor -= 1;
            self.pages.get(self.cursor)
        } else {
            None
        }
    }

    /// Jump to a page by 0-based index; out of range is refused.
    pub fn go_to_page(&mut self, index: usize) -> Option<&Page> {
        if index < self.pages.len() {
            self.cursor = index;
            self.pages.get(self.cursor)
        } else {
            None
        }
    }

    pub fn go_to_first_page(&mut self) -> Option<&Page> {
        self.go_to_page(0)
    }

    pub fn go_to_last_page(&mut self) -> Option<&Page> {
        if self.pages.is_empty() {
            None
        } else {
            self.go_to_page(self.pages.len() - 1)
        }
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// 0-based cursor position.
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn is_first_page(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.pages.is_empty() || self.cursor + 1 >= self.pages.len()
    }

    /// Drop all pages, e.g. when the session ends.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.cursor = 0;
    }

    /// Takes effect on the next `paginate` call.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
