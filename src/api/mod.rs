//! Remote content API contract.
//!
//! The core treats the content server as a black box behind [`ContentApi`]:
//! fetch the bookshelf, fetch a chapter list, fetch chapter text, save
//! reading progress. DTO field names follow the legado web API wire format
//! (camelCase JSON). [`HttpContentApi`] is the production implementation;
//! tests substitute their own.

mod http;

pub use http::HttpContentApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A book as listed on the remote bookshelf.
///
/// Only the fields this core reads are modeled; the server sends more.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub name: String,
    pub author: String,
    pub book_url: String,
    pub cover_url: Option<String>,
    pub intro: Option<String>,
    pub kind: Option<String>,
    /// Chapter index the server last saw the user at.
    pub dur_chapter_index: usize,
    /// In-chapter cursor position the server last saw.
    pub dur_chapter_pos: usize,
    pub dur_chapter_title: Option<String>,
    pub latest_chapter_title: Option<String>,
    pub origin: Option<String>,
    pub origin_name: Option<String>,
    pub total_chapter_num: usize,
    pub word_count: Option<String>,
}

/// One entry of a book's table of contents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub url: Option<String>,
    pub book_url: Option<String>,
    pub is_volume: bool,
}

impl Chapter {
    /// Placeholder for a chapter whose metadata has not been fetched yet.
    /// Used by loading events that only know the target index.
    pub fn placeholder(index: usize) -> Self {
        Chapter {
            index,
            ..Chapter::default()
        }
    }
}

/// Progress payload for `saveBookProgress`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookProgress {
    pub name: String,
    pub author: String,
    pub url: String,
    pub index: usize,
    pub dur_chapter_index: usize,
    pub dur_chapter_title: String,
    pub dur_chapter_pos: usize,
    /// Milliseconds since the epoch, as the server expects.
    pub dur_chapter_time: i64,
}

/// Response envelope every legado endpoint wraps its payload in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error_msg: Option<String>,
    pub is_success: Option<bool>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope, turning server-reported failures into errors.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.is_success == Some(false) {
            return Err(ApiError::Remote(
                self.error_msg
                    .unwrap_or_else(|| "remote api reported failure".to_string()),
            ));
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote api error: {0}")]
    Remote(String),
    #[error("malformed api response: missing data field")]
    MissingData,
}

/// The consumed collaborator contract: everything the core needs from the
/// content server. All four calls may fail with a generic [`ApiError`];
/// handlers treat any failure uniformly.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// List the books on the remote bookshelf.
    async fn fetch_bookshelf(&self) -> Result<Vec<Book>, ApiError>;

    /// Fetch the full chapter list of a book.
    async fn fetch_chapter_list(&self, book_url: &str) -> Result<Vec<Chapter>, ApiError>;

    /// Fetch the text of one chapter.
    async fn fetch_chapter_content(&self, book_url: &str, index: usize)
    -> Result<String, ApiError>;

    /// Push reading progress back to the server. Best-effort telemetry.
    async fn save_progress(&self, progress: BookProgress) -> Result<(), ApiError>;
}
