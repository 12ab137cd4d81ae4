//! HTTP implementation of [`ContentApi`] against a legado-style web server.

use async_trait::async_trait;
use tracing::debug;

use super::{ApiError, ApiResponse, Book, BookProgress, Chapter, ContentApi};

/// Talks to a legado web service over HTTP.
///
/// The base address comes from configuration and must not carry a trailing
/// slash (config normalization guarantees this).
pub struct HttpContentApi {
    client: reqwest::Client,
    address: String,
}

impl HttpContentApi {
    pub fn new(address: impl Into<String>) -> Self {
        HttpContentApi {
            client: reqwest::Client::new(),
            address: address.into(),
        }
    }

    /// Swap client and address in one go, for bookshelf refreshes that name
    /// a different remote.
    pub fn with_client(client: reqwest::Client, address: impl Into<String>) -> Self {
        HttpContentApi {
            client,
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn fetch_bookshelf(&self) -> Result<Vec<Book>, ApiError> {
        let url = self.url("/getBookshelf");
        debug!(%url, "Fetching bookshelf");
        let response: ApiResponse<Vec<Book>> =
            self.client.get(&url).send().await?.json().await?;
        response.into_result()
    }

    async fn fetch_chapter_list(&self, book_url: &str) -> Result<Vec<Chapter>, ApiError> {
        let url = self.url("/getChapterList");
        debug!(%url, book_url, "Fetching chapter list");
        let response: ApiResponse<Vec<Chapter>> = self
            .client
            .get(&url)
            .query(&[("url", book_url)])
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    async fn fetch_chapter_content(
        &self,
        book_url: &str,
        index: usize,
    ) -> Result<String, ApiError> {
        let url = self.url("/getBookContent");
        debug!(%url, book_url, index, "Fetching chapter content");
        let response: ApiResponse<String> = self
            .client
            .get(&url)
            .query(&[("url", book_url.to_string()), ("index", index.to_string())])
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    async fn save_progress(&self, progress: BookProgress) -> Result<(), ApiError> {
        let url = self.url("/saveBookProgress");
        debug!(%url, index = progress.dur_chapter_index, "Saving reading progress");
        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(&url)
            .json(&progress)
            .send()
            .await?
            .json()
            .await?;
        // The server answers with the echoed progress; only failure matters.
        match response.into_result() {
            Ok(_) => Ok(()),
            Err(ApiError::MissingData) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
