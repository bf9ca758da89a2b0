//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with the configured User-Agent
//! - GET requests whose status the caller interprets (archive traversal)
//! - GET requests that require HTTP 200 and return the page text
//!
//! There is no retry logic: a failed request is reported once and dropped.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{Client, Response, StatusCode};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// The boards reject unknown agents, so every request made through this
/// client carries the configured browser User-Agent. Redirects follow the
/// reqwest default policy and no request timeout is set.
///
/// # Example
///
/// ```no_run
/// use bbs_harvest::config::HttpConfig;
/// use bbs_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues a GET request and returns the response whatever its status
///
/// # Returns
///
/// * `Ok(Response)` - The server answered; the body is released when the response drops
/// * `Err(FetchError::Request)` - Transport failure (DNS, connect, reset, ...)
pub async fn fetch(client: &Client, url: &Url) -> Result<Response, FetchError> {
    client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
}

/// Fetches a page that must answer HTTP 200 and returns its text
///
/// # Returns
///
/// * `Ok(String)` - The decoded body
/// * `Err(FetchError::Status)` - Any status other than 200
/// * `Err(FetchError)` - Transport or body read failure
pub async fn fetch_html(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = fetch(client, url).await?;
    read_html(url, response).await
}

/// Reads the text of a response already known to be a page
pub(crate) async fn read_html(url: &Url, response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}
