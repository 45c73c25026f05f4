//! WordPress REST API client.
//!
//! Sync HTTP client for the `wp/v2` namespace using application-password
//! Basic authentication.

mod media;
mod posts;
mod terms;

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::error::WordPressError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// RFC 3986 unreserved characters: A-Z a-z 0-9 - . _ ~
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// WordPress REST API client.
pub struct WordPressClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl WordPressClient {
    /// Create a client for `base_url` with application-password credentials.
    #[must_use]
    pub fn new(base_url: &str, username: &str, app_password: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let token = STANDARD.encode(format!("{username}:{app_password}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {token}"),
        }
    }

    /// Verify the credentials by fetching the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`WordPressError::HttpResponse`] when the server rejects the
    /// credentials, or a transport error when it is unreachable.
    pub fn test_connection(&self) -> Result<(), WordPressError> {
        let url = format!("{}/users/me", self.api_url());
        let _: serde_json::Value = self.get_json(&url)?;
        Ok(())
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/wp-json/wp/v2", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WordPressError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;
        read_response(response)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, WordPressError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        read_response(response)
    }
}

/// Check the status and decode the JSON body.
fn read_response<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, WordPressError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_string());
        return Err(WordPressError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}

/// Percent-encode a query parameter value per RFC 3986.
fn encode_query(value: &str) -> String {
    percent_encode(value.as_bytes(), QUERY_ENCODE_SET).to_string()
}
