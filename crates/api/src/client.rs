//! `reqwest`-backed implementation of the remote service API.
//!
//! All non-binary requests use form-encoded bodies with Bearer
//! authentication; pre-signed part uploads go straight to the issued URL
//! with no credentials attached.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::service::{RemoteService, ServiceFuture};
use crate::types::{BagRegistration, BagSummary, Part, Robot, Session};
use crate::ApiError;

/// Production service host.
pub const DEFAULT_HOST: &str = "https://api.bagport.io";

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Deserialize)]
struct PartUrlsResponse {
    urls: Vec<String>,
}

/// HTTP client for the bagport service.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client against the production host.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_HOST)
    }

    /// Creates a client against a custom host (self-hosted deployments,
    /// tests).
    pub fn with_base_url(url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Logs in with account credentials, returning the session token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let resp = self
            .http
            .post(format!("{}/auth/login/", self.base_url))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;
        let session = check(resp).await?.json::<Session>().await?;
        debug!("logged in");
        Ok(session)
    }

    /// Lists the account's robots.
    pub async fn list_robots(&self, session: &Session) -> Result<Vec<Robot>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/robot/", self.base_url))
            .bearer_auth(session.access())
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Lists the bags already registered with the service.
    pub async fn list_bags(&self, session: &Session) -> Result<Vec<BagSummary>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/bag/", self.base_url))
            .bearer_auth(session.access())
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    /// Registers a bag, creating its record server-side.
    pub async fn register_bag(
        &self,
        session: &Session,
        registration: &BagRegistration,
    ) -> Result<(), ApiError> {
        let topics = serde_json::to_string(&registration.topics)?;
        let form: Vec<(&str, String)> = vec![
            ("bag_uuid", registration.bag_uuid.clone()),
            ("name", registration.name.clone()),
            ("robot_id", registration.robot_id.to_string()),
            ("size", registration.size.to_string()),
            ("start_time", registration.start_time.to_string()),
            ("end_time", registration.end_time.to_string()),
            ("metadata", registration.metadata.clone()),
            ("topics", topics),
        ];

        let resp = self
            .http
            .post(format!("{}/bag/", self.base_url))
            .bearer_auth(session.access())
            .form(&form)
            .send()
            .await?;
        check(resp).await?;
        debug!(bag = %registration.bag_uuid, "registered bag");
        Ok(())
    }
}

/// Classifies a response: 401/403 become auth errors, any other non-success
/// status becomes an API error carrying the body.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Auth {
            status: status.as_u16(),
        });
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        body,
    })
}

impl RemoteService for ApiClient {
    fn request_part_urls<'a>(
        &'a self,
        session: &'a Session,
        bag_uuid: &'a str,
    ) -> ServiceFuture<'a, Vec<String>> {
        Box::pin(async move {
            let resp = self
                .http
                .post(format!("{}/bag/{bag_uuid}/upload/", self.base_url))
                .bearer_auth(session.access())
                .form(&[("manual", "true")])
                .send()
                .await?;
            let urls = check(resp).await?.json::<PartUrlsResponse>().await?.urls;
            debug!(bag = %bag_uuid, urls = urls.len(), "received part destinations");
            Ok(urls)
        })
    }

    fn upload_part<'a>(&'a self, url: &'a str, body: Vec<u8>) -> ServiceFuture<'a, String> {
        Box::pin(async move {
            let resp = self.http.put(url).body(body).send().await?;
            let resp = check(resp).await?;
            let etag = resp
                .headers()
                .get("ETag")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ApiError::Protocol("part destination returned no ETag header".into())
                })?;
            Ok(etag.to_string())
        })
    }

    fn complete_upload<'a>(
        &'a self,
        session: &'a Session,
        bag_uuid: &'a str,
        parts: &'a [Part],
    ) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let parts_json = serde_json::to_string(parts)?;
            let resp = self
                .http
                .post(format!("{}/bag/{bag_uuid}/uploaded/", self.base_url))
                .bearer_auth(session.access())
                .form(&[("parts", parts_json.as_str())])
                .send()
                .await?;
            check(resp).await?;
            debug!(bag = %bag_uuid, parts = parts.len(), "marked uploaded");
            Ok(())
        })
    }

    fn refresh<'a>(&'a self, session: &'a Session) -> ServiceFuture<'a, Session> {
        Box::pin(async move {
            let resp = self
                .http
                .post(format!("{}/auth/refresh/", self.base_url))
                .form(&[("refresh", session.refresh_token())])
                .send()
                .await?;
            let access = check(resp).await?.json::<RefreshResponse>().await?.access;
            Ok(session.with_access(access))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::with_base_url("http://localhost:9000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn part_urls_response_parses() {
        let resp: PartUrlsResponse =
            serde_json::from_str(r#"{"urls": ["https://u/1", "https://u/2"]}"#).unwrap();
        assert_eq!(resp.urls.len(), 2);
    }

    #[test]
    fn refresh_response_parses() {
        let resp: RefreshResponse = serde_json::from_str(r#"{"access": "next"}"#).unwrap();
        assert_eq!(resp.access, "next");
    }
}
