use std::sync::Mutex;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RANGE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::models::page::{PageRequest, Paginated};

/// Thin client over the hosted backend's REST surface (`/auth/v1`,
/// `/rest/v1`, `/storage/v1`). Every failure is mapped into `ServiceError`
/// here; callers never see transport or status types.
pub struct BackendClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
    access_token: Mutex<Option<String>>,
}

impl BackendClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            access_token: Mutex::new(None),
        }
    }

    /// Requests carry the user token once signed in, the anon key otherwise.
    pub fn set_access_token(&self, token: Option<String>) {
        let mut guard = self
            .access_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = token;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn headers(&self) -> HeaderMap {
        let token = self
            .access_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .unwrap_or_else(|| self.api_key.clone());

        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn check(&self, response: Response, resource: &str) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, &body, resource))
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<R> {
        let response = self
            .http
            .get(self.url(path))
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path)
            .await?
            .json()
            .await
            .map_err(map_transport)
    }

    /// Paged select against `/rest/v1/<table>` using a `Range` header and an
    /// exact count, as the backend's REST layer expects.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        page: PageRequest,
    ) -> ServiceResult<Paginated<T>> {
        let page_number = page.page.max(1);
        let page_size = page.page_size.max(1);
        let start = (page_number - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size - 1);

        let path = format!("rest/v1/{table}");
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend_from_slice(filters);

        let mut headers = self.headers();
        if let Ok(value) = HeaderValue::from_str(&format!("{start}-{end}")) {
            headers.insert(RANGE, value);
        }
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self
            .http
            .get(self.url(&path))
            .headers(headers)
            .query(&query)
            .send()
            .await
            .map_err(map_transport)?;
        let response = self.check(response, &path).await?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .unwrap_or(0);
        let data: Vec<T> = response.json().await.map_err(map_transport)?;

        Ok(Paginated {
            data,
            total,
            page: page_number,
            page_size,
            has_more: page_number.saturating_mul(page_size) < total,
        })
    }

    /// Single-row select; an empty result set is `not_found`.
    pub async fn get_row<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        resource: &str,
    ) -> ServiceResult<T> {
        self.get_optional_row(table, filters)
            .await?
            .ok_or_else(|| ServiceError::NotFound(resource.to_string()))
    }

    pub async fn get_optional_row<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> ServiceResult<Option<T>> {
        let path = format!("rest/v1/{table}");
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ];
        query.extend_from_slice(filters);

        let mut rows: Vec<T> = self.get_json(&path, &query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<R> {
        let response = self
            .http
            .post(self.url(path))
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path)
            .await?
            .json()
            .await
            .map_err(map_transport)
    }

    /// Like `post_json`, but 400/401 rejections map to
    /// `invalid_credentials`. Transport failures and server errors stay
    /// `unknown` so an outage is never reported as a wrong password.
    pub async fn post_auth<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<R> {
        let response = self
            .http
            .post(self.url(path))
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(map_transport);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_auth_status(status, &body, path))
    }

    pub async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> ServiceResult<()> {
        let response = self
            .http
            .post(self.url(path))
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path).await.map(|_| ())
    }

    pub async fn put_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<R> {
        let response = self
            .http
            .put(self.url(path))
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path)
            .await?
            .json()
            .await
            .map_err(map_transport)
    }

    /// Upsert into `/rest/v1/<table>`, returning the stored representation.
    pub async fn upsert<B: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> ServiceResult<R> {
        let path = format!("rest/v1/{table}");
        let mut headers = self.headers();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let response = self
            .http
            .post(self.url(&path))
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        let mut rows: Vec<R> = self
            .check(response, &path)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        if rows.is_empty() {
            return Err(ServiceError::Unknown(format!(
                "upsert into {table} returned no rows"
            )));
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn delete(&self, path: &str) -> ServiceResult<()> {
        let response = self
            .http
            .delete(self.url(path))
            .headers(self.headers())
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path).await.map(|_| ())
    }

    pub async fn get_bytes(&self, path: &str) -> ServiceResult<Vec<u8>> {
        let response = self
            .http
            .get(self.url(path))
            .headers(self.headers())
            .send()
            .await
            .map_err(map_transport)?;
        let bytes = self
            .check(response, path)
            .await?
            .bytes()
            .await
            .map_err(map_transport)?;
        Ok(bytes.to_vec())
    }

    pub async fn post_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> ServiceResult<()> {
        let mut headers = self.headers();
        if let Some(ct) = content_type {
            if let Ok(value) = HeaderValue::from_str(ct) {
                headers.insert(CONTENT_TYPE, value);
            }
        }
        headers.insert("x-upsert", HeaderValue::from_static("true"));

        let response = self
            .http
            .post(self.url(path))
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport)?;
        self.check(response, path).await.map(|_| ())
    }
}

fn map_transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Unknown(format!("backend request failed: {err}"))
}

fn map_status(status: StatusCode, body: &str, resource: &str) -> ServiceError {
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(resource.to_string()),
        StatusCode::NOT_IMPLEMENTED => ServiceError::NotImplemented(resource.to_string()),
        _ => ServiceError::Unknown(format!("backend returned {status}: {body}")),
    }
}

/// Status mapping for the auth endpoints: only an explicit rejection of the
/// submitted credentials reads as `invalid_credentials`.
fn map_auth_status(status: StatusCode, body: &str, resource: &str) -> ServiceError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => ServiceError::InvalidCredentials,
        _ => map_status(status, body, resource),
    }
}

/// `content-range: 0-19/45` -> 45
fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = BackendClient::new("https://api.bhakti.app/", "anon-key");
        assert_eq!(
            client.url("/rest/v1/books"),
            "https://api.bhakti.app/rest/v1/books"
        );
    }

    #[test]
    fn test_map_status_taxonomy() {
        assert_eq!(
            map_status(StatusCode::NOT_FOUND, "", "rest/v1/books").code(),
            "not_found"
        );
        assert_eq!(
            map_status(StatusCode::NOT_IMPLEMENTED, "", "rest/v1/reels").code(),
            "not_implemented"
        );
        assert_eq!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", "x").code(),
            "unknown"
        );
    }

    #[test]
    fn test_auth_status_only_rejections_read_as_invalid_credentials() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED] {
            assert_eq!(
                map_auth_status(status, "invalid login", "auth/v1/token"),
                ServiceError::InvalidCredentials
            );
        }

        // a backend outage must not look like a wrong password
        assert_eq!(
            map_auth_status(StatusCode::INTERNAL_SERVER_ERROR, "boom", "auth/v1/token").code(),
            "unknown"
        );
        assert_eq!(
            map_auth_status(StatusCode::NOT_FOUND, "", "auth/v1/token").code(),
            "not_found"
        );
    }

    #[tokio::test]
    async fn test_transport_failures_read_as_unknown() {
        // nothing listens on port 1, so the connection is refused
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/none")
            .send()
            .await
            .unwrap_err();
        assert_eq!(map_transport(err).code(), "unknown");
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-19/45"), Some(45));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_headers_prefer_user_token_over_anon_key() {
        let client = BackendClient::new("https://api.bhakti.app", "anon-key");

        let anon = client.headers();
        assert_eq!(anon[AUTHORIZATION], "Bearer anon-key");

        client.set_access_token(Some("user-token".to_string()));
        let signed_in = client.headers();
        assert_eq!(signed_in[AUTHORIZATION], "Bearer user-token");
        assert_eq!(signed_in["apikey"], "anon-key");
    }
}
