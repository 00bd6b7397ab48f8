//! REST client for the shipping backend.

use crate::config::{AuthConfig, TuiConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shipdesk_core::{
    ApiError, AwbResponse, BatchOutcome, ListRequest, ListResponse, Resource, ResourceApi,
    UploadFile,
};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// One reqwest client shared by every resource. Paths come from
/// `Resource::KIND`, so a single instance serves orders, returns and pickups.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        let base_url = Url::parse(config.api_base_url.trim_end_matches('/'))
            .map_err(|e| ApiClientError::Config(format!("api_base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiClientError::Config(format!(
                "api_base_url: {} cannot carry a path",
                base_url
            )));
        }
        Ok(Self {
            client,
            base_url,
            auth_header,
        })
    }

    /// Endpoint under the resource's base path. Each entry of `segments` is
    /// pushed as one percent-encoded path segment, so ids can never add
    /// segments, queries or fragments.
    fn url<R: Resource>(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(R::KIND.base_path().split('/').filter(|part| !part.is_empty()))
            .extend(segments);
        Ok(url)
    }

    async fn post_json<T, B>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(response).await
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(transport_error)?;
    if status.is_success() {
        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Malformed(e.to_string()))
    } else {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(ApiError::Application {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for RestClient {
    async fn list(&self, request: &ListRequest) -> Result<ListResponse<R::Row>, ApiError> {
        self.post_json(self.url::<R>(&["list"])?, request).await
    }

    async fn generate_awb(&self, id: &str) -> Result<AwbResponse, ApiError> {
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("AWB generation"));
        }
        self.post_empty(self.url::<R>(&[id, "awb"])?).await
    }

    async fn bulk_upload(&self, file: UploadFile) -> Result<BatchOutcome, ApiError> {
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("Bulk upload"));
        }
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.url::<R>(&["bulk-upload"])?)
            .headers(self.auth_header.clone())
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        parse_response(response).await
    }

    async fn manifest(&self, ids: &[String]) -> Result<BatchOutcome, ApiError> {
        if !R::KIND.supports_shipping() {
            return Err(ApiError::Unsupported("Manifest"));
        }
        let mut body = serde_json::Map::new();
        body.insert(R::KIND.id_field().to_string(), serde_json::json!(ids));
        self.post_json(self.url::<R>(&["manifest"])?, &body).await
    }
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use shipdesk_core::{ForwardOrders, PickupRequests};

    fn client(base: &str) -> RestClient {
        RestClient::new(&TuiConfig {
            api_base_url: base.to_string(),
            auth: AuthConfig {
                api_key: Some("key-1".to_string()),
                jwt: None,
            },
            request_timeout_ms: 1_000,
            tick_ms: 100,
            search_debounce_ms: 300,
            default_page_size: 20,
            log_path: "tmp/shipdesk.log".into(),
            log_filter: None,
            theme: ThemeConfig {
                name: "dispatch".to_string(),
            },
        })
        .unwrap()
    }

    #[test]
    fn awb_url_keeps_reserved_characters_inside_the_id_segment() {
        let client = client("http://api.test");

        let url = client.url::<ForwardOrders>(&["#1001", "awb"]).unwrap();
        assert_eq!(url.path(), "/orders/%231001/awb");
        assert_eq!(url.fragment(), None);

        let url = client.url::<ForwardOrders>(&["ORD/7?x=1", "awb"]).unwrap();
        assert_eq!(url.path(), "/orders/ORD%2F7%3Fx=1/awb");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn endpoints_extend_a_base_path() {
        let client = client("https://ship.example.com/api/v1/");
        let url = client.url::<PickupRequests>(&["list"]).unwrap();
        assert_eq!(url.as_str(), "https://ship.example.com/api/v1/pickup-requests/list");
    }

    #[test]
    fn auth_headers_include_both_credentials() {
        let headers = build_auth_headers(&AuthConfig {
            api_key: Some("key-1".to_string()),
            jwt: Some("token".to_string()),
        })
        .unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "key-1");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
    }

    #[test]
    fn auth_headers_reject_control_characters() {
        let result = build_auth_headers(&AuthConfig {
            api_key: Some("bad\nkey".to_string()),
            jwt: None,
        });
        assert!(matches!(result, Err(ApiClientError::Config(_))));
    }
}
