//! HTTP data source talking to the cloud connector REST API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use super::{DataSource, FetchPath};
use crate::error::DataSourceError;

/// Data source resolving paths against `{api_url}/{path}`.
#[derive(Clone)]
pub struct CloudConnector {
    client: Client,
    api_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl CloudConnector {
    /// Build a connector for the given API root. The URL must be absolute.
    pub fn new(api_url: &str) -> Result<Self, url::ParseError> {
        url::Url::parse(api_url)?;
        Ok(Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    /// Send HTTP basic credentials with every request.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn url_for(&self, path: &FetchPath) -> String {
        format!("{}/{}", self.api_url, path.as_str())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_deref()),
            None => request,
        }
    }
}

async fn read_json(path: &FetchPath, response: Response) -> Result<serde_json::Value, DataSourceError> {
    let bytes = response.bytes().await.map_err(|source| DataSourceError::Http {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DataSourceError::Decode {
        path: path.to_string(),
        source,
    })
}

#[async_trait]
impl DataSource for CloudConnector {
    async fn fetch(&self, path: &FetchPath) -> Result<serde_json::Value, DataSourceError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let request = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("Access-Control-Request-Method", "GET");

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| DataSourceError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        read_json(path, response).await
    }

    async fn submit(
        &self,
        path: &FetchPath,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, DataSourceError> {
        let url = self.url_for(path);
        debug!("POST {}", url);

        let request = self.client.post(&url).form(form);
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| DataSourceError::Http {
                path: path.to_string(),
                source,
            })?;

        // Device errors (not connected, timeout) come back as JSON bodies on
        // 404/408 and belong in the response log like any other reply.
        let status = response.status();
        if !status.is_success() {
            warn!("POST {} answered with HTTP {}", url, status.as_u16());
        }

        read_json(path, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_double_slash() {
        let connector = CloudConnector::new("http://hub.local:9090/").unwrap();
        assert_eq!(
            connector.url_for(&FetchPath::new("devices")),
            "http://hub.local:9090/devices"
        );
    }

    #[test]
    fn rejects_relative_api_url() {
        assert!(CloudConnector::new("hub.local/api").is_err());
    }
}
