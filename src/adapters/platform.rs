use crate::domain::ports::{Dataset, KeyValueStore};
use crate::utils::error::{RelayError, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// 託管平台的 REST 儲存 API
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: Url,
    token: String,
    timeout: Option<Duration>,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| RelayError::InvalidConfigValueError {
            field: "storage.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            token: token.into(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RelayError::ConfigError {
                message: format!("storage.base_url cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .push("v2")
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<()> {
        let mut request = request.bearer_auth(&self.token);

        // 設定超時
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Storage response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::SinkError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub fn dataset(&self, dataset_id: impl Into<String>) -> PlatformDataset {
        PlatformDataset {
            client: self.clone(),
            dataset_id: dataset_id.into(),
        }
    }

    pub fn key_value_store(&self, store_id: impl Into<String>) -> PlatformKeyValueStore {
        PlatformKeyValueStore {
            client: self.clone(),
            store_id: store_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformDataset {
    client: PlatformClient,
    dataset_id: String,
}

impl Dataset for PlatformDataset {
    async fn push_data(&self, item: &Value) -> Result<()> {
        let url = self
            .client
            .endpoint(&["datasets", &self.dataset_id, "items"])?;
        tracing::debug!("POST {}", url);
        self.client
            .send(self.client.client.post(url).json(item))
            .await
    }
}

#[derive(Debug, Clone)]
pub struct PlatformKeyValueStore {
    client: PlatformClient,
    store_id: String,
}

impl KeyValueStore for PlatformKeyValueStore {
    async fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let url = self
            .client
            .endpoint(&["key-value-stores", &self.store_id, "records", key])?;
        tracing::debug!("PUT {}", url);
        self.client
            .send(self.client.client.put(url).json(value))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_building() {
        let client = PlatformClient::new("https://api.example.com/", "t").unwrap();
        let url = client
            .endpoint(&["key-value-stores", "default", "records", "Ascot_1.json"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v2/key-value-stores/default/records/Ascot_1.json"
        );

        let nested = PlatformClient::new("http://localhost:9000/proxy", "t").unwrap();
        assert_eq!(
            nested.endpoint(&["datasets", "d1", "items"]).unwrap().as_str(),
            "http://localhost:9000/proxy/v2/datasets/d1/items"
        );
    }

    #[tokio::test]
    async fn test_push_data_posts_json_with_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/datasets/races/items")
                .header("authorization", "Bearer secret")
                .json_body(json!({"race_id": 1}));
            then.status(201);
        });

        let client = PlatformClient::new(&server.base_url(), "secret").unwrap();
        client
            .dataset("races")
            .push_data(&json!({"race_id": 1}))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_set_value_puts_record() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v2/key-value-stores/default/records/OUTPUT")
                .json_body(json!([1, 2]));
            then.status(200);
        });

        let client = PlatformClient::new(&server.base_url(), "secret").unwrap();
        client
            .key_value_store("default")
            .set_value("OUTPUT", &json!([1, 2]))
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_rejected_request_becomes_sink_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v2/datasets/default/items");
            then.status(401).body("bad token");
        });

        let client = PlatformClient::new(&server.base_url(), "wrong").unwrap();
        let result = client.dataset("default").push_data(&json!({})).await;
        match result {
            Err(RelayError::SinkError { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad token");
            }
            other => panic!("expected SinkError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unresponsive_sink_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/v2/key-value-stores/default/records/OUTPUT");
            then.status(200).delay(Duration::from_secs(5));
        });

        let client = PlatformClient::new(&server.base_url(), "secret")
            .unwrap()
            .with_timeout(Some(Duration::from_millis(300)));
        let result = client
            .key_value_store("default")
            .set_value("OUTPUT", &json!({}))
            .await;

        match result {
            Err(RelayError::HttpError(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
