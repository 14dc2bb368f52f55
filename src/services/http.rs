use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::services::{
    AdminError, FileUpload, Record, ResourceService, ServiceResult, UploadReceipt,
};

/// REST client for the admin backend. Every request goes to
/// `<base>/api/<resource>` as configured by [`ApiConfig`].
#[derive(Clone)]
pub struct HttpService {
    client: Client,
    config: ApiConfig,
    token: Option<String>,
}

impl HttpService {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AdminError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AdminError::Network(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(AdminError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| AdminError::Decode(format!("{e}; body: {text}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let url = self.config.api_url(path);
        self.send(self.client.get(url)).await
    }

    async fn write_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        body: &Value,
    ) -> ServiceResult<T> {
        self.send(request.json(body)).await
    }
}

/// Accepts either a bare JSON array or an envelope such as `{"data": [...]}`.
pub fn extract_items(value: Value, resource: &str) -> ServiceResult<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            let key = resource.rsplit('/').next().unwrap_or(resource).to_string();
            match ["data", "items", key.as_str()]
                .iter()
                .find_map(|k| map.remove(*k))
            {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(AdminError::Decode(format!(
                        "no list found in {resource} response"
                    )))
                }
            }
        }
        Value::Null => Vec::new(),
        _ => {
            return Err(AdminError::Decode(format!(
                "unexpected {resource} response shape"
            )))
        }
    };
    items.into_iter().map(Record::from_value).collect()
}

fn extract_record(value: Value) -> ServiceResult<Record> {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            Record::from_value(map.remove("data").unwrap_or(Value::Null))
        }
        other => Record::from_value(other),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ResourceService for HttpService {
    async fn list(&self, resource: &str) -> ServiceResult<Vec<Record>> {
        let value: Value = self.get_json(resource).await?;
        extract_items(value, resource)
    }

    async fn create(&self, resource: &str, record: Record) -> ServiceResult<Record> {
        let url = self.config.api_url(resource);
        let value: Value = self
            .write_json(self.client.post(url), &record.into_value())
            .await?;
        extract_record(value)
    }

    async fn update(&self, resource: &str, id: &str, record: Record) -> ServiceResult<Record> {
        let url = self.config.api_url(&format!("{resource}/{id}"));
        let value: Value = self
            .write_json(self.client.put(url), &record.into_value())
            .await?;
        extract_record(value)
    }

    async fn patch(&self, resource: &str, id: &str, changes: Record) -> ServiceResult<Record> {
        let url = self.config.api_url(&format!("{resource}/{id}"));
        let value: Value = self
            .write_json(self.client.patch(url), &changes.into_value())
            .await?;
        extract_record(value)
    }

    async fn delete(&self, resource: &str, id: &str) -> ServiceResult<()> {
        let url = self.config.api_url(&format!("{resource}/{id}"));
        let _: Value = self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn action(&self, path: &str, body: Value) -> ServiceResult<Value> {
        let url = self.config.api_url(path);
        self.write_json(self.client.post(url), &body).await
    }

    async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(|e| AdminError::Validation(format!("invalid content type: {e}")))?;
        let form = multipart::Form::new().part("file", part);
        let url = self.config.api_url("upload");
        self.send(self.client.post(url).multipart(form)).await
    }
}
