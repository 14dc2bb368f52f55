use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::descriptor::{ResourceDescriptor, SourceKind};

pub mod http;

pub use http::HttpService;

pub type ServiceResult<T> = Result<T, AdminError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AdminError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, Default)]
pub struct DataBag {
    inner: HashMap<String, Value>,
}

impl DataBag {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.inner.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
    }

    pub fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }
}

/// View model a screen renders into; the CLI prints it and tests inspect it.
#[derive(Clone, Debug, Default)]
pub struct DashboardContext {
    pub route: String,
    pub operator: Option<String>,
    pub context: DataBag,
}

/// One row of any screen: a JSON object with typed accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> ServiceResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AdminError::Decode(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Looks up a field, following dots into nested objects (`customer.name`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => matches!(text.as_str(), "true" | "yes" | "on" | "1"),
            Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<String> {
        self.text("status")
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.0.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn merge(&mut self, changes: &Record) {
        for (key, value) in &changes.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = AdminError;

    fn try_from(value: Value) -> ServiceResult<Self> {
        Record::from_value(value)
    }
}

/// Builds records from literal mock rows, skipping anything that is not an object.
pub fn rows(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .filter_map(|value| Record::from_value(value).ok())
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestLogEntry {
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
}

/// Everything a screen can ask of its backend. Resource names are relative to
/// `/api/` (`orders`, `payment/methods`).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ResourceService {
    async fn list(&self, resource: &str) -> ServiceResult<Vec<Record>>;
    async fn create(&self, resource: &str, record: Record) -> ServiceResult<Record>;
    async fn update(&self, resource: &str, id: &str, record: Record) -> ServiceResult<Record>;
    async fn patch(&self, resource: &str, id: &str, changes: Record) -> ServiceResult<Record>;
    async fn delete(&self, resource: &str, id: &str) -> ServiceResult<()>;
    async fn action(&self, path: &str, body: Value) -> ServiceResult<Value>;
    async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt>;
}

pub fn ensure(condition: bool, error: AdminError) -> ServiceResult<()> {
    if condition {
        Ok(())
    } else {
        Err(error)
    }
}

#[derive(Default)]
struct InMemoryState {
    collections: HashMap<String, Vec<Record>>,
    next_id: u64,
    uploads: Vec<UploadReceipt>,
    requests: Vec<RequestLogEntry>,
    failing: HashSet<String>,
}

impl InMemoryState {
    fn log(&mut self, method: HttpMethod, path: String) {
        self.requests.push(RequestLogEntry { method, path });
    }

    fn check_available(&self, resource: &str) -> ServiceResult<()> {
        if self.failing.contains(resource) {
            return Err(AdminError::Status {
                status: 503,
                body: format!("{resource} is unavailable"),
            });
        }
        Ok(())
    }

    fn collection_mut(&mut self, resource: &str) -> ServiceResult<&mut Vec<Record>> {
        self.collections
            .get_mut(resource)
            .ok_or_else(|| AdminError::NotFound(resource.to_string()))
    }

    fn allocate_id(&mut self, resource: &str) -> String {
        self.next_id += 1;
        let prefix = resource
            .rsplit('/')
            .next()
            .unwrap_or(resource)
            .chars()
            .take(3)
            .collect::<String>();
        format!("{prefix}-{}", 1000 + self.next_id)
    }
}

/// Fixture-backed service. Serves the mock catalog to screens and backs the
/// mock API server; every call is recorded so tests can assert on traffic.
#[derive(Clone)]
pub struct InMemoryService {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState::default())),
        }
    }

    pub fn new_with_sample() -> Self {
        let service = Self::new();
        for descriptor in crate::screens::catalog() {
            if let Err(error) = service.seed(&descriptor.endpoint, descriptor.sample_rows()) {
                tracing::warn!(resource = %descriptor.endpoint, %error, "failed to seed sample rows");
            }
        }
        service
    }

    fn state(&self) -> ServiceResult<MutexGuard<'_, InMemoryState>> {
        self.state
            .lock()
            .map_err(|_| AdminError::Internal("in-memory state poisoned".into()))
    }

    pub fn seed(&self, resource: &str, records: Vec<Record>) -> ServiceResult<()> {
        let mut state = self.state()?;
        let mut seeded = Vec::with_capacity(records.len());
        for mut record in records {
            if record.id().is_none() {
                let id = state.allocate_id(resource);
                record.set("id", id);
            }
            seeded.push(record);
        }
        state.collections.insert(resource.to_string(), seeded);
        Ok(())
    }

    pub fn has_collection(&self, resource: &str) -> bool {
        self.state()
            .map(|state| state.collections.contains_key(resource))
            .unwrap_or(false)
    }

    pub fn resources(&self) -> Vec<String> {
        let mut names = self
            .state()
            .map(|state| state.collections.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Makes every call touching `resource` fail with a 503 until restored.
    pub fn fail_resource(&self, resource: &str) {
        if let Ok(mut state) = self.state() {
            state.failing.insert(resource.to_string());
        }
    }

    pub fn restore_resource(&self, resource: &str) {
        if let Ok(mut state) = self.state() {
            state.failing.remove(resource);
        }
    }

    pub fn requests(&self) -> Vec<RequestLogEntry> {
        self.state()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.state().map(|state| state.requests.len()).unwrap_or(0)
    }

    pub fn list_records(&self, resource: &str) -> ServiceResult<Vec<Record>> {
        let mut state = self.state()?;
        state.log(HttpMethod::Get, resource.to_string());
        state.check_available(resource)?;
        Ok(state.collections.get(resource).cloned().unwrap_or_default())
    }

    pub fn find_record(&self, resource: &str, id: &str) -> ServiceResult<Record> {
        let mut state = self.state()?;
        state.log(HttpMethod::Get, format!("{resource}/{id}"));
        state.check_available(resource)?;
        state
            .collections
            .get(resource)
            .and_then(|records| records.iter().find(|r| r.id().as_deref() == Some(id)))
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("{resource}/{id}")))
    }

    pub fn insert_record(&self, resource: &str, mut record: Record) -> ServiceResult<Record> {
        let mut state = self.state()?;
        state.log(HttpMethod::Post, resource.to_string());
        state.check_available(resource)?;
        if record.id().is_none() {
            let id = state.allocate_id(resource);
            record.set("id", id);
        }
        if !record.contains("created_at") {
            record.set("created_at", Utc::now().format("%Y-%m-%d %H:%M").to_string());
        }
        let records = state.collections.entry(resource.to_string()).or_default();
        if let Some(id) = record.id() {
            ensure(
                !records.iter().any(|r| r.id().as_deref() == Some(id.as_str())),
                AdminError::Validation(format!("duplicate id {id}")),
            )?;
        }
        records.push(record.clone());
        Ok(record)
    }

    pub fn replace_record(&self, resource: &str, id: &str, mut record: Record) -> ServiceResult<Record> {
        let mut state = self.state()?;
        state.log(HttpMethod::Put, format!("{resource}/{id}"));
        state.check_available(resource)?;
        record.set("id", id);
        let records = state.collection_mut(resource)?;
        let slot = records
            .iter_mut()
            .find(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("{resource}/{id}")))?;
        *slot = record.clone();
        Ok(record)
    }

    pub fn patch_record(&self, resource: &str, id: &str, changes: &Record) -> ServiceResult<Record> {
        let mut state = self.state()?;
        state.log(HttpMethod::Patch, format!("{resource}/{id}"));
        state.check_available(resource)?;
        let records = state.collection_mut(resource)?;
        let slot = records
            .iter_mut()
            .find(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("{resource}/{id}")))?;
        slot.merge(changes);
        slot.set("id", id);
        Ok(slot.clone())
    }

    /// Applies the same changes to several records of one collection.
    pub fn patch_many(&self, resource: &str, ids: &[String], changes: &Record) -> ServiceResult<Vec<Record>> {
        let mut state = self.state()?;
        state.log(HttpMethod::Patch, resource.to_string());
        state.check_available(resource)?;
        let records = state.collection_mut(resource)?;
        let mut updated = Vec::new();
        for record in records.iter_mut() {
            if record.id().map(|id| ids.contains(&id)).unwrap_or(false) {
                record.merge(changes);
                updated.push(record.clone());
            }
        }
        Ok(updated)
    }

    pub fn remove_record(&self, resource: &str, id: &str) -> ServiceResult<Record> {
        let mut state = self.state()?;
        state.log(HttpMethod::Delete, format!("{resource}/{id}"));
        state.check_available(resource)?;
        let records = state.collection_mut(resource)?;
        let index = records
            .iter()
            .position(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("{resource}/{id}")))?;
        Ok(records.remove(index))
    }

    pub fn store_upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
        let mut state = self.state()?;
        state.log(HttpMethod::Post, "upload".into());
        state.check_available("upload")?;
        ensure(
            !upload.bytes.is_empty(),
            AdminError::Validation("empty upload".into()),
        )?;
        let receipt = UploadReceipt {
            filename: format!(
                "{}-{}",
                Utc::now().timestamp_millis(),
                sanitize_filename(&upload.filename)
            ),
        };
        state.uploads.push(receipt.clone());
        Ok(receipt)
    }

    pub fn uploads(&self) -> Vec<UploadReceipt> {
        self.state()
            .map(|state| state.uploads.clone())
            .unwrap_or_default()
    }

    /// Custom POST endpoints that are not plain collection writes.
    pub fn perform_action(&self, path: &str, body: &Value) -> ServiceResult<Value> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["payment", "transactions", id, "refund"] => {
                let refunded = self.refund_transaction(id, body)?;
                Ok(refunded.into_value())
            }
            _ => {
                if let Ok(mut state) = self.state() {
                    state.log(HttpMethod::Post, path.to_string());
                }
                Err(AdminError::NotFound(path.to_string()))
            }
        }
    }

    fn refund_transaction(&self, id: &str, body: &Value) -> ServiceResult<Record> {
        const RESOURCE: &str = "payment/transactions";
        let mut state = self.state()?;
        state.log(HttpMethod::Post, format!("{RESOURCE}/{id}/refund"));
        state.check_available(RESOURCE)?;
        let records = state.collection_mut(RESOURCE)?;
        let transaction = records
            .iter_mut()
            .find(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| AdminError::NotFound(format!("{RESOURCE}/{id}")))?;

        let total = transaction.number("amount").unwrap_or(0.0);
        let already = transaction.number("refunded_amount").unwrap_or(0.0);
        ensure(
            transaction.status().as_deref() != Some("refunded"),
            AdminError::Validation("transaction already refunded".into()),
        )?;
        let requested = body
            .get("amount")
            .and_then(Value::as_f64)
            .unwrap_or(total - already);
        ensure(
            requested > 0.0 && requested + already <= total + f64::EPSILON,
            AdminError::Validation(format!("refund amount {requested:.2} exceeds {total:.2}")),
        )?;

        let refunded = already + requested;
        transaction.set("refunded_amount", (refunded * 100.0).round() / 100.0);
        transaction.set(
            "status",
            if (total - refunded).abs() < 0.005 {
                "refunded"
            } else {
                "partially_refunded"
            },
        );
        if let Some(reason) = body.get("reason").and_then(Value::as_str) {
            transaction.set("refund_reason", reason);
        }
        Ok(transaction.clone())
    }
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ResourceService for InMemoryService {
    async fn list(&self, resource: &str) -> ServiceResult<Vec<Record>> {
        self.list_records(resource)
    }

    async fn create(&self, resource: &str, record: Record) -> ServiceResult<Record> {
        self.insert_record(resource, record)
    }

    async fn update(&self, resource: &str, id: &str, record: Record) -> ServiceResult<Record> {
        self.replace_record(resource, id, record)
    }

    async fn patch(&self, resource: &str, id: &str, changes: Record) -> ServiceResult<Record> {
        self.patch_record(resource, id, &changes)
    }

    async fn delete(&self, resource: &str, id: &str) -> ServiceResult<()> {
        self.remove_record(resource, id).map(|_| ())
    }

    async fn action(&self, path: &str, body: Value) -> ServiceResult<Value> {
        self.perform_action(path, &body)
    }

    async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
        self.store_upload(upload)
    }
}

/// Screens pick their backing store at runtime: mock screens stay local,
/// everything else goes over HTTP.
#[derive(Clone)]
pub enum DataSource {
    Remote(HttpService),
    Local(InMemoryService),
}

impl DataSource {
    /// Mock screens always read `local`; remote screens use `remote` when a
    /// backend is configured and fall back to `local` otherwise.
    pub fn for_screen(
        descriptor: &ResourceDescriptor,
        remote: Option<&HttpService>,
        local: &InMemoryService,
    ) -> Self {
        match (descriptor.source, remote) {
            (SourceKind::Remote, Some(remote)) => DataSource::Remote(remote.clone()),
            _ => DataSource::Local(local.clone()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Remote(_))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ResourceService for DataSource {
    async fn list(&self, resource: &str) -> ServiceResult<Vec<Record>> {
        match self {
            DataSource::Remote(service) => service.list(resource).await,
            DataSource::Local(service) => service.list(resource).await,
        }
    }

    async fn create(&self, resource: &str, record: Record) -> ServiceResult<Record> {
        match self {
            DataSource::Remote(service) => service.create(resource, record).await,
            DataSource::Local(service) => service.create(resource, record).await,
        }
    }

    async fn update(&self, resource: &str, id: &str, record: Record) -> ServiceResult<Record> {
        match self {
            DataSource::Remote(service) => service.update(resource, id, record).await,
            DataSource::Local(service) => service.update(resource, id, record).await,
        }
    }

    async fn patch(&self, resource: &str, id: &str, changes: Record) -> ServiceResult<Record> {
        match self {
            DataSource::Remote(service) => service.patch(resource, id, changes).await,
            DataSource::Local(service) => service.patch(resource, id, changes).await,
        }
    }

    async fn delete(&self, resource: &str, id: &str) -> ServiceResult<()> {
        match self {
            DataSource::Remote(service) => service.delete(resource, id).await,
            DataSource::Local(service) => service.delete(resource, id).await,
        }
    }

    async fn action(&self, path: &str, body: Value) -> ServiceResult<Value> {
        match self {
            DataSource::Remote(service) => service.action(path, body).await,
            DataSource::Local(service) => service.action(path, body).await,
        }
    }

    async fn upload(&self, upload: FileUpload) -> ServiceResult<UploadReceipt> {
        match self {
            DataSource::Remote(service) => service.upload(upload).await,
            DataSource::Local(service) => service.upload(upload).await,
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "upload.bin".into()
    } else {
        cleaned
    }
}
