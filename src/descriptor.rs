use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::format;
use crate::metrics::MetricSpec;
use crate::services::Record;
use crate::status::{StatusPalette, Tone};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Currency,
    Percent,
    Status,
    Tags,
    Secret,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(key: &str, label: &str, kind: ColumnKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, ColumnKind::Text)
    }

    pub fn render(&self, record: &Record) -> String {
        match self.kind {
            ColumnKind::Text | ColumnKind::Tags => {
                format::or_placeholder(record.text(&self.key).as_deref())
            }
            ColumnKind::Integer => record
                .number(&self.key)
                .map(format::integer)
                .unwrap_or_else(|| format::PLACEHOLDER.into()),
            ColumnKind::Currency => record
                .number(&self.key)
                .map(format::currency)
                .unwrap_or_else(|| format::PLACEHOLDER.into()),
            ColumnKind::Percent => record
                .number(&self.key)
                .map(format::percent)
                .unwrap_or_else(|| format::PLACEHOLDER.into()),
            ColumnKind::Status => record
                .text(&self.key)
                .map(|s| format::title_case(&s))
                .unwrap_or_else(|| format::PLACEHOLDER.into()),
            ColumnKind::Secret => record
                .text(&self.key)
                .map(|s| format::mask_secret(&s))
                .unwrap_or_else(|| format::PLACEHOLDER.into()),
            ColumnKind::Flag => {
                if record.flag(&self.key) {
                    "Yes".into()
                } else {
                    "No".into()
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TabFilter {
    All,
    FieldIn { field: String, values: Vec<String> },
    Flag { field: String, expected: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabSpec {
    pub key: String,
    pub label: String,
    pub filter: TabFilter,
}

impl TabSpec {
    pub fn all(label: &str) -> Self {
        Self {
            key: "all".into(),
            label: label.into(),
            filter: TabFilter::All,
        }
    }

    pub fn field_in(key: &str, label: &str, field: &str, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            filter: TabFilter::FieldIn {
                field: field.into(),
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        }
    }

    /// Shorthand for a tab showing one status value.
    pub fn status(value: &str) -> Self {
        Self::field_in(value, &format::title_case(value), "status", &[value])
    }

    pub fn flag(key: &str, label: &str, field: &str, expected: bool) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            filter: TabFilter::Flag {
                field: field.into(),
                expected,
            },
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match &self.filter {
            TabFilter::All => true,
            TabFilter::FieldIn { field, values } => record
                .text(field)
                .map(|actual| values.iter().any(|v| v.eq_ignore_ascii_case(&actual)))
                .unwrap_or(false),
            TabFilter::Flag { field, expected } => record.flag(field) == *expected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    Text,
    TextArea,
    Email,
    Url,
    Phone,
    Number,
    Password,
    Toggle,
    Date,
    Select { options: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub input: InputKind,
    pub required: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn new(key: &str, label: &str, input: InputKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            input,
            required: false,
            sensitive: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value<T: Into<Value>>(mut self, value: T) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self::new(
            key,
            label,
            InputKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    /// Checks one draft value; `None` when the field is acceptable.
    pub fn check(&self, draft: &Record) -> Option<String> {
        lazy_static! {
            static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
            static ref URL: Regex = Regex::new(r"^https?://[^\s]+$").unwrap();
            static ref PHONE: Regex = Regex::new(r"^\+?[0-9 ()-]{7,}$").unwrap();
        }

        let raw = draft.text(&self.key).unwrap_or_default();
        let value = raw.trim();
        if value.is_empty() {
            return match (&self.input, self.required) {
                (InputKind::Toggle, _) => None,
                (_, true) => Some(format!("{} is required", self.label)),
                _ => None,
            };
        }
        match &self.input {
            InputKind::Email if !EMAIL.is_match(value) => {
                Some(format!("{} must be an email address", self.label))
            }
            InputKind::Url if !URL.is_match(value) => {
                Some(format!("{} must start with http:// or https://", self.label))
            }
            InputKind::Phone if !PHONE.is_match(value) => {
                Some(format!("{} must be a phone number", self.label))
            }
            InputKind::Number if value.parse::<f64>().is_err() => {
                Some(format!("{} must be a number", self.label))
            }
            InputKind::Select { options }
                if !options.iter().any(|o| o.eq_ignore_ascii_case(value)) =>
            {
                Some(format!("{} must be one of {}", self.label, options.join(", ")))
            }
            _ => None,
        }
    }
}

pub type FieldErrors = BTreeMap<String, String>;

pub fn validate_draft(fields: &[FieldDescriptor], draft: &Record) -> FieldErrors {
    fields
        .iter()
        .filter_map(|field| field.check(draft).map(|message| (field.key.clone(), message)))
        .collect()
}

/// How a screen reconciles local items after a successful write. A resource
/// uses exactly one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    Patch,
    Refetch,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Remote,
    Mock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusToggle {
    pub field: String,
    pub on: Value,
    pub off: Value,
}

impl StatusToggle {
    pub fn new<T: Into<Value>>(field: &str, on: T, off: T) -> Self {
        Self {
            field: field.into(),
            on: on.into(),
            off: off.into(),
        }
    }

    pub fn next_value(&self, record: &Record) -> Value {
        match record.get(&self.field) {
            Some(current) if *current == self.on => self.off.clone(),
            _ => self.on.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ResourceDescriptor {
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub endpoint: String,
    pub source: SourceKind,
    pub sync: SyncStrategy,
    pub title_field: String,
    pub status_field: String,
    pub columns: Vec<Column>,
    pub tabs: Vec<TabSpec>,
    pub metrics: Vec<MetricSpec>,
    pub fields: Vec<FieldDescriptor>,
    pub search_fields: Vec<String>,
    pub palette: StatusPalette,
    pub toggle: Option<StatusToggle>,
    sample: fn() -> Vec<Record>,
}

fn no_rows() -> Vec<Record> {
    Vec::new()
}

impl ResourceDescriptor {
    pub fn new(key: &str, title: &str, endpoint: &str) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            subtitle: String::new(),
            endpoint: endpoint.into(),
            source: SourceKind::Remote,
            sync: SyncStrategy::Patch,
            title_field: "name".into(),
            status_field: "status".into(),
            columns: Vec::new(),
            tabs: vec![TabSpec::all("All")],
            metrics: Vec::new(),
            fields: Vec::new(),
            search_fields: vec!["name".into()],
            palette: StatusPalette::default(),
            toggle: None,
            sample: no_rows,
        }
    }

    pub fn subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn mock(mut self, sample: fn() -> Vec<Record>) -> Self {
        self.source = SourceKind::Mock;
        self.sample = sample;
        self
    }

    /// Remote screen whose sample rows seed the mock backend.
    pub fn sample(mut self, sample: fn() -> Vec<Record>) -> Self {
        self.sample = sample;
        self
    }

    pub fn refetch(mut self) -> Self {
        self.sync = SyncStrategy::Refetch;
        self
    }

    pub fn title_field(mut self, field: &str) -> Self {
        self.title_field = field.into();
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// The "All" tab is always first; `tabs` are appended after it.
    pub fn tabs(mut self, tabs: Vec<TabSpec>) -> Self {
        self.tabs.truncate(1);
        self.tabs.extend(tabs);
        self
    }

    pub fn metrics(mut self, metrics: Vec<MetricSpec>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    pub fn search(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn palette(mut self, palette: StatusPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn toggle(mut self, toggle: StatusToggle) -> Self {
        self.toggle = Some(toggle);
        self
    }

    pub fn sample_rows(&self) -> Vec<Record> {
        (self.sample)()
    }

    pub fn tab(&self, key: &str) -> Option<&TabSpec> {
        self.tabs.iter().find(|tab| tab.key == key)
    }

    pub fn default_tab(&self) -> String {
        self.tabs
            .first()
            .map(|tab| tab.key.clone())
            .unwrap_or_else(|| "all".into())
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn tone_for(&self, record: &Record) -> Tone {
        record
            .text(&self.status_field)
            .map(|status| self.palette.tone_for(&status))
            .unwrap_or(Tone::Neutral)
    }

    pub fn matches_search(&self, record: &Record, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields.iter().any(|field| {
            record
                .text(field)
                .map(|value| value.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }

    /// Empty draft for the create modal, pre-filled with field defaults.
    pub fn blank_draft(&self) -> Record {
        let mut draft = Record::new();
        for field in &self.fields {
            if let Some(default) = &field.default {
                draft.set(&field.key, default.clone());
            }
        }
        draft
    }

    /// Label/value pairs for the detail modal. Sensitive fields are masked;
    /// descriptors without a form show every field of the record.
    pub fn detail_pairs(&self, record: &Record) -> Vec<(String, String)> {
        if self.fields.is_empty() {
            return record
                .fields()
                .map(|(key, _)| {
                    (
                        format::title_case(key),
                        format::or_placeholder(record.text(key).as_deref()),
                    )
                })
                .collect();
        }
        self.fields
            .iter()
            .map(|field| {
                let raw = record.text(&field.key);
                let value = match raw {
                    Some(value) if field.sensitive => format::mask_secret(&value),
                    other => format::or_placeholder(other.as_deref()),
                };
                (field.label.clone(), value)
            })
            .collect()
    }

    /// Display title for a row, falling back to its id.
    pub fn record_title(&self, record: &Record) -> String {
        record
            .text(&self.title_field)
            .or_else(|| record.id())
            .unwrap_or_else(|| format::PLACEHOLDER.into())
    }
}
