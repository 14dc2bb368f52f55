use serde_json::json;

use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::services::{rows, Record};
use crate::status::{StatusPalette, Tone};

pub fn ai_features() -> ResourceDescriptor {
    ResourceDescriptor::new("ai-features", "AI Features", "ai/features")
        .subtitle("Assistants available to the team")
        .sample(ai_feature_rows)
        .search(&["name", "description", "model"])
        .columns(vec![
            Column::text("name", "Feature"),
            Column::text("description", "What it does"),
            Column::text("model", "Model"),
            Column::new("usage_count", "Runs", ColumnKind::Integer),
            Column::new("success_rate", "Success", ColumnKind::Percent),
            Column::new("enabled", "Enabled", ColumnKind::Flag),
        ])
        .tabs(vec![
            TabSpec::flag("on", "Enabled", "enabled", true),
            TabSpec::flag("off", "Disabled", "enabled", false),
        ])
        .metrics(vec![
            MetricSpec::new("features", "Features", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "enabled",
                "Enabled",
                Aggregate::count_where("enabled", &["true"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new("runs", "Runs", Aggregate::sum("usage_count"), MetricFormat::Compact),
            MetricSpec::new(
                "success",
                "Average success",
                Aggregate::average("success_rate"),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("description", "Description", InputKind::TextArea),
            FieldDescriptor::select("model", "Model", &["small", "medium", "large"]).default_value("medium"),
            FieldDescriptor::new("enabled", "Enabled", InputKind::Toggle).default_value(false),
        ])
        .toggle(StatusToggle::new("enabled", true, false))
}

fn ai_feature_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "ai-1", "name": "Product description writer", "description": "Drafts PDP copy from ingredient lists", "model": "large", "usage_count": 1840, "success_rate": 94.0, "enabled": true}),
        json!({"id": "ai-2", "name": "Review summarizer", "description": "Condenses reviews into pros and cons", "model": "medium", "usage_count": 5210, "success_rate": 97.5, "enabled": true}),
        json!({"id": "ai-3", "name": "Routine recommender", "description": "Suggests a routine from quiz answers", "model": "medium", "usage_count": 0, "success_rate": 0.0, "enabled": false}),
    ])
}

pub fn ai_tasks() -> ResourceDescriptor {
    ResourceDescriptor::new("ai-tasks", "AI Tasks", "ai/tasks")
        .subtitle("Queued and finished generation jobs")
        .sample(ai_task_rows)
        .title_field("title")
        .search(&["title", "feature"])
        .palette(StatusPalette::new(&[
            ("queued", Tone::Info),
            ("running", Tone::Accent),
            ("completed", Tone::Success),
            ("failed", Tone::Danger),
        ]))
        .columns(vec![
            Column::text("title", "Task"),
            Column::text("feature", "Feature"),
            Column::new("status", "Status", ColumnKind::Status),
            Column::new("tokens", "Tokens", ColumnKind::Integer),
            Column::new("cost", "Cost", ColumnKind::Currency),
            Column::text("created_at", "Created"),
        ])
        .tabs(vec![
            TabSpec::field_in("active", "In progress", "status", &["queued", "running"]),
            TabSpec::status("completed"),
            TabSpec::status("failed"),
        ])
        .metrics(vec![
            MetricSpec::new("tasks", "Tasks", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "completed",
                "Completed",
                Aggregate::share("status", &["completed"]),
                MetricFormat::Percent,
            ),
            MetricSpec::new("tokens", "Tokens", Aggregate::sum("tokens"), MetricFormat::Compact),
            MetricSpec::new("cost", "Spend", Aggregate::sum("cost"), MetricFormat::Currency),
        ])
        .fields(vec![
            FieldDescriptor::new("title", "Title", InputKind::Text).required(),
            FieldDescriptor::select(
                "feature",
                "Feature",
                &["Product description writer", "Review summarizer", "Routine recommender"],
            )
            .required(),
            FieldDescriptor::new("prompt", "Prompt", InputKind::TextArea).required(),
            FieldDescriptor::select("status", "Status", &["queued"]).default_value("queued"),
        ])
}

fn ai_task_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "tsk-1", "title": "Copy for Mineral SPF 50", "feature": "Product description writer", "status": "completed", "tokens": 2310, "cost": 0.46, "created_at": "2024-05-09 10:12"}),
        json!({"id": "tsk-2", "title": "Summarize serum reviews", "feature": "Review summarizer", "status": "running", "tokens": 9800, "cost": 1.96, "created_at": "2024-05-10 08:01"}),
        json!({"id": "tsk-3", "title": "Copy for Clay Detox Mask", "feature": "Product description writer", "status": "failed", "tokens": 120, "cost": 0.02, "created_at": "2024-05-10 08:40"}),
        json!({"id": "tsk-4", "title": "Bulk alt text", "feature": "Product description writer", "status": "queued", "tokens": 0, "cost": 0.0, "created_at": "2024-05-10 09:15"}),
    ])
}

pub fn api_keys() -> ResourceDescriptor {
    ResourceDescriptor::new("api-keys", "API Keys", "integrations/api-keys")
        .subtitle("Third-party credentials used by the store")
        .mock(api_key_rows)
        .search(&["name", "service"])
        .palette(StatusPalette::new(&[
            ("active", Tone::Success),
            ("expired", Tone::Danger),
            ("revoked", Tone::Neutral),
        ]))
        .columns(vec![
            Column::text("name", "Name"),
            Column::text("service", "Service"),
            Column::new("key", "Key", ColumnKind::Secret),
            Column::new("scopes", "Scopes", ColumnKind::Tags),
            Column::text("last_used", "Last used"),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("active"), TabSpec::status("revoked")])
        .metrics(vec![
            MetricSpec::new("keys", "Keys", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "active",
                "Active",
                Aggregate::count_where("status", &["active"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "expired",
                "Expired",
                Aggregate::count_where("status", &["expired"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select("service", "Service", &["Klaviyo", "Twilio", "Shippo", "OpenAI", "Meta"])
                .required(),
            FieldDescriptor::new("key", "Key", InputKind::Password)
                .required()
                .sensitive(),
            FieldDescriptor::new("webhook_url", "Webhook URL", InputKind::Url),
        ])
        .toggle(StatusToggle::new("status", "active", "revoked"))
}

fn api_key_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "key-1", "name": "Email sync", "service": "Klaviyo", "key": "pk_4f9a1c2b7d8e3f60", "scopes": ["lists:write", "profiles:read"], "last_used": "2024-05-10 07:58", "status": "active"}),
        json!({"id": "key-2", "name": "SMS sender", "service": "Twilio", "key": "SK2b8e0d61a9f14c07", "scopes": ["messages:send"], "last_used": "2024-05-10 08:02", "status": "active"}),
        json!({"id": "key-3", "name": "Labels", "service": "Shippo", "key": "shippo_test_77aa91", "scopes": ["labels"], "status": "expired"}),
    ])
}

pub fn settings() -> ResourceDescriptor {
    ResourceDescriptor::new("settings", "Settings", "settings")
        .subtitle("Store-wide configuration")
        .mock(setting_rows)
        .title_field("label")
        .search(&["label", "group", "value"])
        .columns(vec![
            Column::text("label", "Setting"),
            Column::text("group", "Group"),
            Column::text("value", "Value"),
            Column::text("updated_at", "Updated"),
        ])
        .tabs(vec![
            TabSpec::field_in("store", "Store", "group", &["store"]),
            TabSpec::field_in("checkout", "Checkout", "group", &["checkout"]),
            TabSpec::field_in("notifications", "Notifications", "group", &["notifications"]),
        ])
        .metrics(vec![MetricSpec::new(
            "settings",
            "Settings",
            Aggregate::Count,
            MetricFormat::Integer,
        )])
        .fields(vec![
            FieldDescriptor::new("label", "Label", InputKind::Text).required(),
            FieldDescriptor::select("group", "Group", &["store", "checkout", "notifications"]).required(),
            FieldDescriptor::new("value", "Value", InputKind::Text).required(),
        ])
}

fn setting_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "set-1", "label": "Store name", "group": "store", "value": "Lumina Skincare", "updated_at": "2024-04-02"}),
        json!({"id": "set-2", "label": "Support email", "group": "store", "value": "care@lumina.shop", "updated_at": "2024-04-02"}),
        json!({"id": "set-3", "label": "Currency", "group": "checkout", "value": "USD", "updated_at": "2024-03-18"}),
        json!({"id": "set-4", "label": "Free shipping threshold", "group": "checkout", "value": "50", "updated_at": "2024-05-01"}),
        json!({"id": "set-5", "label": "Desktop order alerts", "group": "notifications", "value": "on", "updated_at": "2024-05-06"}),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ActionOutcome, ScreenController};
    use crate::screen::ScreenState;
    use crate::services::InMemoryService;

    #[tokio::test]
    async fn feature_toggle_flips_enabled_flag() {
        let service = InMemoryService::new();
        service.seed("ai/features", ai_feature_rows()).unwrap();
        let controller = ScreenController::new(service, ai_features());
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        assert_eq!(controller.toggle_status(&mut state, "ai-3").await, ActionOutcome::Applied);
        assert!(state.find("ai-3").unwrap().flag("enabled"));
        assert_eq!(state.metrics(controller.descriptor())[1].display, "3");
    }

    #[test]
    fn api_keys_never_render_in_clear() {
        let descriptor = api_keys();
        for row in descriptor.sample_rows() {
            let rendered = descriptor.columns[2].render(&row);
            let key = row.text("key").unwrap();
            assert_ne!(rendered, key);
            assert!(rendered.ends_with(&key[key.len() - 4..]));
        }
    }
}
