use serde_json::json;

use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::services::{rows, Record};
use crate::status::{StatusPalette, Tone};

pub fn segments() -> ResourceDescriptor {
    ResourceDescriptor::new("segments", "Segments", "segments")
        .subtitle("Rule-based customer groups")
        .mock(segment_rows)
        .search(&["name", "rule", "tags"])
        .columns(vec![
            Column::text("name", "Segment"),
            Column::text("rule", "Rule"),
            Column::new("size", "Customers", ColumnKind::Integer),
            Column::new("avg_order_value", "AOV", ColumnKind::Currency),
            Column::new("growth", "Growth", ColumnKind::Percent),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("active"), TabSpec::status("draft")])
        .metrics(vec![
            MetricSpec::new("segments", "Segments", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("customers", "Customers covered", Aggregate::sum("size"), MetricFormat::Compact),
            MetricSpec::new(
                "largest",
                "Largest segment",
                Aggregate::max("size"),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "growth",
                "Average growth",
                Aggregate::average("growth"),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("rule", "Rule", InputKind::TextArea).required(),
            FieldDescriptor::select("status", "Status", &["draft", "active"]).default_value("draft"),
        ])
        .toggle(StatusToggle::new("status", "active", "draft"))
}

fn segment_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "seg-1", "name": "High spenders", "rule": "total_spent > 500", "size": 842, "avg_order_value": 96.4, "growth": 6.2, "status": "active", "tags": ["value"]}),
        json!({"id": "seg-2", "name": "Serum repeaters", "rule": "category = serum AND orders >= 2", "size": 1310, "avg_order_value": 61.0, "growth": 11.8, "status": "active", "tags": ["serum"]}),
        json!({"id": "seg-3", "name": "Lapsed 90d", "rule": "last_order > 90 days", "size": 2275, "avg_order_value": 38.2, "growth": -3.4, "status": "active", "tags": ["retention"]}),
        json!({"id": "seg-4", "name": "Sensitive skin quiz", "rule": "quiz.skin_type = sensitive", "size": 517, "avg_order_value": 44.9, "growth": 0.0, "status": "draft", "tags": ["quiz"]}),
    ])
}

pub fn audiences() -> ResourceDescriptor {
    ResourceDescriptor::new("audiences", "Audiences", "audiences")
        .subtitle("Synced ad audiences")
        .mock(audience_rows)
        .search(&["name", "platform"])
        .palette(StatusPalette::new(&[
            ("synced", Tone::Success),
            ("syncing", Tone::Info),
            ("error", Tone::Danger),
            ("paused", Tone::Warning),
        ]))
        .columns(vec![
            Column::text("name", "Audience"),
            Column::text("platform", "Platform"),
            Column::new("size", "Size", ColumnKind::Integer),
            Column::new("match_rate", "Match rate", ColumnKind::Percent),
            Column::text("last_synced", "Last synced"),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::field_in("meta", "Meta", "platform", &["Meta"]),
            TabSpec::field_in("google", "Google", "platform", &["Google"]),
            TabSpec::field_in("tiktok", "TikTok", "platform", &["TikTok"]),
        ])
        .metrics(vec![
            MetricSpec::new("audiences", "Audiences", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("reach", "Total size", Aggregate::sum("size"), MetricFormat::Compact),
            MetricSpec::new(
                "match_rate",
                "Average match rate",
                Aggregate::average("match_rate"),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "errors",
                "Sync errors",
                Aggregate::count_where("status", &["error"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select("platform", "Platform", &["Meta", "Google", "TikTok"]).required(),
            FieldDescriptor::new("segment", "Source segment", InputKind::Text),
        ])
        .toggle(StatusToggle::new("status", "synced", "paused"))
}

fn audience_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "aud-1", "name": "Lookalike: high spenders", "platform": "Meta", "size": 120000, "match_rate": 71.5, "last_synced": "2024-05-10 06:00", "status": "synced"}),
        json!({"id": "aud-2", "name": "Retarget: cart abandoners", "platform": "Google", "size": 8400, "match_rate": 64.0, "last_synced": "2024-05-10 05:30", "status": "synced"}),
        json!({"id": "aud-3", "name": "Gen Z skincare", "platform": "TikTok", "size": 45000, "match_rate": 52.3, "last_synced": "2024-05-09 22:10", "status": "error"}),
    ])
}

pub fn journeys() -> ResourceDescriptor {
    ResourceDescriptor::new("journeys", "Customer Journeys", "journeys")
        .subtitle("Touchpoints from first visit to repeat purchase")
        .mock(journey_rows)
        .title_field("customer")
        .search(&["customer", "stage", "channel"])
        .palette(StatusPalette::new(&[
            ("awareness", Tone::Info),
            ("consideration", Tone::Accent),
            ("purchase", Tone::Success),
            ("retention", Tone::Success),
            ("churn_risk", Tone::Danger),
        ]))
        .columns(vec![
            Column::text("customer", "Customer"),
            Column::new("stage", "Stage", ColumnKind::Status),
            Column::text("channel", "Last channel"),
            Column::new("touchpoints", "Touchpoints", ColumnKind::Integer),
            Column::new("value", "Value", ColumnKind::Currency),
            Column::text("last_event.name", "Last event"),
            Column::text("last_event.at", "At"),
        ])
        .tabs(vec![
            TabSpec::field_in("awareness", "Awareness", "stage", &["awareness"]),
            TabSpec::field_in("consideration", "Consideration", "stage", &["consideration"]),
            TabSpec::field_in("purchase", "Purchase", "stage", &["purchase", "retention"]),
            TabSpec::field_in("churn_risk", "Churn risk", "stage", &["churn_risk"]),
        ])
        .metrics(vec![
            MetricSpec::new("journeys", "Journeys", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "touchpoints",
                "Average touchpoints",
                Aggregate::average("touchpoints"),
                MetricFormat::Decimal,
            ),
            MetricSpec::new(
                "converted",
                "Converted",
                Aggregate::share("stage", &["purchase", "retention"]),
                MetricFormat::Percent,
            ),
            MetricSpec::new("value", "Journey value", Aggregate::sum("value"), MetricFormat::Currency),
        ])
        .fields(vec![
            FieldDescriptor::new("customer", "Customer", InputKind::Text).required(),
            FieldDescriptor::select(
                "stage",
                "Stage",
                &["awareness", "consideration", "purchase", "retention", "churn_risk"],
            )
            .default_value("awareness"),
            FieldDescriptor::new("channel", "Channel", InputKind::Text),
        ])
}

fn journey_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "jrn-1", "customer": "Amara Okafor", "stage": "retention", "channel": "Email", "touchpoints": 14, "value": 2480.0, "last_event": {"name": "Opened May newsletter", "at": "2024-05-09 07:41"}}),
        json!({"id": "jrn-2", "customer": "Noah Reyes", "stage": "purchase", "channel": "SMS", "touchpoints": 5, "value": 76.5, "last_event": {"name": "First order placed", "at": "2024-05-09 08:30"}}),
        json!({"id": "jrn-3", "customer": "Guest 51f2", "stage": "consideration", "channel": "Instagram", "touchpoints": 3, "value": 0.0, "last_event": {"name": "Viewed Retinol Night Serum", "at": "2024-05-10 12:05"}}),
        json!({"id": "jrn-4", "customer": "Priya Nair", "stage": "churn_risk", "channel": "Push", "touchpoints": 7, "value": 58.9, "last_event": {"name": "Ignored win-back offer"}}),
        json!({"id": "jrn-5", "customer": "Guest 9ac0", "stage": "awareness", "channel": "TikTok", "touchpoints": 1, "value": 0.0}),
    ])
}

pub fn automations() -> ResourceDescriptor {
    ResourceDescriptor::new("automations", "Automations", "automations")
        .subtitle("Trigger-based flows")
        .mock(automation_rows)
        .search(&["name", "trigger"])
        .columns(vec![
            Column::text("name", "Flow"),
            Column::text("trigger", "Trigger"),
            Column::new("steps", "Steps", ColumnKind::Integer),
            Column::new("enrolled", "Enrolled", ColumnKind::Integer),
            Column::new("completed", "Completed", ColumnKind::Integer),
            Column::new("revenue", "Revenue", ColumnKind::Currency),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("active"), TabSpec::status("inactive")])
        .metrics(vec![
            MetricSpec::new(
                "running",
                "Running flows",
                Aggregate::count_where("status", &["active"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new("enrolled", "Enrolled", Aggregate::sum("enrolled"), MetricFormat::Compact),
            MetricSpec::new(
                "completion",
                "Completion rate",
                Aggregate::rate("completed", "enrolled"),
                MetricFormat::Percent,
            ),
            MetricSpec::new("revenue", "Attributed revenue", Aggregate::sum("revenue"), MetricFormat::Currency),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select(
                "trigger",
                "Trigger",
                &["signup", "cart_abandoned", "order_delivered", "birthday", "inactive_60d"],
            )
            .required(),
            FieldDescriptor::new("steps", "Steps", InputKind::Number).default_value(1),
            FieldDescriptor::select("status", "Status", &["active", "inactive"]).default_value("inactive"),
        ])
        .toggle(StatusToggle::new("status", "active", "inactive"))
}

fn automation_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "aut-1", "name": "Welcome flow", "trigger": "signup", "steps": 4, "enrolled": 2300, "completed": 1610, "revenue": 5120.0, "status": "active"}),
        json!({"id": "aut-2", "name": "Abandoned cart", "trigger": "cart_abandoned", "steps": 3, "enrolled": 1450, "completed": 870, "revenue": 6930.0, "status": "active"}),
        json!({"id": "aut-3", "name": "Review request", "trigger": "order_delivered", "steps": 2, "enrolled": 980, "completed": 902, "revenue": 0.0, "status": "active"}),
        json!({"id": "aut-4", "name": "Birthday treat", "trigger": "birthday", "steps": 1, "enrolled": 0, "completed": 0, "revenue": 0.0, "status": "inactive"}),
    ])
}

pub fn loyalty() -> ResourceDescriptor {
    ResourceDescriptor::new("loyalty", "Loyalty Program", "loyalty/members")
        .subtitle("Points, tiers and redemptions")
        .mock(loyalty_rows)
        .search(&["name", "email", "tier"])
        .palette(StatusPalette::tier())
        .columns(vec![
            Column::text("name", "Member"),
            Column::text("email", "Email"),
            Column::new("tier", "Tier", ColumnKind::Status),
            Column::new("points", "Points", ColumnKind::Integer),
            Column::new("redeemed", "Redeemed", ColumnKind::Integer),
            Column::new("lifetime_spend", "Lifetime spend", ColumnKind::Currency),
        ])
        .tabs(vec![
            TabSpec::field_in("platinum", "Platinum", "tier", &["platinum"]),
            TabSpec::field_in("gold", "Gold", "tier", &["gold"]),
            TabSpec::field_in("silver", "Silver", "tier", &["silver"]),
            TabSpec::field_in("bronze", "Bronze", "tier", &["bronze"]),
        ])
        .metrics(vec![
            MetricSpec::new("members", "Members", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("outstanding", "Points outstanding", Aggregate::sum("points"), MetricFormat::Compact),
            MetricSpec::new(
                "redemption",
                "Redemption rate",
                Aggregate::rate("redeemed", "points"),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "top_tier",
                "Platinum share",
                Aggregate::share("tier", &["platinum"]),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("email", "Email", InputKind::Email).required(),
            FieldDescriptor::select("tier", "Tier", &["bronze", "silver", "gold", "platinum"])
                .default_value("bronze"),
            FieldDescriptor::new("points", "Points", InputKind::Number).default_value(0),
        ])
}

fn loyalty_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "loy-1", "name": "Amara Okafor", "email": "amara@example.com", "tier": "platinum", "points": 12400, "redeemed": 6000, "lifetime_spend": 2480.0}),
        json!({"id": "loy-2", "name": "Lena Park", "email": "lena.park@example.com", "tier": "gold", "points": 4800, "redeemed": 1500, "lifetime_spend": 960.5}),
        json!({"id": "loy-3", "name": "Sofia Marin", "email": "sofia.m@example.com", "tier": "silver", "points": 2150, "redeemed": 0, "lifetime_spend": 430.0}),
        json!({"id": "loy-4", "name": "Priya Nair", "email": "priya@example.com", "tier": "bronze", "points": 290, "redeemed": 0, "lifetime_spend": 58.9}),
    ])
}
