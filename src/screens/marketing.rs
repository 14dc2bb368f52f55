use serde_json::json;

use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::services::{rows, Record};
use crate::status::{StatusPalette, Tone};

const CAMPAIGN_STATUSES: &[&str] = &["draft", "scheduled", "active", "paused", "completed"];

/// Channel-specific parts of a campaign screen.
struct Channel {
    key: &'static str,
    title: &'static str,
    endpoint: &'static str,
    subtitle: &'static str,
    /// Engagement counter divided by reach for the rate metric.
    engagement: (&'static str, &'static str),
    extra_fields: Vec<FieldDescriptor>,
    sample: fn() -> Vec<Record>,
}

fn campaign_screen(channel: Channel) -> ResourceDescriptor {
    let (engaged, engaged_label) = channel.engagement;
    let mut fields = vec![
        FieldDescriptor::new("name", "Campaign name", InputKind::Text).required(),
        FieldDescriptor::select("status", "Status", CAMPAIGN_STATUSES).default_value("draft"),
        FieldDescriptor::new("audience", "Audience", InputKind::Text),
        FieldDescriptor::new("scheduled_at", "Send at", InputKind::Date),
    ];
    fields.extend(channel.extra_fields);

    ResourceDescriptor::new(channel.key, channel.title, channel.endpoint)
        .subtitle(channel.subtitle)
        .mock(channel.sample)
        .search(&["name", "audience", "tags"])
        .palette(StatusPalette::campaign())
        .columns(vec![
            Column::text("name", "Campaign"),
            Column::new("status", "Status", ColumnKind::Status),
            Column::text("audience", "Audience"),
            Column::new("reach", "Reach", ColumnKind::Integer),
            Column::new(engaged, engaged_label, ColumnKind::Integer),
            Column::new("revenue", "Revenue", ColumnKind::Currency),
            Column::new("tags", "Tags", ColumnKind::Tags),
        ])
        .tabs(vec![
            TabSpec::status("active"),
            TabSpec::status("scheduled"),
            TabSpec::status("draft"),
            TabSpec::field_in("finished", "Finished", "status", &["completed", "sent"]),
        ])
        .metrics(vec![
            MetricSpec::new("campaigns", "Campaigns", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "active",
                "Active",
                Aggregate::count_where("status", &["active"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new("reach", "Total reach", Aggregate::sum("reach"), MetricFormat::Compact),
            MetricSpec::new(
                "engagement",
                &format!("{engaged_label} rate"),
                Aggregate::rate(engaged, "reach"),
                MetricFormat::Percent,
            ),
            MetricSpec::new("revenue", "Revenue", Aggregate::sum("revenue"), MetricFormat::Currency),
        ])
        .fields(fields)
        .toggle(StatusToggle::new("status", "active", "paused"))
}

pub fn sms_campaigns() -> ResourceDescriptor {
    campaign_screen(Channel {
        key: "sms",
        title: "SMS Campaigns",
        endpoint: "campaigns/sms",
        subtitle: "Text message promotions",
        engagement: ("clicks", "Click"),
        extra_fields: vec![
            FieldDescriptor::new("message", "Message", InputKind::TextArea).required(),
            FieldDescriptor::new("sender_id", "Sender ID", InputKind::Text).default_value("LUMINA"),
        ],
        sample: sms_rows,
    })
}

fn sms_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "sms-1", "name": "Retinol restock alert", "status": "active", "audience": "Serum buyers", "reach": 4200, "clicks": 386, "conversions": 71, "revenue": 3408.0, "tags": ["restock", "serum"], "message": "Your favourite Retinol Night Serum is back!"}),
        json!({"id": "sms-2", "name": "Mother's Day bundle", "status": "completed", "audience": "All subscribers", "reach": 12800, "clicks": 1024, "conversions": 198, "revenue": 11880.0, "tags": ["seasonal"], "message": "Treat her to the Glow Bundle, 20% off."}),
        json!({"id": "sms-3", "name": "SPF reminder", "status": "scheduled", "audience": "Summer buyers", "reach": 0, "clicks": 0, "conversions": 0, "revenue": 0.0, "tags": ["sunscreen"], "message": "Sun's out. Restock your Mineral SPF 50."}),
        json!({"id": "sms-4", "name": "Win-back 90 days", "status": "paused", "audience": "Lapsed customers", "reach": 2100, "clicks": 84, "conversions": 9, "revenue": 315.0, "tags": ["retention"], "message": "We miss you. Here is 15% off."}),
    ])
}

pub fn email_campaigns() -> ResourceDescriptor {
    campaign_screen(Channel {
        key: "email",
        title: "Email Campaigns",
        endpoint: "campaigns/email",
        subtitle: "Newsletters and lifecycle email",
        engagement: ("opens", "Open"),
        extra_fields: vec![
            FieldDescriptor::new("subject", "Subject line", InputKind::Text).required(),
            FieldDescriptor::new("from_email", "From address", InputKind::Email)
                .default_value("hello@lumina.shop"),
            FieldDescriptor::select("template", "Template", &["newsletter", "product", "plain"])
                .default_value("newsletter"),
        ],
        sample: email_rows,
    })
}

fn email_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "eml-1", "name": "May newsletter", "status": "completed", "audience": "All subscribers", "reach": 18400, "opens": 7544, "clicks": 1288, "revenue": 9240.0, "tags": ["newsletter"], "subject": "Your May skin ritual"}),
        json!({"id": "eml-2", "name": "Welcome series", "status": "active", "audience": "New signups", "reach": 2300, "opens": 1426, "clicks": 391, "revenue": 2870.5, "tags": ["onboarding", "automated"], "subject": "Welcome to Lumina"}),
        json!({"id": "eml-3", "name": "Barrier cream launch", "status": "draft", "audience": "Dry skin segment", "reach": 0, "opens": 0, "clicks": 0, "revenue": 0.0, "tags": ["launch"], "subject": "Meet your new barrier cream"}),
    ])
}

pub fn push_notifications() -> ResourceDescriptor {
    campaign_screen(Channel {
        key: "push",
        title: "Push Notifications",
        endpoint: "campaigns/push",
        subtitle: "App and browser push",
        engagement: ("clicks", "Tap"),
        extra_fields: vec![
            FieldDescriptor::new("title", "Title", InputKind::Text).required(),
            FieldDescriptor::new("body", "Body", InputKind::TextArea).required(),
            FieldDescriptor::new("deep_link", "Deep link", InputKind::Url),
        ],
        sample: push_rows,
    })
}

fn push_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "psh-1", "name": "Flash sale 24h", "status": "completed", "audience": "App users", "reach": 9600, "clicks": 672, "revenue": 4032.0, "tags": ["sale"], "title": "24h flash sale", "body": "Everything 25% off today only."}),
        json!({"id": "psh-2", "name": "Cart reminder", "status": "active", "audience": "Abandoned carts", "reach": 1450, "clicks": 203, "revenue": 1780.0, "tags": ["automated"], "title": "Still thinking it over?", "body": "Your cart is waiting."}),
    ])
}

pub fn whatsapp_campaigns() -> ResourceDescriptor {
    campaign_screen(Channel {
        key: "whatsapp",
        title: "WhatsApp Campaigns",
        endpoint: "campaigns/whatsapp",
        subtitle: "Template messages over WhatsApp Business",
        engagement: ("reads", "Read"),
        extra_fields: vec![
            FieldDescriptor::new("template_name", "Template name", InputKind::Text).required(),
            FieldDescriptor::select("language", "Language", &["en", "es", "fr", "pt"]).default_value("en"),
        ],
        sample: whatsapp_rows,
    })
}

fn whatsapp_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "wha-1", "name": "Order follow-up", "status": "active", "audience": "Recent buyers", "reach": 3100, "reads": 2790, "clicks": 410, "revenue": 2210.0, "tags": ["post-purchase"], "template_name": "order_followup_v2"}),
        json!({"id": "wha-2", "name": "VIP early access", "status": "scheduled", "audience": "Platinum tier", "reach": 0, "reads": 0, "clicks": 0, "revenue": 0.0, "tags": ["vip"], "template_name": "vip_early_access"}),
        json!({"id": "wha-3", "name": "Routine quiz", "status": "paused", "audience": "Quiz takers", "reach": 880, "reads": 702, "clicks": 95, "revenue": 410.0, "tags": ["quiz"], "template_name": "routine_quiz"}),
    ])
}

pub fn affiliates() -> ResourceDescriptor {
    ResourceDescriptor::new("affiliates", "Affiliates", "affiliates")
        .subtitle("Creators and partner links")
        .mock(affiliate_rows)
        .search(&["name", "email", "code"])
        .palette(StatusPalette::new(&[
            ("active", Tone::Success),
            ("pending", Tone::Warning),
            ("suspended", Tone::Danger),
        ]))
        .columns(vec![
            Column::text("name", "Partner"),
            Column::text("code", "Code"),
            Column::new("tier", "Tier", ColumnKind::Status),
            Column::new("clicks", "Clicks", ColumnKind::Integer),
            Column::new("conversions", "Conversions", ColumnKind::Integer),
            Column::new("revenue", "Revenue", ColumnKind::Currency),
            Column::new("commission", "Commission", ColumnKind::Currency),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::status("active"),
            TabSpec::status("pending"),
            TabSpec::status("suspended"),
        ])
        .metrics(vec![
            MetricSpec::new("partners", "Partners", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("clicks", "Clicks", Aggregate::sum("clicks"), MetricFormat::Compact),
            MetricSpec::new(
                "conversion",
                "Conversion rate",
                Aggregate::rate("conversions", "clicks"),
                MetricFormat::Percent,
            ),
            MetricSpec::new("revenue", "Revenue", Aggregate::sum("revenue"), MetricFormat::Currency),
            MetricSpec::new(
                "commission",
                "Commission owed",
                Aggregate::sum("commission"),
                MetricFormat::Currency,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("email", "Email", InputKind::Email).required(),
            FieldDescriptor::new("code", "Referral code", InputKind::Text).required(),
            FieldDescriptor::new("commission_rate", "Commission %", InputKind::Number).default_value(10),
            FieldDescriptor::select("tier", "Tier", &["bronze", "silver", "gold"]).default_value("bronze"),
            FieldDescriptor::select("status", "Status", &["pending", "active", "suspended"])
                .default_value("pending"),
        ])
        .toggle(StatusToggle::new("status", "active", "suspended"))
}

fn affiliate_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "aff-1", "name": "Glow with Maya", "email": "maya@creators.io", "code": "MAYA15", "tier": "gold", "commission_rate": 15, "clicks": 5400, "conversions": 312, "revenue": 14976.0, "commission": 2246.4, "status": "active"}),
        json!({"id": "aff-2", "name": "SkinLab Reviews", "email": "team@skinlab.tv", "code": "SKINLAB", "tier": "silver", "commission_rate": 12, "clicks": 2100, "conversions": 88, "revenue": 3960.0, "commission": 475.2, "status": "active"}),
        json!({"id": "aff-3", "name": "Derm Notes", "email": "hello@dermnotes.co", "code": "DERM10", "tier": "bronze", "commission_rate": 10, "clicks": 0, "conversions": 0, "revenue": 0.0, "commission": 0.0, "status": "pending"}),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;

    #[test]
    fn channels_share_campaign_shape() {
        for descriptor in [sms_campaigns(), email_campaigns(), push_notifications(), whatsapp_campaigns()] {
            assert_eq!(descriptor.tabs.len(), 5, "{}", descriptor.key);
            assert!(descriptor.toggle.is_some());
            assert!(descriptor.field("name").map(|f| f.required).unwrap_or(false));
        }
        assert_eq!(email_campaigns().metrics[3].label, "Open rate");
    }

    #[test]
    fn scheduled_campaigns_do_not_break_rates() {
        let descriptor = whatsapp_campaigns();
        let scheduled: Vec<Record> = descriptor
            .sample_rows()
            .into_iter()
            .filter(|r| r.status().as_deref() == Some("scheduled"))
            .collect();
        let values = metrics::compute(&scheduled, &descriptor.metrics);
        assert_eq!(values[3].display, "0.0%");
    }
}
