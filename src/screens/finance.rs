use serde_json::{json, Map, Value};

use crate::controller::{ActionOutcome, ScreenController};
use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::screen::{Operation, ScreenState};
use crate::services::{rows, Record, ResourceService};
use crate::status::StatusPalette;

pub fn tax_rates() -> ResourceDescriptor {
    ResourceDescriptor::new("tax-rates", "Tax Rates", "tax-rates")
        .subtitle("Rates applied at checkout by region")
        .sample(tax_rate_rows)
        .search(&["name", "country", "region"])
        .columns(vec![
            Column::text("name", "Name"),
            Column::text("country", "Country"),
            Column::text("region", "Region"),
            Column::new("rate", "Rate", ColumnKind::Percent),
            Column::new("compound", "Compound", ColumnKind::Flag),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("active"), TabSpec::status("inactive")])
        .metrics(vec![
            MetricSpec::new("rates", "Rates", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "average",
                "Average rate",
                Aggregate::average("rate"),
                MetricFormat::Percent,
            ),
            MetricSpec::new("highest", "Highest rate", Aggregate::max("rate"), MetricFormat::Percent),
            MetricSpec::new(
                "active",
                "Active",
                Aggregate::count_where("status", &["active"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("country", "Country code", InputKind::Text).required(),
            FieldDescriptor::new("region", "Region", InputKind::Text),
            FieldDescriptor::new("rate", "Rate %", InputKind::Number).required(),
            FieldDescriptor::new("compound", "Compound", InputKind::Toggle).default_value(false),
            FieldDescriptor::select("status", "Status", &["active", "inactive"]).default_value("active"),
        ])
        .toggle(StatusToggle::new("status", "active", "inactive"))
}

fn tax_rate_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "tax-1", "name": "California sales tax", "country": "US", "region": "CA", "rate": 7.25, "compound": false, "status": "active"}),
        json!({"id": "tax-2", "name": "New York sales tax", "country": "US", "region": "NY", "rate": 4.0, "compound": false, "status": "active"}),
        json!({"id": "tax-3", "name": "UK VAT", "country": "GB", "rate": 20.0, "compound": false, "status": "active"}),
        json!({"id": "tax-4", "name": "Quebec QST", "country": "CA", "region": "QC", "rate": 9.975, "compound": true, "status": "inactive"}),
    ])
}

pub fn tax_rules() -> ResourceDescriptor {
    ResourceDescriptor::new("tax-rules", "Tax Rules", "tax-rules")
        .subtitle("Which products and customers a rate applies to")
        .sample(tax_rule_rows)
        .refetch()
        .search(&["name", "product_category", "customer_group"])
        .palette(StatusPalette::priority())
        .columns(vec![
            Column::text("name", "Rule"),
            Column::text("tax_rate", "Rate"),
            Column::text("product_category", "Products"),
            Column::text("customer_group", "Customers"),
            Column::new("priority", "Priority", ColumnKind::Status),
            Column::new("enabled", "Enabled", ColumnKind::Flag),
        ])
        .tabs(vec![
            TabSpec::flag("enabled", "Enabled", "enabled", true),
            TabSpec::flag("disabled", "Disabled", "enabled", false),
        ])
        .metrics(vec![
            MetricSpec::new("rules", "Rules", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "enabled",
                "Enabled",
                Aggregate::share("enabled", &["true"]),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("tax_rate", "Tax rate", InputKind::Text).required(),
            FieldDescriptor::new("product_category", "Product category", InputKind::Text),
            FieldDescriptor::select("customer_group", "Customer group", &["all", "retail", "wholesale", "exempt"])
                .default_value("all"),
            FieldDescriptor::select("priority", "Priority", &["low", "medium", "high"]).default_value("medium"),
            FieldDescriptor::new("enabled", "Enabled", InputKind::Toggle).default_value(true),
        ])
        .toggle(StatusToggle::new("enabled", true, false))
}

fn tax_rule_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "rul-1", "name": "Cosmetics standard", "tax_rate": "California sales tax", "product_category": "all", "customer_group": "retail", "priority": "medium", "enabled": true}),
        json!({"id": "rul-2", "name": "Wholesale exemption", "tax_rate": "California sales tax", "product_category": "all", "customer_group": "wholesale", "priority": "high", "enabled": true}),
        json!({"id": "rul-3", "name": "UK sunscreen", "tax_rate": "UK VAT", "product_category": "sunscreen", "customer_group": "all", "priority": "low", "enabled": false}),
    ])
}

pub fn payment_methods() -> ResourceDescriptor {
    ResourceDescriptor::new("payment-methods", "Payment Methods", "payment/methods")
        .subtitle("What shoppers can pay with")
        .sample(payment_method_rows)
        .search(&["name", "provider"])
        .palette(StatusPalette::payment())
        .columns(vec![
            Column::text("name", "Method"),
            Column::text("provider", "Provider"),
            Column::new("fee_percent", "Fee", ColumnKind::Percent),
            Column::new("volume", "Volume", ColumnKind::Currency),
            Column::new("transactions", "Transactions", ColumnKind::Integer),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![TabSpec::status("enabled"), TabSpec::status("disabled")])
        .metrics(vec![
            MetricSpec::new(
                "enabled",
                "Enabled methods",
                Aggregate::count_where("status", &["enabled"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new("volume", "Processed volume", Aggregate::sum("volume"), MetricFormat::Currency),
            MetricSpec::new(
                "fee",
                "Average fee",
                Aggregate::average("fee_percent"),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select("provider", "Provider", &["Stripe", "PayPal", "Klarna", "Apple Pay"]).required(),
            FieldDescriptor::new("fee_percent", "Fee %", InputKind::Number),
            FieldDescriptor::select("status", "Status", &["enabled", "disabled"]).default_value("disabled"),
        ])
        .toggle(StatusToggle::new("status", "enabled", "disabled"))
}

fn payment_method_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "met-1", "name": "Credit / debit card", "provider": "Stripe", "fee_percent": 2.9, "volume": 48210.5, "transactions": 1284, "status": "enabled"}),
        json!({"id": "met-2", "name": "PayPal", "provider": "PayPal", "fee_percent": 3.49, "volume": 12904.0, "transactions": 402, "status": "enabled"}),
        json!({"id": "met-3", "name": "Pay in 4", "provider": "Klarna", "fee_percent": 5.99, "volume": 0.0, "transactions": 0, "status": "disabled"}),
    ])
}

pub fn payment_gateways() -> ResourceDescriptor {
    ResourceDescriptor::new("payment-gateways", "Payment Gateways", "payment/gateways")
        .subtitle("Gateway credentials and mode")
        .sample(gateway_rows)
        .search(&["name", "mode"])
        .palette(StatusPalette::payment())
        .columns(vec![
            Column::text("name", "Gateway"),
            Column::new("mode", "Mode", ColumnKind::Status),
            Column::new("publishable_key", "Publishable key", ColumnKind::Secret),
            Column::new("secret_key", "Secret key", ColumnKind::Secret),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::field_in("live", "Live", "mode", &["live"]),
            TabSpec::field_in("test", "Test", "mode", &["test"]),
        ])
        .metrics(vec![
            MetricSpec::new("gateways", "Gateways", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "connected",
                "Connected",
                Aggregate::count_where("status", &["connected"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::select("mode", "Mode", &["test", "live"]).default_value("test"),
            FieldDescriptor::new("publishable_key", "Publishable key", InputKind::Text).required(),
            FieldDescriptor::new("secret_key", "Secret key", InputKind::Password)
                .required()
                .sensitive(),
            FieldDescriptor::new("webhook_url", "Webhook URL", InputKind::Url),
        ])
        .toggle(StatusToggle::new("status", "connected", "disconnected"))
}

fn gateway_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "gtw-1", "name": "Stripe", "mode": "live", "publishable_key": "pk_live_51Hx9aQ2", "secret_key": "sk_live_51Hx9aQ2e8Rt", "webhook_url": "https://lumina.shop/hooks/stripe", "status": "connected"}),
        json!({"id": "gtw-2", "name": "PayPal", "mode": "test", "publishable_key": "AYsb-sandbox-7731", "secret_key": "EOp-sandbox-55f0", "status": "disconnected"}),
    ])
}

pub fn transactions() -> ResourceDescriptor {
    ResourceDescriptor::new("transactions", "Transactions", "payment/transactions")
        .subtitle("Charges, refunds and disputes")
        .sample(transaction_rows)
        .title_field("reference")
        .search(&["reference", "order_number", "customer"])
        .palette(StatusPalette::payment())
        .columns(vec![
            Column::text("reference", "Reference"),
            Column::text("order_number", "Order"),
            Column::text("customer", "Customer"),
            Column::text("method", "Method"),
            Column::new("amount", "Amount", ColumnKind::Currency),
            Column::new("refunded_amount", "Refunded", ColumnKind::Currency),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::status("completed"),
            TabSpec::status("pending"),
            TabSpec::field_in("refunds", "Refunds", "status", &["refunded", "partially_refunded"]),
            TabSpec::status("failed"),
        ])
        .metrics(vec![
            MetricSpec::new("volume", "Gross volume", Aggregate::sum("amount"), MetricFormat::Currency),
            MetricSpec::new(
                "refunded",
                "Refunded",
                Aggregate::sum("refunded_amount"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "success",
                "Success rate",
                Aggregate::share("status", &["completed", "refunded", "partially_refunded"]),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "average",
                "Average charge",
                Aggregate::average("amount"),
                MetricFormat::Currency,
            ),
        ])
}

fn transaction_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "txn-1", "reference": "ch_3P1aQ2", "order_number": "LUM-1001", "customer": "Amara Okafor", "method": "card", "amount": 128.4, "refunded_amount": 0.0, "status": "completed"}),
        json!({"id": "txn-2", "reference": "ch_3P1bX7", "order_number": "LUM-1002", "customer": "Lena Park", "method": "paypal", "amount": 42.0, "refunded_amount": 0.0, "status": "completed"}),
        json!({"id": "txn-3", "reference": "ch_3P1cM1", "order_number": "LUM-1004", "customer": "Noah Reyes", "method": "card", "amount": 76.5, "refunded_amount": 0.0, "status": "pending"}),
        json!({"id": "txn-4", "reference": "ch_3P1dK9", "order_number": "LUM-1005", "customer": "Priya Nair", "method": "card", "amount": 29.9, "refunded_amount": 29.9, "status": "refunded", "refund_reason": "Order cancelled"}),
        json!({"id": "txn-5", "reference": "ch_3P1eZ4", "order_number": "LUM-0998", "customer": "Marco Bianchi", "method": "card", "amount": 64.0, "refunded_amount": 0.0, "status": "failed"}),
    ])
}

/// Refunds all or part of a transaction. `amount` of `None` refunds what is left.
pub async fn refund_transaction<S: ResourceService>(
    controller: &ScreenController<S>,
    state: &mut ScreenState,
    id: &str,
    amount: Option<f64>,
    reason: &str,
) -> ActionOutcome {
    controller
        .apply(state, refund_operation(id, amount, reason))
        .await
}

pub fn refund_operation(id: &str, amount: Option<f64>, reason: &str) -> Operation {
    let mut body = Map::new();
    if let Some(amount) = amount {
        body.insert("amount".into(), json!(amount));
    }
    if !reason.trim().is_empty() {
        body.insert("reason".into(), json!(reason.trim()));
    }
    Operation::Action {
        path: format!("payment/transactions/{id}/refund"),
        body: Value::Object(body),
        label: "refund".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::services::InMemoryService;

    fn transactions_controller() -> (InMemoryService, ScreenController<InMemoryService>) {
        let service = InMemoryService::new();
        service
            .seed("payment/transactions", transaction_rows())
            .unwrap();
        (service.clone(), ScreenController::new(service, transactions()))
    }

    #[tokio::test]
    async fn partial_refund_updates_row_in_place() {
        let (_, controller) = transactions_controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let outcome = refund_transaction(&controller, &mut state, "txn-1", Some(28.4), "Damaged box").await;
        assert_eq!(outcome, ActionOutcome::Applied);
        let row = state.find("txn-1").unwrap();
        assert_eq!(row.status().as_deref(), Some("partially_refunded"));
        assert_eq!(row.number("refunded_amount"), Some(28.4));
        assert_eq!(row.text("refund_reason").as_deref(), Some("Damaged box"));
        let values = state.metrics(controller.descriptor()).to_vec();
        assert_eq!(values[1].display, "$58.30");
    }

    #[tokio::test]
    async fn over_refund_is_rejected_without_changes() {
        let (_, controller) = transactions_controller();
        let mut state = ScreenState::new(controller.descriptor());
        controller.mount(&mut state).await;
        let before = state.items().to_vec();
        let outcome = refund_transaction(&controller, &mut state, "txn-2", Some(500.0), "").await;
        assert_eq!(outcome, ActionOutcome::Failed);
        assert_eq!(state.items(), before.as_slice());
        assert!(state.notice().unwrap().message.starts_with("Failed to refund"));
    }

    #[test]
    fn gateway_secrets_render_masked() {
        let descriptor = payment_gateways();
        let rows = descriptor.sample_rows();
        assert_eq!(descriptor.columns[3].render(&rows[0]), "••••••••e8Rt");
        assert!(descriptor.field("secret_key").unwrap().sensitive);
    }

    #[test]
    fn tax_rule_tabs_split_on_flag() {
        let descriptor = tax_rules();
        let rows = descriptor.sample_rows();
        let enabled = descriptor.tab("enabled").unwrap();
        assert_eq!(rows.iter().filter(|r| enabled.matches(r)).count(), 2);
        let values = metrics::compute(&rows, &descriptor.metrics);
        assert_eq!(values[1].display, "66.7%");
    }
}
