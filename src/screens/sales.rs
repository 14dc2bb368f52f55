use serde_json::json;

use crate::descriptor::{
    Column, ColumnKind, FieldDescriptor, InputKind, ResourceDescriptor, StatusToggle, TabSpec,
};
use crate::metrics::{Aggregate, MetricFormat, MetricSpec};
use crate::services::{rows, Record};
use crate::status::{StatusPalette, Tone};

const ORDER_STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];

pub fn overview() -> ResourceDescriptor {
    ResourceDescriptor::new("overview", "Dashboard", "analytics/daily")
        .subtitle("Store performance over the last week")
        .sample(overview_rows)
        .title_field("date")
        .search(&["date"])
        .columns(vec![
            Column::text("date", "Date"),
            Column::new("revenue", "Revenue", ColumnKind::Currency),
            Column::new("orders", "Orders", ColumnKind::Integer),
            Column::new("visitors", "Visitors", ColumnKind::Integer),
            Column::new("new_customers", "New customers", ColumnKind::Integer),
        ])
        .metrics(vec![
            MetricSpec::new("revenue", "Revenue", Aggregate::sum("revenue"), MetricFormat::Currency),
            MetricSpec::new("orders", "Orders", Aggregate::sum("orders"), MetricFormat::Integer),
            MetricSpec::new("visitors", "Visitors", Aggregate::sum("visitors"), MetricFormat::Compact),
            MetricSpec::new(
                "conversion",
                "Conversion rate",
                Aggregate::rate("orders", "visitors"),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "best_day",
                "Best day",
                Aggregate::max("revenue"),
                MetricFormat::Currency,
            ),
        ])
}

fn overview_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "day-1", "date": "2024-05-06", "revenue": 4820.5, "orders": 61, "visitors": 2410, "new_customers": 18}),
        json!({"id": "day-2", "date": "2024-05-07", "revenue": 5310.0, "orders": 67, "visitors": 2580, "new_customers": 22}),
        json!({"id": "day-3", "date": "2024-05-08", "revenue": 3975.25, "orders": 49, "visitors": 2105, "new_customers": 11}),
        json!({"id": "day-4", "date": "2024-05-09", "revenue": 6120.75, "orders": 78, "visitors": 3012, "new_customers": 27}),
        json!({"id": "day-5", "date": "2024-05-10", "revenue": 7045.0, "orders": 85, "visitors": 3390, "new_customers": 31}),
    ])
}

pub fn orders() -> ResourceDescriptor {
    ResourceDescriptor::new("orders", "Orders", "orders")
        .subtitle("Track and fulfil customer orders")
        .sample(order_rows)
        .title_field("order_number")
        .search(&["order_number", "customer.name", "customer.email"])
        .palette(StatusPalette::order())
        .columns(vec![
            Column::text("order_number", "Order"),
            Column::text("customer.name", "Customer"),
            Column::new("items", "Items", ColumnKind::Integer),
            Column::new("total", "Total", ColumnKind::Currency),
            Column::new("status", "Status", ColumnKind::Status),
            Column::new("payment_status", "Payment", ColumnKind::Status),
            Column::text("created_at", "Placed"),
        ])
        .tabs(ORDER_STATUSES.iter().map(|s| TabSpec::status(s)).collect())
        .metrics(vec![
            MetricSpec::new("orders", "Orders", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new("revenue", "Revenue", Aggregate::sum("total"), MetricFormat::Currency),
            MetricSpec::new(
                "aov",
                "Average order value",
                Aggregate::average("total"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "open",
                "Awaiting fulfilment",
                Aggregate::count_where("status", &["pending", "processing"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "delivered",
                "Delivered",
                Aggregate::share("status", &["delivered"]),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("order_number", "Order number", InputKind::Text).required(),
            FieldDescriptor::new("customer_email", "Customer email", InputKind::Email).required(),
            FieldDescriptor::new("total", "Total", InputKind::Number).required(),
            FieldDescriptor::new("items", "Items", InputKind::Number).default_value(1),
            FieldDescriptor::select("status", "Status", ORDER_STATUSES).default_value("pending"),
            FieldDescriptor::new("notes", "Notes", InputKind::TextArea),
        ])
}

fn order_rows() -> Vec<Record> {
    rows(vec![
        json!({
            "id": "ord-1001", "order_number": "LUM-1001", "items": 3, "total": 128.4,
            "status": "delivered", "payment_status": "completed", "created_at": "2024-05-06 09:14",
            "customer": {"name": "Amara Okafor", "email": "amara@example.com"}
        }),
        json!({
            "id": "ord-1002", "order_number": "LUM-1002", "items": 1, "total": 42.0,
            "status": "processing", "payment_status": "completed", "created_at": "2024-05-07 11:02",
            "customer": {"name": "Lena Park", "email": "lena.park@example.com"}
        }),
        json!({
            "id": "ord-1003", "order_number": "LUM-1003", "items": 5, "total": 214.95,
            "status": "shipped", "payment_status": "completed", "created_at": "2024-05-08 16:45",
            "customer": {"name": "Sofia Marin", "email": "sofia.m@example.com"}
        }),
        json!({
            "id": "ord-1004", "order_number": "LUM-1004", "items": 2, "total": 76.5,
            "status": "pending", "payment_status": "pending", "created_at": "2024-05-09 08:30",
            "customer": {"name": "Noah Reyes", "email": "noah.reyes@example.com"}
        }),
        json!({
            "id": "ord-1005", "order_number": "LUM-1005", "items": 1, "total": 29.9,
            "status": "cancelled", "payment_status": "refunded", "created_at": "2024-05-09 19:12",
            "customer": {"name": "Priya Nair", "email": "priya@example.com"}
        }),
    ])
}

pub fn customers() -> ResourceDescriptor {
    ResourceDescriptor::new("customers", "Customers", "customers")
        .subtitle("Profiles, tiers and lifetime value")
        .sample(customer_rows)
        .search(&["name", "email", "phone"])
        .palette(StatusPalette::lifecycle())
        .columns(vec![
            Column::text("name", "Name"),
            Column::text("email", "Email"),
            Column::new("tier", "Tier", ColumnKind::Status),
            Column::new("orders_count", "Orders", ColumnKind::Integer),
            Column::new("total_spent", "Lifetime value", ColumnKind::Currency),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::field_in("vip", "VIP", "tier", &["platinum", "gold"]),
            TabSpec::field_in("new", "New", "tier", &["new"]),
            TabSpec::status("inactive"),
        ])
        .metrics(vec![
            MetricSpec::new("customers", "Customers", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "ltv",
                "Lifetime value",
                Aggregate::sum("total_spent"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "avg_ltv",
                "Average value",
                Aggregate::average("total_spent"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "active",
                "Active",
                Aggregate::share("status", &["active"]),
                MetricFormat::Percent,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("email", "Email", InputKind::Email).required(),
            FieldDescriptor::new("phone", "Phone", InputKind::Phone),
            FieldDescriptor::select("tier", "Tier", &["new", "bronze", "silver", "gold", "platinum"])
                .default_value("new"),
            FieldDescriptor::select("status", "Status", &["active", "inactive"]).default_value("active"),
        ])
        .toggle(StatusToggle::new("status", "active", "inactive"))
}

fn customer_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "cus-1", "name": "Amara Okafor", "email": "amara@example.com", "phone": "+1 415 555 0101", "tier": "platinum", "orders_count": 24, "total_spent": 2480.0, "status": "active"}),
        json!({"id": "cus-2", "name": "Lena Park", "email": "lena.park@example.com", "phone": "+1 212 555 0144", "tier": "gold", "orders_count": 11, "total_spent": 960.5, "status": "active"}),
        json!({"id": "cus-3", "name": "Sofia Marin", "email": "sofia.m@example.com", "tier": "silver", "orders_count": 6, "total_spent": 430.0, "status": "active"}),
        json!({"id": "cus-4", "name": "Noah Reyes", "email": "noah.reyes@example.com", "tier": "new", "orders_count": 1, "total_spent": 76.5, "status": "active"}),
        json!({"id": "cus-5", "name": "Priya Nair", "email": "priya@example.com", "tier": "bronze", "orders_count": 2, "total_spent": 58.9, "status": "inactive"}),
    ])
}

pub fn products() -> ResourceDescriptor {
    ResourceDescriptor::new("products", "Products", "products")
        .subtitle("Catalog, pricing and stock")
        .sample(product_rows)
        .search(&["name", "sku", "category"])
        .palette(StatusPalette::new(&[
            ("active", Tone::Success),
            ("draft", Tone::Neutral),
            ("out_of_stock", Tone::Danger),
        ]))
        .columns(vec![
            Column::text("name", "Product"),
            Column::text("sku", "SKU"),
            Column::text("category", "Category"),
            Column::new("price", "Price", ColumnKind::Currency),
            Column::new("stock", "Stock", ColumnKind::Integer),
            Column::new("status", "Status", ColumnKind::Status),
        ])
        .tabs(vec![
            TabSpec::status("active"),
            TabSpec::status("draft"),
            TabSpec::status("out_of_stock"),
        ])
        .metrics(vec![
            MetricSpec::new("products", "Products", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "inventory",
                "Inventory value",
                Aggregate::product("price", "stock"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "avg_price",
                "Average price",
                Aggregate::average("price"),
                MetricFormat::Currency,
            ),
            MetricSpec::new(
                "out_of_stock",
                "Out of stock",
                Aggregate::count_where("status", &["out_of_stock"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("name", "Name", InputKind::Text).required(),
            FieldDescriptor::new("sku", "SKU", InputKind::Text).required(),
            FieldDescriptor::select("category", "Category", &["cleanser", "serum", "moisturizer", "sunscreen", "mask"]),
            FieldDescriptor::new("price", "Price", InputKind::Number).required(),
            FieldDescriptor::new("stock", "Stock", InputKind::Number).default_value(0),
            FieldDescriptor::select("status", "Status", &["active", "draft", "out_of_stock"])
                .default_value("draft"),
        ])
        .toggle(StatusToggle::new("status", "active", "draft"))
}

fn product_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "pro-1", "name": "Retinol Night Serum", "sku": "LUM-SER-01", "category": "serum", "price": 48.0, "stock": 140, "status": "active"}),
        json!({"id": "pro-2", "name": "Gentle Foam Cleanser", "sku": "LUM-CLN-02", "category": "cleanser", "price": 22.0, "stock": 310, "status": "active"}),
        json!({"id": "pro-3", "name": "Barrier Repair Cream", "sku": "LUM-MOI-03", "category": "moisturizer", "price": 36.5, "stock": 0, "status": "out_of_stock"}),
        json!({"id": "pro-4", "name": "Mineral SPF 50", "sku": "LUM-SUN-04", "category": "sunscreen", "price": 29.9, "stock": 95, "status": "active"}),
        json!({"id": "pro-5", "name": "Clay Detox Mask", "sku": "LUM-MSK-05", "category": "mask", "price": 31.0, "stock": 40, "status": "draft"}),
    ])
}

pub fn deliveries() -> ResourceDescriptor {
    ResourceDescriptor::new("deliveries", "Deliveries", "deliveries")
        .subtitle("Shipments in flight")
        .sample(delivery_rows)
        .title_field("tracking_number")
        .search(&["tracking_number", "order_number", "carrier", "recipient"])
        .palette(StatusPalette::new(&[
            ("pending", Tone::Warning),
            ("in_transit", Tone::Info),
            ("out_for_delivery", Tone::Accent),
            ("delivered", Tone::Success),
            ("failed", Tone::Danger),
        ]))
        .columns(vec![
            Column::text("tracking_number", "Tracking"),
            Column::text("order_number", "Order"),
            Column::text("recipient", "Recipient"),
            Column::text("carrier", "Carrier"),
            Column::new("status", "Status", ColumnKind::Status),
            Column::text("eta", "ETA"),
        ])
        .tabs(vec![
            TabSpec::field_in("moving", "On the way", "status", &["in_transit", "out_for_delivery"]),
            TabSpec::status("delivered"),
            TabSpec::status("failed"),
        ])
        .metrics(vec![
            MetricSpec::new("shipments", "Shipments", Aggregate::Count, MetricFormat::Integer),
            MetricSpec::new(
                "in_transit",
                "On the way",
                Aggregate::count_where("status", &["in_transit", "out_for_delivery"]),
                MetricFormat::Integer,
            ),
            MetricSpec::new(
                "delivered",
                "Delivered",
                Aggregate::share("status", &["delivered"]),
                MetricFormat::Percent,
            ),
            MetricSpec::new(
                "failed",
                "Failed",
                Aggregate::count_where("status", &["failed"]),
                MetricFormat::Integer,
            ),
        ])
        .fields(vec![
            FieldDescriptor::new("order_number", "Order number", InputKind::Text).required(),
            FieldDescriptor::new("recipient", "Recipient", InputKind::Text).required(),
            FieldDescriptor::select("carrier", "Carrier", &["UPS", "FedEx", "DHL", "USPS"]).required(),
            FieldDescriptor::new("tracking_number", "Tracking number", InputKind::Text),
            FieldDescriptor::select(
                "status",
                "Status",
                &["pending", "in_transit", "out_for_delivery", "delivered", "failed"],
            )
            .default_value("pending"),
            FieldDescriptor::new("eta", "ETA", InputKind::Date),
        ])
}

fn delivery_rows() -> Vec<Record> {
    rows(vec![
        json!({"id": "del-1", "tracking_number": "1Z999AA10123456784", "order_number": "LUM-1001", "recipient": "Amara Okafor", "carrier": "UPS", "status": "delivered", "eta": "2024-05-08"}),
        json!({"id": "del-2", "tracking_number": "7489 2200 1180", "order_number": "LUM-1003", "recipient": "Sofia Marin", "carrier": "FedEx", "status": "in_transit", "eta": "2024-05-11"}),
        json!({"id": "del-3", "tracking_number": "JD014600006281", "order_number": "LUM-1002", "recipient": "Lena Park", "carrier": "DHL", "status": "out_for_delivery", "eta": "2024-05-10"}),
        json!({"id": "del-4", "tracking_number": "9400 1000 0000", "order_number": "LUM-0998", "recipient": "Marco Bianchi", "carrier": "USPS", "status": "failed", "eta": "2024-05-07"}),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;

    #[test]
    fn order_metrics_cover_sample() {
        let descriptor = orders();
        let values = metrics::compute(&descriptor.sample_rows(), &descriptor.metrics);
        assert_eq!(values[0].display, "5");
        assert_eq!(values[1].display, "$491.75");
        assert_eq!(values[3].display, "2");
        assert_eq!(values[4].display, "20.0%");
    }

    #[test]
    fn orders_search_nested_customer() {
        let descriptor = orders();
        let rows = descriptor.sample_rows();
        let hits: Vec<_> = rows
            .iter()
            .filter(|r| descriptor.matches_search(r, "lena"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(descriptor.record_title(hits[0]), "LUM-1002");
    }

    #[test]
    fn inventory_value_weights_price_by_stock() {
        let descriptor = products();
        let values = metrics::compute(&descriptor.sample_rows(), &descriptor.metrics);
        // 48*140 + 22*310 + 0 + 29.9*95 + 31*40
        assert_eq!(values[1].display, "$17,620.50");
    }
}
